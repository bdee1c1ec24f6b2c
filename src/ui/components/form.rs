use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::ui::{Button, ButtonVariant, Component, EventResult, Result, TextInput};

pub struct FormField {
    key: &'static str,
    input: TextInput,
    required: bool,
}

impl FormField {
    pub fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            input: TextInput::new(label),
            required: false,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.input = self.input.with_value(value);
        self
    }
}

/// Submitted form values, keyed by field key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues(Vec<(&'static str, String)>);

impl FormValues {
    /// Trimmed value of a field, empty if the key is unknown.
    pub fn get(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map_or("", |(_, v)| v.trim())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum FormEvent {
    Submitted(FormValues),
    Cancelled,
}

/// Multi-field text form. Tab/arrow keys move between fields, Enter
/// submits once every required field is filled, Esc cancels.
pub struct FormDialog {
    title: String,
    fields: Vec<FormField>,
    focus: usize,
    error: Option<String>,
}

impl FormDialog {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            fields,
            focus: 0,
            error: None,
        }
    }

    fn values(&self) -> FormValues {
        FormValues(
            self.fields
                .iter()
                .map(|f| (f.key, f.input.value().to_string()))
                .collect(),
        )
    }

    fn move_focus(&mut self, forward: bool) {
        let n = self.fields.len().max(1);
        self.focus = if forward {
            (self.focus + 1) % n
        } else {
            (self.focus + n - 1) % n
        };
    }

    fn submit(&mut self) -> EventResult<FormEvent> {
        if let Some((index, field)) = self
            .fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.required && f.input.value().trim().is_empty())
        {
            self.error = Some(format!("{} is required", field.input.label()));
            self.focus = index;
            return EventResult::Consumed;
        }
        FormEvent::Submitted(self.values()).into()
    }
}

impl Component for FormDialog {
    type Output = FormEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match key.code {
            KeyCode::Esc => FormEvent::Cancelled.into(),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                EventResult::Consumed
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                EventResult::Consumed
            }
            _ => {
                self.error = None;
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.input.handle_edit_key(key);
                }
                EventResult::Consumed
            }
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let height = u16::try_from(self.fields.len() * 2 + 5).unwrap_or(u16::MAX);
        let popup_area = area.centered(Constraint::Percentage(60), Constraint::Length(height));
        frame.render_widget(Clear, popup_area);

        let label_width = self
            .fields
            .iter()
            .map(|f| f.input.label().chars().count() + usize::from(f.required))
            .max()
            .unwrap_or(0);

        let mut lines = vec![Line::from("")];
        for (i, field) in self.fields.iter().enumerate() {
            let focused = i == self.focus;
            let label = format!(
                "{}{}",
                field.input.label(),
                if field.required { "*" } else { "" }
            );
            let label_style = if focused {
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.subtext0())
            };
            let mut spans = vec![
                Span::styled(format!(" {label:>label_width$} "), label_style),
                Span::raw(" "),
            ];
            spans.extend(field.input.line(theme, focused).spans);
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }

        match &self.error {
            Some(error) => lines.push(Line::from(Span::styled(
                format!(" {error}"),
                Style::default().fg(theme.error()),
            ))),
            None => {
                let mut buttons = vec![Span::raw(" ")];
                buttons.extend(Button::new("Enter", "Save").spans(theme));
                buttons.push(Span::raw("  "));
                buttons.extend(
                    Button::new("Esc", "Cancel")
                        .variant(ButtonVariant::Secondary)
                        .spans(theme),
                );
                lines.push(Line::from(buttons));
            }
        }

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(form: &mut FormDialog, s: &str) {
        for c in s.chars() {
            form.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn role_form() -> FormDialog {
        FormDialog::new(
            "Create role",
            vec![
                FormField::new("name", "Name").required(),
                FormField::new("description", "Description"),
            ],
        )
    }

    #[test]
    fn tab_moves_between_fields() {
        let mut form = role_form();
        type_str(&mut form, "admin");
        form.handle_key(key(KeyCode::Tab)).unwrap();
        type_str(&mut form, " Full access ");

        let EventResult::Event(FormEvent::Submitted(values)) =
            form.handle_key(key(KeyCode::Enter)).unwrap()
        else {
            panic!("expected submission");
        };
        assert_eq!(values.get("name"), "admin");
        assert_eq!(values.get("description"), "Full access");
        assert_eq!(values.get("unknown"), "");
    }

    #[test]
    fn required_fields_block_submission() {
        let mut form = role_form();
        form.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(form.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Consumed);
        assert_eq!(form.error.as_deref(), Some("Name is required"));
        assert_eq!(form.focus, 0);

        type_str(&mut form, "x");
        assert_eq!(form.error, None);
    }

    #[test]
    fn prefilled_values_are_kept() {
        let mut form = FormDialog::new(
            "Edit role",
            vec![FormField::new("name", "Name").required().with_value("clerk")],
        );
        assert!(matches!(
            form.handle_key(key(KeyCode::Enter)).unwrap(),
            EventResult::Event(FormEvent::Submitted(_))
        ));
        assert_eq!(
            form.handle_key(key(KeyCode::Esc)).unwrap(),
            EventResult::Event(FormEvent::Cancelled)
        );
    }
}
