use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{Button, ButtonVariant, Component, EventResult, Result};

#[derive(Debug, PartialEq, Eq)]
pub enum ConfirmEvent {
    Confirmed,
    Cancelled,
}

pub struct ConfirmDialog {
    title: String,
    message: String,
    confirm_text: String,
    variant: ButtonVariant,
    resolver: Arc<KeyResolver>,
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: "Confirm".to_string(),
            message: message.into(),
            confirm_text: "Yes".to_string(),
            variant: ButtonVariant::Primary,
            resolver,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    /// Red styling for destructive actions.
    #[must_use]
    pub const fn danger(mut self) -> Self {
        self.variant = ButtonVariant::Danger;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Component for ConfirmDialog {
    type Output = ConfirmEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            return Ok(ConfirmEvent::Confirmed.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(ConfirmEvent::Cancelled.into());
        }
        // modal: nothing leaks to the screen below
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(8));
        frame.render_widget(Clear, popup_area);

        let accent = match self.variant {
            ButtonVariant::Danger => theme.error(),
            _ => theme.lavender(),
        };

        let first_key = |action| {
            let keys = self.resolver.display_dialog(action);
            keys.split('/').next().unwrap_or_default().to_string()
        };
        let confirm = Button::new(first_key(DialogAction::Confirm), self.confirm_text.clone())
            .variant(self.variant);
        let cancel = Button::new(first_key(DialogAction::Cancel), "Cancel")
            .variant(ButtonVariant::Secondary);

        let mut buttons = confirm.spans(theme);
        buttons.push(Span::raw("    "));
        buttons.extend(cancel.spans(theme));

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message.clone(),
                Style::default().fg(theme.text()),
            )),
            Line::from(""),
            Line::from(buttons),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn dialog() -> ConfirmDialog {
        ConfirmDialog::new(
            "Are you sure deleting the role admin",
            Arc::new(KeyResolver::default()),
        )
        .danger()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn confirm_and_cancel_keys() {
        let mut d = dialog();
        assert_eq!(
            d.handle_key(key(KeyCode::Char('y'))).unwrap(),
            EventResult::Event(ConfirmEvent::Confirmed)
        );
        assert_eq!(
            d.handle_key(key(KeyCode::Esc)).unwrap(),
            EventResult::Event(ConfirmEvent::Cancelled)
        );
        assert_eq!(d.handle_key(key(KeyCode::Char('q'))).unwrap(), EventResult::Consumed);
    }

    #[test]
    fn renders_message() {
        use ratatui::Terminal;
        use ratatui::backend::TestBackend;

        let mut d = dialog();
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| d.render(f, f.area(), &theme)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Are you sure deleting the role admin"));
        assert_eq!(d.message(), "Are you sure deleting the role admin");
    }
}
