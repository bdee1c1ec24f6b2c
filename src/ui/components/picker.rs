use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph};

use crate::Theme;
use crate::search::Matcher;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, PartialEq, Eq)]
pub enum PickerEvent<T> {
    Picked(T),
    Cancelled,
}

/// Pick one item from a list. Typing narrows the list with fuzzy matching.
pub struct PickerDialog<T> {
    title: String,
    items: Vec<(String, T)>,
    visible: Vec<usize>,
    query: String,
    state: ListState,
    matcher: Matcher,
}

impl<T: Clone> PickerDialog<T> {
    pub fn new(title: impl Into<String>, items: Vec<(String, T)>) -> Self {
        let mut picker = Self {
            title: title.into(),
            visible: Vec::new(),
            items,
            query: String::new(),
            state: ListState::default(),
            matcher: Matcher::new(),
        };
        picker.refilter();
        picker
    }

    fn refilter(&mut self) {
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, (label, _))| self.matcher.matches(label, &self.query))
            .map(|(i, _)| i)
            .collect();
        self.state
            .select((!self.visible.is_empty()).then_some(0));
    }

    fn selected(&self) -> Option<&T> {
        let index = *self.visible.get(self.state.selected()?)?;
        self.items.get(index).map(|(_, value)| value)
    }

    fn step(&mut self, delta: isize) {
        let Some(current) = self.state.selected() else {
            return;
        };
        let last = self.visible.len().saturating_sub(1);
        let next = current.saturating_add_signed(delta).min(last);
        self.state.select(Some(next));
    }
}

impl<T: Clone> Component for PickerDialog<T> {
    type Output = PickerEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => PickerEvent::Cancelled.into(),
            (KeyCode::Enter, _) => self
                .selected()
                .cloned()
                .map_or(EventResult::Consumed, |value| PickerEvent::Picked(value).into()),
            (KeyCode::Down, _) | (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.step(1);
                EventResult::Consumed
            }
            (KeyCode::Up, _) | (KeyCode::Char('p'), KeyModifiers::CONTROL) => {
                self.step(-1);
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.query.pop();
                self.refilter();
                EventResult::Consumed
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.query.push(c);
                self.refilter();
                EventResult::Consumed
            }
            _ => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Percentage(50));
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let [filter_area, list_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

        let filter = Line::from(vec![
            Span::styled("filter: ", Style::default().fg(theme.overlay1())),
            Span::styled(format!("{}_", self.query), Style::default().fg(theme.yellow())),
        ]);
        frame.render_widget(Paragraph::new(filter), filter_area);

        if self.visible.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("No matches", Style::default().fg(theme.overlay0()))),
                list_area,
            );
            return;
        }

        let items: Vec<ListItem> = self
            .visible
            .iter()
            .map(|&i| ListItem::new(self.items[i].0.clone()).style(Style::default().fg(theme.text())))
            .collect();
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, list_area, &mut self.state);
    }
}
