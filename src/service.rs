use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};

use crate::Theme;
use crate::commands::Command;
use crate::config::{KeyResolver, NavAction};
use crate::registry::{ScreenProvider, ScreenRegistry};
use crate::ui::{Component, EventResult, Keybinding};

pub enum ServiceMsg {
    /// No action needed
    Idle,
    /// Run one or more commands
    Run(Vec<Box<dyn Command>>),
    /// Close this screen (go back to the screen selector)
    Close,
}

impl<T: Command> From<T> for ServiceMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

impl ServiceMsg {
    /// Fold the result of one message into the result of a whole `update()`.
    ///
    /// `Close` wins over everything, commands accumulate.
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Close, _) | (_, Self::Close) => Self::Close,
            (Self::Idle, other) | (other, Self::Idle) => other,
            (Self::Run(mut a), Self::Run(b)) => {
                a.extend(b);
                Self::Run(a)
            }
        }
    }
}

/// A listing screen.
///
/// Screens manage their own internal state and message queue. The App calls
/// methods in this order:
///
/// 1. `init()` - once when the screen becomes active
/// 2. `update()` - immediately after init to process startup messages
/// 3. For each event:
///    - `handle_tick()` if tick event, then `update()` if it returned `true`
///    - `handle_key()` if key event, then `update()` if consumed
/// 4. When a command completes: `update()`
/// 5. `destroy()` - when the screen is closing
pub trait Service {
    /// Initialize the screen by queuing startup message(s).
    fn init(&mut self) {}

    /// Clean up when the screen is closing.
    fn destroy(&mut self) {}

    /// Handle a tick event for animations and debounced input.
    ///
    /// Returns `true` when a message was queued and `update()` must run.
    fn handle_tick(&mut self) -> bool {
        false
    }

    /// Handle a key event.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>>;

    /// Process all queued messages and return the result.
    ///
    /// # Errors
    /// Returns an error if message processing fails.
    /// In this case, the App will display the error and the screen might be in an invalid state.
    fn update(&mut self) -> Result<ServiceMsg>;

    /// Render the screen to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Breadcrumb segments for the navigation bar.
    fn breadcrumbs(&self) -> Vec<String>;

    /// Returns the keybindings for the current view in this screen.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

/// Start page: one row per registered screen.
pub struct ScreenSelectorView {
    screens: Vec<Arc<dyn ScreenProvider>>,
    state: ListState,
    resolver: Arc<KeyResolver>,
}

impl ScreenSelectorView {
    #[must_use]
    pub fn new(registry: &ScreenRegistry, resolver: Arc<KeyResolver>) -> Self {
        let screens = registry.all();
        let mut state = ListState::default();
        state.select((!screens.is_empty()).then_some(0));
        Self {
            screens,
            state,
            resolver,
        }
    }
}

impl Component for ScreenSelectorView {
    type Output = &'static str;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let last = self.screens.len().saturating_sub(1);
        let r = &self.resolver;

        if r.matches_nav(&key, NavAction::Down) {
            self.state.select(self.state.selected().map(|i| (i + 1).min(last)));
            return Ok(EventResult::Consumed);
        }
        if r.matches_nav(&key, NavAction::Up) {
            self.state.select(self.state.selected().map(|i| i.saturating_sub(1)));
            return Ok(EventResult::Consumed);
        }
        if r.matches_nav(&key, NavAction::Select) {
            return Ok(self
                .state
                .selected()
                .and_then(|i| self.screens.get(i))
                .map_or(EventResult::Consumed, |s| s.key().into()));
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self
            .screens
            .iter()
            .map(|s| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<16}", s.display_name()),
                        Style::default().fg(theme.text()).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(s.description(), Style::default().fg(theme.subtext0())),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Screens ")
                    .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(theme.border())),
            )
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.state);
    }
}
