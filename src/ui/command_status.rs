use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::ui::{Component, truncate};

const MAX_HISTORY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(u64);

#[derive(Debug)]
struct Running {
    id: CommandId,
    name: String,
    started_at: Instant,
}

#[derive(Debug)]
struct Finished {
    name: String,
    success: bool,
    took: Duration,
}

/// Commands spawned by the App: the ones still running and the last few
/// that finished.
#[derive(Default)]
pub struct CommandTracker {
    running: Vec<Running>,
    history: VecDeque<Finished>,
    next_id: u64,
    expanded: bool,
}

impl CommandTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, name: String) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id += 1;
        self.running.push(Running {
            id,
            name,
            started_at: Instant::now(),
        });
        id
    }

    /// Move a command into the history. Unknown ids are ignored.
    pub fn complete(&mut self, id: CommandId, success: bool) {
        let Some(pos) = self.running.iter().position(|c| c.id == id) else {
            return;
        };
        let cmd = self.running.remove(pos);
        self.history.push_front(Finished {
            name: cmd.name,
            success,
            took: cmd.started_at.elapsed(),
        });
        self.history.truncate(MAX_HISTORY);
    }

    pub fn running_names(&self) -> Vec<String> {
        self.running.iter().map(|c| c.name.clone()).collect()
    }

    pub const fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 60 {
        format!("{}m{:02}s", d.as_secs() / 60, d.as_secs() % 60)
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

impl Component for CommandTracker {
    type Output = ();

    /// Panel in the bottom right corner, drawn only while expanded.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.expanded {
            return;
        }

        let width = 60u16.min(area.width.saturating_sub(4));
        let name_width = usize::from(width.saturating_sub(14));
        let mut lines = Vec::new();

        for cmd in &self.running {
            lines.push(Line::from(vec![
                Span::styled("  ⟳ ", Style::default().fg(theme.yellow())),
                Span::styled(
                    format!("{:<name_width$}", truncate(&cmd.name, name_width)),
                    Style::default().fg(theme.text()),
                ),
                Span::styled(
                    format!("{:>7}", format_duration(cmd.started_at.elapsed())),
                    Style::default().fg(theme.overlay1()),
                ),
            ]));
        }
        for cmd in &self.history {
            let (icon, color) = if cmd.success {
                ("  ✓ ", theme.success())
            } else {
                ("  ✗ ", theme.error())
            };
            lines.push(Line::from(vec![
                Span::styled(icon, Style::default().fg(color)),
                Span::styled(
                    format!("{:<name_width$}", truncate(&cmd.name, name_width)),
                    Style::default().fg(theme.subtext0()),
                ),
                Span::styled(
                    format!("{:>7}", format_duration(cmd.took)),
                    Style::default().fg(theme.overlay0()).add_modifier(Modifier::DIM),
                ),
            ]));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No commands yet",
                Style::default().fg(theme.overlay0()),
            )));
        }

        let height = u16::try_from(lines.len() + 2)
            .unwrap_or(u16::MAX)
            .min(area.height);
        let panel = Rect::new(
            area.right().saturating_sub(width + 2),
            area.bottom().saturating_sub(height),
            width,
            height,
        );
        frame.render_widget(Clear, panel);

        let title = format!(
            " Commands ({} running, {} recent) ",
            self.running.len(),
            self.history.len()
        );
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface2()))
            .style(Style::default().bg(theme.mantle()));
        frame.render_widget(Paragraph::new(lines).block(block), panel);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn completed_commands_move_to_history() {
        let mut tracker = CommandTracker::new();
        let first = tracker.start("Loading roles (page 1)".to_string());
        let second = tracker.start("Deleting role admin".to_string());
        assert_eq!(tracker.running_names().len(), 2);

        tracker.complete(first, true);
        tracker.complete(first, true);
        assert_eq!(tracker.running_names(), vec!["Deleting role admin"]);

        tracker.complete(second, false);
        assert!(tracker.running_names().is_empty());
        assert_eq!(tracker.history.len(), 2);
        assert!(!tracker.history[0].success);
    }

    #[test]
    fn history_is_bounded() {
        let mut tracker = CommandTracker::new();
        for i in 0..15 {
            let id = tracker.start(format!("cmd {i}"));
            tracker.complete(id, true);
        }
        assert_eq!(tracker.history.len(), MAX_HISTORY);
        assert_eq!(tracker.history[0].name, "cmd 14");
    }

    #[test]
    fn durations_are_compact() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(75)), "1m15s");
    }
}
