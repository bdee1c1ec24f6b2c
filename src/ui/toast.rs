use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::ui::{Component, truncate};

const TOAST_DURATION: Duration = Duration::from_secs(3);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Info,
    Error,
}

impl ToastType {
    const fn icon(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Info => "ℹ",
            Self::Error => "✗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Info)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= TOAST_DURATION
    }
}

/// Stack of short-lived notifications in the bottom-right corner.
#[derive(Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_VISIBLE {
            self.toasts.pop_front();
        }
    }

    pub fn expire(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired(now));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }
}

impl Component for ToastManager {
    type Output = ();

    fn on_tick(&mut self) {
        self.expire(Instant::now());
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let toast_height = 3u16;
        let toast_width = 50u16.min(area.width.saturating_sub(4));

        // newest at the bottom, stacking upward
        for (i, toast) in self.toasts.iter().rev().enumerate() {
            let offset = u16::try_from(i).unwrap_or(u16::MAX).saturating_mul(toast_height + 1);
            let Some(y) = area
                .bottom()
                .checked_sub(toast_height + offset + 1)
                .filter(|&y| y >= area.y)
            else {
                break;
            };
            let x = area.x + area.width.saturating_sub(toast_width + 2);
            let toast_area = Rect::new(x, y, toast_width, toast_height);

            let border_color = match toast.toast_type {
                ToastType::Success => theme.success(),
                ToastType::Info => theme.info(),
                ToastType::Error => theme.error(),
            };

            frame.render_widget(Clear, toast_area);

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border_color))
                .style(Style::default().bg(theme.surface0()));

            let text = truncate(
                &format!("{} {}", toast.toast_type.icon(), toast.message),
                usize::from(toast_width.saturating_sub(2)),
            );
            let paragraph = Paragraph::new(text)
                .block(block)
                .style(Style::default().fg(theme.text()).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });

            frame.render_widget(paragraph, toast_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_newest() {
        let mut toasts = ToastManager::new();
        for i in 0..5 {
            toasts.show(Toast::info(format!("toast {i}")));
        }
        let messages: Vec<&str> = toasts.iter().map(Toast::message).collect();
        assert_eq!(messages, vec!["toast 2", "toast 3", "toast 4"]);
    }

    #[test]
    fn expires_after_three_seconds() {
        let mut toasts = ToastManager::new();
        toasts.show(Toast::success("Role created"));
        let now = Instant::now();
        toasts.expire(now);
        assert_eq!(toasts.iter().count(), 1);
        toasts.expire(now + Duration::from_secs(4));
        assert_eq!(toasts.iter().count(), 0);
    }
}
