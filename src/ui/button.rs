use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::Theme;

/// Visual variant of a [`Button`]. Exactly one applies to each button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Danger,
    Link,
}

/// A key hint rendered as a button, e.g. `[y] Delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    key: String,
    label: String,
    variant: ButtonVariant,
}

impl Button {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            variant: ButtonVariant::Primary,
        }
    }

    #[must_use]
    pub const fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    fn label_style(&self, theme: &Theme) -> Style {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        match self.variant {
            ButtonVariant::Primary => bold.fg(theme.success()),
            ButtonVariant::Secondary => bold.fg(theme.overlay1()),
            ButtonVariant::Danger => bold.fg(theme.error()),
            ButtonVariant::Link => Style::default()
                .fg(theme.blue())
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    pub fn spans(&self, theme: &Theme) -> Vec<Span<'static>> {
        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        vec![
            Span::styled(format!("[{}]", self.key), key_style),
            Span::raw(" "),
            Span::styled(self.label.clone(), self.label_style(theme)),
        ]
    }
}
