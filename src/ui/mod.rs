//! Reusable UI building blocks.
//!
//! - [`Component`] - interactive widgets that handle keys and emit events
//! - [`EventResult`] - outcome of handling a key
//! - app-level overlays: toasts, error dialog, help, status bar

mod button;
mod command_status;
mod component;
pub mod components;
mod error_dialog;
mod help;
mod status_bar;
mod toast;
pub mod widgets;

pub use button::{Button, ButtonVariant};
pub use command_status::{CommandId, CommandTracker};
pub use color_eyre::Result;
pub use component::Component;
pub use components::{
    ConfirmDialog, ConfirmEvent, DataTable, FormDialog, FormEvent, FormField, FormValues, PickerDialog,
    PickerEvent, TableEvent, TableView, TextInput,
};
pub use error_dialog::{ErrorDialog, ErrorDialogEvent};
pub use help::{HelpEvent, HelpOverlay, Keybinding, KeybindingSection};
pub use status_bar::StatusBar;
pub use toast::{Toast, ToastManager, ToastType};
pub use widgets::Spinner;

/// Result of handling an input event.
///
/// - `Ignored` - the handler didn't recognize this input, the parent should
///   process it
/// - `Consumed` - the input was handled but produced no event
/// - `Event(E)` - the input was handled and produced an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    Ignored,
    Consumed,
    Event(E),
}

impl<E> EventResult<E> {
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    pub fn map<U>(self, f: impl FnOnce(E) -> U) -> EventResult<U> {
        match self {
            Self::Ignored => EventResult::Ignored,
            Self::Consumed => EventResult::Consumed,
            Self::Event(e) => EventResult::Event(f(e)),
        }
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Truncate a string to `max_width` characters, adding "..." if cut.
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_width).collect()
    }
}
