use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

fn bind(keys: &[Key]) -> KeyBinding {
    KeyBinding::new(keys.iter().cloned())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub help: KeyBinding,
    pub back: KeyBinding,
    pub commands_toggle: KeyBinding,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::char('q').into(),
            help: Key::char('?').into(),
            back: Key::new(KeyCode::Esc).into(),
            commands_toggle: Key::char('c').into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: bind(&[Key::char('k'), Key::new(KeyCode::Up)]),
            down: bind(&[Key::char('j'), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: bind(&[Key::char('g'), Key::new(KeyCode::Home)]),
            end: bind(&[Key::char('G'), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchKeybindings {
    pub toggle: KeyBinding,
    pub exit: KeyBinding,
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::char('/').into(),
            exit: Key::new(KeyCode::Esc).into(),
        }
    }
}

/// Keys shared by all listing screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListKeybindings {
    pub next_page: KeyBinding,
    pub prev_page: KeyBinding,
    pub page_size: KeyBinding,
    pub sort_next: KeyBinding,
    pub sort_prev: KeyBinding,
    pub sort: KeyBinding,
    pub reload: KeyBinding,
    pub new: KeyBinding,
    pub edit: KeyBinding,
    pub delete: KeyBinding,
    pub add_role: KeyBinding,
    pub remove_role: KeyBinding,
}

impl Default for ListKeybindings {
    fn default() -> Self {
        Self {
            next_page: bind(&[Key::char(']'), Key::new(KeyCode::Right)]),
            prev_page: bind(&[Key::char('['), Key::new(KeyCode::Left)]),
            page_size: Key::char('z').into(),
            sort_next: bind(&[Key::char('>'), Key::new(KeyCode::Tab)]),
            sort_prev: bind(&[Key::char('<'), Key::new(KeyCode::BackTab)]),
            sort: Key::char('s').into(),
            reload: Key::char('r').into(),
            new: Key::char('n').into(),
            edit: Key::char('e').into(),
            delete: bind(&[Key::char('d'), Key::new(KeyCode::Delete)]),
            add_role: Key::char('a').into(),
            remove_role: Key::char('x').into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub dismiss: KeyBinding,
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: bind(&[Key::char('y'), Key::char('Y'), Key::new(KeyCode::Enter)]),
            cancel: bind(&[Key::char('n'), Key::char('N'), Key::new(KeyCode::Esc)]),
            dismiss: bind(&[
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::char('q'),
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub search: SearchKeybindings,
    pub list: ListKeybindings,
    pub dialog: DialogKeybindings,
}
