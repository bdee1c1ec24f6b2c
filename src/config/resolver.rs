use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{DialogAction, GlobalAction, ListAction, NavAction, SearchAction};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to actions using the configured keybindings.
pub struct KeyResolver {
    keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Help => &kb.help,
            GlobalAction::Back => &kb.back,
            GlobalAction::CommandsToggle => &kb.commands_toggle,
        }
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
            NavAction::Select => &kb.select,
        }
    }

    fn search(&self, action: SearchAction) -> &KeyBinding {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => &kb.toggle,
            SearchAction::Exit => &kb.exit,
        }
    }

    fn list(&self, action: ListAction) -> &KeyBinding {
        let kb = &self.keybindings.list;
        match action {
            ListAction::NextPage => &kb.next_page,
            ListAction::PrevPage => &kb.prev_page,
            ListAction::PageSize => &kb.page_size,
            ListAction::SortNext => &kb.sort_next,
            ListAction::SortPrev => &kb.sort_prev,
            ListAction::Sort => &kb.sort,
            ListAction::Reload => &kb.reload,
            ListAction::New => &kb.new,
            ListAction::Edit => &kb.edit,
            ListAction::Delete => &kb.delete,
            ListAction::AddRole => &kb.add_role,
            ListAction::RemoveRole => &kb.remove_role,
        }
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => &kb.confirm,
            DialogAction::Cancel => &kb.cancel,
            DialogAction::Dismiss => &kb.dismiss,
        }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).to_string()
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        self.nav(action).to_string()
    }

    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        self.search(action).matches(event)
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        self.search(action).to_string()
    }

    pub fn matches_list(&self, event: &KeyEvent, action: ListAction) -> bool {
        self.list(action).matches(event)
    }

    pub fn display_list(&self, action: ListAction) -> String {
        self.list(action).to_string()
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).to_string()
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn default_list_bindings() {
        let resolver = KeyResolver::default();
        assert!(resolver.matches_list(&press(KeyCode::Char(']')), ListAction::NextPage));
        assert!(resolver.matches_list(&press(KeyCode::Right), ListAction::NextPage));
        assert!(resolver.matches_list(&press(KeyCode::Char('s')), ListAction::Sort));
        assert!(!resolver.matches_list(&press(KeyCode::Char('s')), ListAction::Reload));
        assert_eq!(resolver.display_list(ListAction::Delete), "d/Delete");
    }

    #[test]
    fn dialog_confirm_accepts_enter() {
        let resolver = KeyResolver::default();
        assert!(resolver.matches_dialog(&press(KeyCode::Enter), DialogAction::Confirm));
        assert!(resolver.matches_dialog(&press(KeyCode::Esc), DialogAction::Cancel));
    }
}
