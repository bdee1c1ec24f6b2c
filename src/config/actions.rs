#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Help,
    Back,
    CommandsToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    Toggle,
    Exit,
}

/// Actions available on every listing screen.
///
/// Not every screen uses every action; a screen that has no use for
/// `AddRole` simply never asks the resolver about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    NextPage,
    PrevPage,
    PageSize,
    SortNext,
    SortPrev,
    Sort,
    Reload,
    New,
    Edit,
    Delete,
    AddRole,
    RemoveRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
    Dismiss,
}
