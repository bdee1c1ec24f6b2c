use ratatui::layout::Constraint;
use ratatui::widgets::Cell;

use crate::Theme;

/// A row entity shown in a listing.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable backend identifier.
    fn id(&self) -> &str;

    /// Display value for a column key, used when the column has no custom
    /// renderer and for client-side sorting/filtering.
    fn field(&self, key: &str) -> Option<String>;
}

pub type CellRenderer<T> = fn(&T, &Theme) -> Cell<'static>;

/// Static description of one table column.
pub struct ColumnSpec<T> {
    pub key: &'static str,
    pub label: &'static str,
    pub width: Constraint,
    pub sortable: bool,
    pub render: Option<CellRenderer<T>>,
}

impl<T> ColumnSpec<T> {
    pub const fn new(key: &'static str, label: &'static str, width: Constraint) -> Self {
        Self {
            key,
            label,
            width,
            sortable: false,
            render: None,
        }
    }

    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub const fn with_render(mut self, render: CellRenderer<T>) -> Self {
        self.render = Some(render);
        self
    }
}

impl<T: Record> ColumnSpec<T> {
    pub fn cell(&self, row: &T, theme: &Theme) -> Cell<'static> {
        match self.render {
            Some(render) => render(row, theme),
            None => Cell::from(self.field_text(row)),
        }
    }

    pub fn field_text(&self, row: &T) -> String {
        row.field(self.key).unwrap_or_default()
    }
}
