//! Sortable, paginated listings.
//!
//! A listing is three cooperating parts:
//!
//! - [`DataFetcher`] loads one page for a [`ListQuery`]
//! - [`ListController`] owns the query and load state and decides when to
//!   fetch
//! - [`DataTable`](crate::ui::DataTable) draws the current page and turns
//!   keys into [`TableEvent`](crate::ui::TableEvent)s
//!
//! [`ListPane`] wires the three together for a screen.

mod column;
mod controller;
mod fetcher;
mod local;
mod pane;
mod query;

pub use column::{ColumnSpec, Record};
pub use controller::{Applied, FetchRequest, ListController};
pub use fetcher::{DataFetcher, FetchPageCmd, PageLoaded};
pub use local::page_locally;
pub use pane::{ListPane, PaneEvent};
pub use query::{ListQuery, ListResult, SortOrder};

#[cfg(test)]
pub(crate) use fetcher::testing;
