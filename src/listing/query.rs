use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub sort_key: Option<String>,
    pub sort_order: SortOrder,
    pub filter_text: Option<String>,
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            sort_key: None,
            sort_order: SortOrder::Asc,
            filter_text: None,
        }
    }

    #[must_use]
    pub fn with_sort(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort_key = Some(key.into());
        self.sort_order = order;
        self
    }

    /// Store a filter, treating blank text as no filter.
    pub fn set_filter_text(&mut self, text: &str) {
        let text = text.trim();
        self.filter_text = (!text.is_empty()).then(|| text.to_string());
    }

    pub fn filter(&self) -> &str {
        self.filter_text.as_deref().unwrap_or_default()
    }

    /// Zero-based index of the first row on the current page.
    pub const fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }
}

/// One page of records plus the backend's total row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> ListResult<T> {
    pub const fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }

    pub fn page_count(&self, page_size: u32) -> u32 {
        page_count(self.total_count, page_size)
    }
}

/// Number of pages needed for `total` rows, never less than one.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_order() {
        assert_eq!(SortOrder::Asc.toggle(), SortOrder::Desc);
        assert_eq!(SortOrder::Asc.toggle().toggle(), SortOrder::Asc);
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }

    #[test]
    fn blank_filter_is_none() {
        let mut query = ListQuery::new(10);
        query.set_filter_text("   ");
        assert_eq!(query.filter_text, None);
        query.set_filter_text(" jo ");
        assert_eq!(query.filter_text.as_deref(), Some("jo"));
        assert_eq!(query.filter(), "jo");
    }

    #[test]
    fn page_count_uses_total() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(95, 25), 4);

        let result = ListResult::new(vec![1, 2, 3], 42);
        assert_eq!(result.page_count(10), 5);
    }

    #[test]
    fn offset_is_zero_based() {
        let mut query = ListQuery::new(25);
        assert_eq!(query.offset(), 0);
        query.page = 3;
        assert_eq!(query.offset(), 50);
    }
}
