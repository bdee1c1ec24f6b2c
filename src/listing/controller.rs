//! Parameter state for one listing screen.
//!
//! The controller never performs I/O. Every operation that changes the
//! query returns a [`FetchRequest`] which the screen turns into a
//! [`FetchPageCmd`](crate::listing::FetchPageCmd). Requests carry a strictly
//! increasing generation and only the response to the latest one is kept.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::ListingConfig;
use crate::listing::query::{ListQuery, ListResult, SortOrder, page_count};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub query: ListQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(ListResult<T>),
    Failed(String),
}

/// What [`ListController::apply`] did with a response.
#[derive(Debug, PartialEq, Eq)]
pub enum Applied {
    /// Superseded by a newer request and dropped.
    Stale,
    Stored,
    /// The current page no longer exists (rows were deleted); the last
    /// page must be fetched instead.
    Refetch(FetchRequest),
}

#[derive(Debug, Clone)]
struct PendingFilter {
    text: String,
    deadline: Instant,
}

pub struct ListController<T> {
    query: ListQuery,
    state: LoadState<T>,
    generation: u64,
    in_flight: Option<u64>,
    /// Last known total, kept while a new page is loading.
    total_count: u64,
    page_size_options: Vec<u32>,
    debounce: Duration,
    pending_filter: Option<PendingFilter>,
}

impl<T> ListController<T> {
    pub fn new(config: &ListingConfig) -> Self {
        Self {
            query: ListQuery::new(config.page_size),
            state: LoadState::Idle,
            generation: 0,
            in_flight: None,
            total_count: 0,
            page_size_options: config.page_size_options.clone(),
            debounce: config.search_debounce(),
            pending_filter: None,
        }
    }

    /// Initial sort, applied before the first fetch.
    #[must_use]
    pub fn with_sort(mut self, key: &str, order: SortOrder) -> Self {
        self.query = self.query.with_sort(key, order);
        self
    }

    fn issue(&mut self) -> FetchRequest {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.state = LoadState::Loading;
        debug!(generation = self.generation, query = ?self.query, "Issuing fetch");
        FetchRequest {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    pub fn start(&mut self) -> Option<FetchRequest> {
        Some(self.issue())
    }

    pub fn set_page(&mut self, page: u32) -> Option<FetchRequest> {
        let page = page.clamp(1, self.page_count());
        if page == self.query.page {
            return None;
        }
        self.query.page = page;
        Some(self.issue())
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        self.set_page(self.query.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        self.set_page(self.query.page.saturating_sub(1))
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Option<FetchRequest> {
        if page_size == 0 {
            warn!("Ignoring page size of zero");
            return None;
        }
        if page_size == self.query.page_size {
            return None;
        }
        self.query.page_size = page_size;
        self.query.page = 1;
        Some(self.issue())
    }

    /// Step to the next configured page size, wrapping around.
    pub fn cycle_page_size(&mut self) -> Option<FetchRequest> {
        let current = self.query.page_size;
        let next = self
            .page_size_options
            .iter()
            .copied()
            .find(|&size| size > current)
            .or_else(|| self.page_size_options.first().copied())?;
        self.set_page_size(next)
    }

    /// Sort by `key`; the same key flips the direction, a new key starts
    /// ascending.
    pub fn set_sort(&mut self, key: &str) -> Option<FetchRequest> {
        if self.query.sort_key.as_deref() == Some(key) {
            self.query.sort_order = self.query.sort_order.toggle();
        } else {
            self.query.sort_key = Some(key.to_string());
            self.query.sort_order = SortOrder::Asc;
        }
        self.query.page = 1;
        Some(self.issue())
    }

    /// Record search text. The fetch happens from [`poll`](Self::poll) once
    /// the debounce delay has passed without further typing.
    pub fn set_filter(&mut self, text: &str, now: Instant) -> Option<FetchRequest> {
        self.pending_filter = Some(PendingFilter {
            text: text.to_string(),
            deadline: now + self.debounce,
        });
        None
    }

    pub fn poll(&mut self, now: Instant) -> Option<FetchRequest> {
        let due = self
            .pending_filter
            .as_ref()
            .is_some_and(|pending| pending.deadline <= now);
        if due { self.flush_filter() } else { None }
    }

    pub fn flush_filter(&mut self) -> Option<FetchRequest> {
        let pending = self.pending_filter.take()?;
        self.apply_filter(&pending.text)
    }

    pub fn clear_filter(&mut self) -> Option<FetchRequest> {
        self.pending_filter = None;
        self.apply_filter("")
    }

    fn apply_filter(&mut self, text: &str) -> Option<FetchRequest> {
        let before = self.query.filter_text.clone();
        self.query.set_filter_text(text);
        if self.query.filter_text == before {
            return None;
        }
        self.query.page = 1;
        Some(self.issue())
    }

    /// Re-fetch the current parameters.
    pub fn invalidate(&mut self) -> Option<FetchRequest> {
        Some(self.issue())
    }

    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<ListResult<T>, String>,
    ) -> Applied {
        if self.in_flight != Some(generation) {
            warn!(
                generation,
                latest = self.generation,
                "Discarding stale page response"
            );
            return Applied::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(mut page) => {
                let limit = self.query.page_size as usize;
                if page.items.len() > limit {
                    warn!(
                        received = page.items.len(),
                        page_size = limit,
                        "Backend returned more rows than requested, truncating"
                    );
                    page.items.truncate(limit);
                }
                self.total_count = page.total_count;

                let last = page.page_count(self.query.page_size);
                if page.items.is_empty() && self.query.page > last {
                    self.query.page = last;
                    return Applied::Refetch(self.issue());
                }

                debug!(generation, rows = page.items.len(), total = page.total_count, "Page loaded");
                self.state = LoadState::Loaded(page);
            }
            Err(message) => {
                debug!(generation, %message, "Page failed");
                self.state = LoadState::Failed(message);
            }
        }
        Applied::Stored
    }

    pub const fn query(&self) -> &ListQuery {
        &self.query
    }

    pub const fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        match &self.state {
            LoadState::Loaded(page) => &page.items,
            _ => &[],
        }
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items().get(index)
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total_count, self.query.page_size)
    }

    pub fn pending_filter(&self) -> Option<&str> {
        self.pending_filter.as_ref().map(|p| p.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn controller() -> ListController<u32> {
        ListController::new(&ListingConfig::default())
    }

    fn page(items: Vec<u32>, total: u64) -> Result<ListResult<u32>, String> {
        Ok(ListResult::new(items, total))
    }

    fn loaded(total: u64) -> ListController<u32> {
        let mut c = controller();
        let req = c.start().unwrap();
        c.apply(req.generation, page((0..10).collect(), total));
        c
    }

    #[test]
    fn start_goes_straight_to_loading() {
        let mut c = controller();
        assert_eq!(c.state(), &LoadState::Idle);
        let req = c.start().unwrap();
        assert!(c.is_loading());
        assert_eq!(req.generation, 1);
        assert_eq!(req.query.page, 1);
        assert_eq!(req.query.page_size, 10);
    }

    #[test]
    fn loading_flag_wraps_each_fetch() {
        let mut c = loaded(30);
        assert!(!c.is_loading());

        let req = c.next_page().unwrap();
        assert!(c.is_loading());
        assert_eq!(c.apply(req.generation, page(vec![1], 30)), Applied::Stored);
        assert!(!c.is_loading());
        assert_eq!(c.items(), &[1]);
    }

    #[test]
    fn sort_toggles_on_same_key() {
        let mut c = loaded(30);
        c.set_page(2);

        let first = c.set_sort("created").unwrap();
        assert_eq!(first.query.sort_key.as_deref(), Some("created"));
        assert_eq!(first.query.sort_order, SortOrder::Asc);
        assert_eq!(first.query.page, 1);

        let second = c.set_sort("created").unwrap();
        assert_eq!(second.query.sort_order, SortOrder::Desc);

        let third = c.set_sort("created").unwrap();
        assert_eq!(third.query.sort_order, SortOrder::Asc);

        let other = c.set_sort("formName").unwrap();
        assert_eq!(other.query.sort_key.as_deref(), Some("formName"));
        assert_eq!(other.query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn initial_sort_is_kept_until_changed() {
        let mut c = controller().with_sort("created", SortOrder::Desc);
        let req = c.start().unwrap();
        assert_eq!(req.query.sort_order, SortOrder::Desc);
        let req = c.set_sort("created").unwrap();
        assert_eq!(req.query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn page_is_clamped() {
        let mut c = loaded(25);
        assert_eq!(c.page_count(), 3);

        let req = c.set_page(99).unwrap();
        assert_eq!(req.query.page, 3);
        c.apply(req.generation, page(vec![1, 2, 3, 4, 5], 25));

        assert_eq!(c.set_page(3), None);
        assert_eq!(c.next_page(), None);

        let req = c.set_page(0).unwrap();
        assert_eq!(req.query.page, 1);
    }

    #[test]
    fn prev_page_on_first_page_does_nothing() {
        let mut c = loaded(25);
        assert_eq!(c.prev_page(), None);
        assert!(!c.is_loading());
    }

    #[test]
    fn page_size_resets_page() {
        let mut c = loaded(100);
        c.set_page(4);
        let req = c.set_page_size(25).unwrap();
        assert_eq!(req.query.page, 1);
        assert_eq!(req.query.page_size, 25);
        assert_eq!(c.set_page_size(25), None);
        assert_eq!(c.set_page_size(0), None);
    }

    #[test]
    fn page_size_cycles_through_options() {
        let mut c = controller();
        let sizes: Vec<u32> = (0..5)
            .map(|_| c.cycle_page_size().unwrap().query.page_size)
            .collect();
        assert_eq!(sizes, vec![25, 50, 100, 5, 10]);
    }

    #[test]
    fn filter_is_debounced() {
        let mut c = loaded(30);
        let t0 = Instant::now();

        assert_eq!(c.set_filter("j", t0), None);
        assert_eq!(c.set_filter("jo", t0 + Duration::from_millis(200)), None);
        assert_eq!(c.pending_filter(), Some("jo"));

        assert_eq!(c.poll(t0 + Duration::from_millis(1500)), None);

        let req = c.poll(t0 + Duration::from_millis(1700)).unwrap();
        assert_eq!(req.query.filter_text.as_deref(), Some("jo"));
        assert_eq!(req.query.page, 1);
        assert_eq!(c.pending_filter(), None);

        assert_eq!(c.poll(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn empty_filter_shows_everything() {
        let mut c = loaded(30);
        let t0 = Instant::now();
        c.set_filter("jo", t0);
        let req = c.flush_filter().unwrap();
        c.apply(req.generation, page(vec![1], 1));

        let req = c.clear_filter().unwrap();
        assert_eq!(req.query.filter_text, None);

        assert_eq!(c.clear_filter(), None);
    }

    #[test]
    fn unchanged_filter_does_not_refetch() {
        let mut c = loaded(30);
        c.set_filter("", Instant::now());
        assert_eq!(c.flush_filter(), None);
        assert!(!c.is_loading());
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut c = loaded(30);
        let a = c.next_page().unwrap();
        // second click before the first response arrives
        let b = c.next_page().unwrap();
        assert!(b.generation > a.generation);

        assert_eq!(c.apply(b.generation, page(vec![3], 30)), Applied::Stored);
        assert_eq!(c.apply(a.generation, page(vec![2], 30)), Applied::Stale);
        assert_eq!(c.items(), &[3]);
        assert_eq!(c.query().page, 3);
    }

    #[test]
    fn duplicate_response_is_stale() {
        let mut c = controller();
        let req = c.start().unwrap();
        assert_eq!(c.apply(req.generation, page(vec![1], 1)), Applied::Stored);
        assert_eq!(c.apply(req.generation, page(vec![2], 1)), Applied::Stale);
        assert_eq!(c.items(), &[1]);
    }

    #[test]
    fn oversized_pages_are_truncated() {
        let mut c = controller();
        let req = c.start().unwrap();
        c.apply(req.generation, page((0..15).collect(), 15));
        assert_eq!(c.items().len(), 10);
        assert_eq!(c.total_count(), 15);
        assert_eq!(c.page_count(), 2);
    }

    #[test]
    fn failures_keep_the_message() {
        let mut c = controller();
        let req = c.start().unwrap();
        c.apply(req.generation, Err("Failed to fetch roles".to_string()));
        assert_eq!(c.error(), Some("Failed to fetch roles"));
        assert!(c.items().is_empty());
        assert!(!c.is_loading());
    }

    #[test]
    fn invalidate_refetches_same_query() {
        let mut c = loaded(30);
        let before = c.query().clone();
        let req = c.invalidate().unwrap();
        assert_eq!(req.query, before);
        assert!(c.is_loading());
    }

    #[test]
    fn vanished_page_falls_back_to_last() {
        let mut c = loaded(21);
        let req = c.set_page(3).unwrap();
        c.apply(req.generation, page(vec![20], 21));

        let req = c.invalidate().unwrap();
        let Applied::Refetch(retry) = c.apply(req.generation, page(vec![], 20)) else {
            panic!("expected a refetch");
        };
        assert_eq!(retry.query.page, 2);
        assert!(c.is_loading());
    }
}
