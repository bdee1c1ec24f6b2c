use std::sync::Arc;
use std::time::Instant;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::Theme;
use crate::commands::Command;
use crate::config::{KeyResolver, ListAction, SearchAction};
use crate::listing::{
    Applied, ColumnSpec, DataFetcher, FetchPageCmd, FetchRequest, ListController, PageLoaded,
    Record,
};
use crate::ui::{DataTable, EventResult, Keybinding, Result, TableEvent, TableView};

#[derive(Debug, PartialEq, Eq)]
pub enum PaneEvent {
    /// The query changed; the screen must run this fetch.
    Fetch(FetchRequest),
    /// Enter on a row of the current page.
    Activated(usize),
}

/// A controller, its table and its fetcher, bundled for a screen.
///
/// Pages are delivered to the screen's own message channel through `wrap`,
/// so the screen decides when to hand them back via [`apply`](Self::apply).
pub struct ListPane<T: 'static, M> {
    columns: &'static [ColumnSpec<T>],
    controller: ListController<T>,
    table: DataTable,
    fetcher: Arc<dyn DataFetcher<T>>,
    tx: UnboundedSender<M>,
    wrap: fn(PageLoaded<T>) -> M,
    resolver: Arc<KeyResolver>,
    searchable: bool,
}

impl<T: Record, M: Send + 'static> ListPane<T, M> {
    pub fn new(
        title: impl Into<String>,
        columns: &'static [ColumnSpec<T>],
        controller: ListController<T>,
        fetcher: Arc<dyn DataFetcher<T>>,
        tx: UnboundedSender<M>,
        wrap: fn(PageLoaded<T>) -> M,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            columns,
            controller,
            table: DataTable::new(title, resolver.clone()),
            fetcher,
            tx,
            wrap,
            resolver,
            searchable: true,
        }
    }

    /// For resources whose API cannot filter.
    #[must_use]
    pub const fn without_search(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn start(&mut self) -> Option<FetchRequest> {
        self.controller.start()
    }

    pub fn invalidate(&mut self) -> Option<FetchRequest> {
        self.controller.invalidate()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<PaneEvent>> {
        if !self.searchable && self.resolver.matches_search(&key, SearchAction::Toggle) {
            return Ok(EventResult::Ignored);
        }
        let view = TableView::new(self.columns, &self.controller);
        let event = match self.table.handle_key(key, &view)? {
            EventResult::Event(event) => event,
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {
                if self.resolver.matches_list(&key, ListAction::Reload) {
                    return Ok(self
                        .invalidate()
                        .map_or(EventResult::Consumed, |r| PaneEvent::Fetch(r).into()));
                }
                return Ok(EventResult::Ignored);
            }
        };

        let request = match event {
            TableEvent::PageChange(page) => self.controller.set_page(page),
            TableEvent::PageSizeChange => self.controller.cycle_page_size(),
            TableEvent::SortChange(key) => self.controller.set_sort(key),
            TableEvent::SearchStarted => None,
            TableEvent::SearchChanged(text) => self.controller.set_filter(&text, Instant::now()),
            TableEvent::SearchSubmitted => self.controller.flush_filter(),
            TableEvent::SearchCleared => self.controller.clear_filter(),
            TableEvent::Activated(index) => return Ok(PaneEvent::Activated(index).into()),
        };
        Ok(request.map_or(EventResult::Consumed, |r| PaneEvent::Fetch(r).into()))
    }

    /// Advance the spinner and fire a debounced search that has come due.
    pub fn tick(&mut self, now: Instant) -> Option<FetchRequest> {
        self.table.on_tick();
        self.controller.poll(now)
    }

    /// Store a page that came back from a fetch command.
    pub fn apply(&mut self, page: PageLoaded<T>) -> Option<FetchRequest> {
        match self.controller.apply(page.generation, page.result) {
            Applied::Refetch(request) => Some(request),
            Applied::Stale => {
                debug!(resource = self.fetcher.resource(), "Ignored stale page");
                None
            }
            Applied::Stored => None,
        }
    }

    pub fn fetch_command(&self, request: FetchRequest) -> Box<dyn Command> {
        Box::new(FetchPageCmd::new(
            self.fetcher.clone(),
            request,
            self.tx.clone(),
            self.wrap,
        ))
    }

    pub fn selected(&self) -> Option<&T> {
        self.table.cursor().and_then(|i| self.controller.item(i))
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.controller.item(index)
    }

    pub const fn is_searching(&self) -> bool {
        self.table.is_searching()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let view = TableView::new(self.columns, &self.controller);
        self.table.render(frame, area, theme, &view);
    }

    pub fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        let mut bindings = vec![
            Keybinding::hint(r.display_list(ListAction::Reload), "Reload"),
            Keybinding::hint(
                format!(
                    "{}/{}",
                    r.display_list(ListAction::PrevPage),
                    r.display_list(ListAction::NextPage)
                ),
                "Page",
            ),
            Keybinding::new(r.display_list(ListAction::PageSize), "Page size"),
        ];
        if self.columns.iter().any(|c| c.sortable) {
            bindings.push(Keybinding::new(
                format!(
                    "{}/{}",
                    r.display_list(ListAction::SortPrev),
                    r.display_list(ListAction::SortNext)
                ),
                "Sort column",
            ));
            bindings.push(Keybinding::hint(r.display_list(ListAction::Sort), "Sort"));
        }
        if self.searchable {
            bindings.push(Keybinding::hint(r.display_search(SearchAction::Toggle), "Search"));
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::layout::Constraint;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::config::ListingConfig;
    use crate::listing::testing::StubFetcher;
    use crate::listing::{ListResult, SortOrder};

    #[derive(Clone, Debug, PartialEq)]
    struct User(String);

    impl Record for User {
        fn id(&self) -> &str {
            &self.0
        }

        fn field(&self, key: &str) -> Option<String> {
            (key == "username").then(|| self.0.clone())
        }
    }

    static COLUMNS: &[ColumnSpec<User>] =
        &[ColumnSpec::new("username", "Username", Constraint::Min(10)).sortable()];

    #[derive(Debug)]
    enum Msg {
        Loaded(PageLoaded<User>),
    }

    fn pane(
        fetcher: Arc<StubFetcher<User>>,
    ) -> (ListPane<User, Msg>, UnboundedReceiver<Msg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pane = ListPane::new(
            "Users",
            COLUMNS,
            ListController::new(&ListingConfig::default()),
            fetcher,
            tx,
            Msg::Loaded,
            Arc::new(KeyResolver::default()),
        );
        (pane, rx)
    }

    fn users(query: &crate::listing::ListQuery) -> Result<ListResult<User>, crate::api::ApiError> {
        let name = query.filter_text.clone().unwrap_or_else(|| "everyone".to_string());
        Ok(ListResult::new(vec![User(name)], 1))
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    async fn run(pane: &mut ListPane<User, Msg>, rx: &mut UnboundedReceiver<Msg>, request: FetchRequest) {
        let (app_tx, _app_rx) = mpsc::unbounded_channel();
        pane.fetch_command(request).execute(app_tx).await.unwrap();
        let Msg::Loaded(page) = rx.recv().await.unwrap();
        assert_eq!(pane.apply(page), None);
    }

    #[tokio::test]
    async fn search_is_fetched_once_after_debounce() {
        let fetcher = Arc::new(StubFetcher::new(users));
        let (mut pane, mut rx) = pane(fetcher.clone());
        let request = pane.start().unwrap();
        run(&mut pane, &mut rx, request).await;

        assert_eq!(pane.handle_key(key('/')).unwrap(), EventResult::Consumed);
        assert_eq!(pane.handle_key(key('j')).unwrap(), EventResult::Consumed);
        assert_eq!(pane.handle_key(key('o')).unwrap(), EventResult::Consumed);
        assert_eq!(pane.tick(Instant::now()), None);

        let request = pane.tick(Instant::now() + Duration::from_millis(1600)).unwrap();
        assert_eq!(request.query.filter_text.as_deref(), Some("jo"));
        assert_eq!(request.query.page, 1);
        run(&mut pane, &mut rx, request).await;
        assert_eq!(pane.tick(Instant::now() + Duration::from_secs(5)), None);

        let queries = fetcher.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].filter_text.as_deref(), Some("jo"));
        drop(queries);
        assert_eq!(pane.item(0), Some(&User("jo".to_string())));
    }

    #[tokio::test]
    async fn sort_key_toggles_and_refetches() {
        let fetcher = Arc::new(StubFetcher::new(users));
        let (mut pane, mut rx) = pane(fetcher.clone());
        let request = pane.start().unwrap();
        run(&mut pane, &mut rx, request).await;

        let EventResult::Event(PaneEvent::Fetch(first)) = pane.handle_key(key('s')).unwrap() else {
            panic!("expected a fetch");
        };
        assert_eq!(first.query.sort_order, SortOrder::Asc);
        run(&mut pane, &mut rx, first).await;

        let EventResult::Event(PaneEvent::Fetch(second)) = pane.handle_key(key('s')).unwrap() else {
            panic!("expected a fetch");
        };
        assert_eq!(second.query.sort_key.as_deref(), Some("username"));
        assert_eq!(second.query.sort_order, SortOrder::Desc);
    }

    #[tokio::test]
    async fn reload_and_activation() {
        let fetcher = Arc::new(StubFetcher::new(users));
        let (mut pane, mut rx) = pane(fetcher);
        let request = pane.start().unwrap();
        run(&mut pane, &mut rx, request).await;

        assert!(matches!(
            pane.handle_key(key('r')).unwrap(),
            EventResult::Event(PaneEvent::Fetch(_))
        ));
        let request = pane.invalidate().unwrap();
        run(&mut pane, &mut rx, request).await;

        assert_eq!(
            pane.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)).unwrap(),
            EventResult::Event(PaneEvent::Activated(0))
        );
        assert_eq!(pane.selected(), Some(&User("everyone".to_string())));
        assert!(!pane.keybindings().is_empty());
    }

    #[tokio::test]
    async fn search_can_be_switched_off() {
        let (pane, _rx) = pane(Arc::new(StubFetcher::new(users)));
        let mut pane = pane.without_search();
        assert_eq!(pane.handle_key(key('/')).unwrap(), EventResult::Ignored);
        assert!(!pane.is_searching());
        assert!(!pane.keybindings().iter().any(|k| k.description == "Search"));
    }
}
