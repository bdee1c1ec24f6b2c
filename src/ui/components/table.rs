//! Paginated, sortable table.
//!
//! [`DataTable`] holds no data. Every frame it is handed a [`TableView`]
//! borrowed from the screen's controller, and every key that changes the
//! query is forwarded as a [`TableEvent`] carrying the raw requested value.
//! Bounds are the controller's business.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use crate::Theme;
use crate::config::{KeyResolver, ListAction, NavAction, SearchAction};
use crate::listing::{ColumnSpec, ListController, ListQuery, Record};
use crate::ui::{Component, EventResult, Result, Spinner};

const PAGE_STEP: usize = 10;
pub const NO_DATA: &str = "No data found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    PageChange(u32),
    PageSizeChange,
    SortChange(&'static str),
    SearchStarted,
    SearchChanged(String),
    SearchSubmitted,
    SearchCleared,
    Activated(usize),
}

/// Everything the table needs to draw one frame.
pub struct TableView<'a, T> {
    pub columns: &'a [ColumnSpec<T>],
    pub items: &'a [T],
    pub loading: bool,
    pub error: Option<&'a str>,
    pub query: &'a ListQuery,
    pub total_count: u64,
    pub page_count: u32,
    pub pending_filter: Option<&'a str>,
}

impl<'a, T> TableView<'a, T> {
    pub fn new(columns: &'a [ColumnSpec<T>], controller: &'a ListController<T>) -> Self {
        Self {
            columns,
            items: controller.items(),
            loading: controller.is_loading(),
            error: controller.error(),
            query: controller.query(),
            total_count: controller.total_count(),
            page_count: controller.page_count(),
            pending_filter: controller.pending_filter(),
        }
    }

    fn sortable(&self) -> impl Iterator<Item = &ColumnSpec<T>> {
        self.columns.iter().filter(|c| c.sortable)
    }
}

pub struct DataTable {
    title: String,
    state: TableState,
    /// Index into the sortable columns.
    sort_focus: usize,
    searching: bool,
    search: String,
    spinner: Spinner,
    resolver: Arc<KeyResolver>,
}

impl DataTable {
    pub fn new(title: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        let mut spinner = Spinner::new();
        spinner.set_label("Loading...");
        Self {
            title: title.into(),
            state: TableState::default(),
            sort_focus: 0,
            searching: false,
            search: String::new(),
            spinner,
            resolver,
        }
    }

    pub const fn cursor(&self) -> Option<usize> {
        self.state.selected()
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    /// Keep the cursor inside the current page.
    fn clamp_cursor(&mut self, rows: usize) {
        match (rows, self.state.selected()) {
            (0, _) => self.state.select(None),
            (_, None) => self.state.select(Some(0)),
            (n, Some(i)) if i >= n => self.state.select(Some(n - 1)),
            _ => {}
        }
    }

    pub fn handle_key<T>(
        &mut self,
        key: KeyEvent,
        view: &TableView<'_, T>,
    ) -> Result<EventResult<TableEvent>> {
        if self.searching {
            Ok(self.handle_search_key(key))
        } else {
            Ok(self.handle_table_key(key, view))
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> EventResult<TableEvent> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            self.search.clear();
            return TableEvent::SearchCleared.into();
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return TableEvent::SearchSubmitted.into();
        }
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => {
                if self.search.pop().is_some() {
                    TableEvent::SearchChanged(self.search.clone()).into()
                } else {
                    EventResult::Consumed
                }
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.search.clear();
                TableEvent::SearchChanged(String::new()).into()
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.search.push(c);
                TableEvent::SearchChanged(self.search.clone()).into()
            }
            _ => EventResult::Consumed,
        }
    }

    fn handle_table_key<T>(&mut self, key: KeyEvent, view: &TableView<'_, T>) -> EventResult<TableEvent> {
        let rows = view.items.len();
        self.clamp_cursor(rows);
        let r = &self.resolver;

        if r.matches_nav(&key, NavAction::Down) {
            self.state.select(self.state.selected().map(|i| (i + 1).min(rows.saturating_sub(1))));
            return EventResult::Consumed;
        }
        if r.matches_nav(&key, NavAction::Up) {
            self.state.select(self.state.selected().map(|i| i.saturating_sub(1)));
            return EventResult::Consumed;
        }
        if r.matches_nav(&key, NavAction::PageDown) {
            self.state.select(
                self.state
                    .selected()
                    .map(|i| (i + PAGE_STEP).min(rows.saturating_sub(1))),
            );
            return EventResult::Consumed;
        }
        if r.matches_nav(&key, NavAction::PageUp) {
            self.state.select(self.state.selected().map(|i| i.saturating_sub(PAGE_STEP)));
            return EventResult::Consumed;
        }
        if r.matches_nav(&key, NavAction::Home) {
            self.state.select((rows > 0).then_some(0));
            return EventResult::Consumed;
        }
        if r.matches_nav(&key, NavAction::End) {
            self.state.select(rows.checked_sub(1));
            return EventResult::Consumed;
        }
        if r.matches_nav(&key, NavAction::Select) {
            return self
                .state
                .selected()
                .map_or(EventResult::Ignored, |i| TableEvent::Activated(i).into());
        }

        if r.matches_list(&key, ListAction::NextPage) {
            return TableEvent::PageChange(view.query.page.saturating_add(1)).into();
        }
        if r.matches_list(&key, ListAction::PrevPage) {
            return TableEvent::PageChange(view.query.page.saturating_sub(1)).into();
        }
        if r.matches_list(&key, ListAction::PageSize) {
            return TableEvent::PageSizeChange.into();
        }

        let sortable = view.sortable().count();
        if sortable > 0 {
            if r.matches_list(&key, ListAction::SortNext) {
                self.sort_focus = (self.sort_focus + 1) % sortable;
                return EventResult::Consumed;
            }
            if r.matches_list(&key, ListAction::SortPrev) {
                self.sort_focus = (self.sort_focus + sortable - 1) % sortable;
                return EventResult::Consumed;
            }
            if r.matches_list(&key, ListAction::Sort)
                && let Some(column) = view.sortable().nth(self.sort_focus % sortable)
            {
                return TableEvent::SortChange(column.key).into();
            }
        }

        if r.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
            self.search = view
                .pending_filter
                .or(view.query.filter_text.as_deref())
                .unwrap_or_default()
                .to_string();
            return TableEvent::SearchStarted.into();
        }
        if r.matches_search(&key, SearchAction::Exit)
            && (view.query.filter_text.is_some() || view.pending_filter.is_some())
        {
            self.search.clear();
            return TableEvent::SearchCleared.into();
        }

        EventResult::Ignored
    }

    pub fn on_tick(&mut self) {
        self.spinner.on_tick();
    }

    pub fn render<T: Record>(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        view: &TableView<'_, T>,
    ) {
        self.clamp_cursor(view.items.len());

        let show_search = self.searching || view.query.filter_text.is_some() || view.pending_filter.is_some();
        let [body_area, search_area, footer_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(u16::from(show_search)),
            Constraint::Length(1),
        ])
        .areas(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD));

        if view.loading {
            let inner = block.inner(body_area);
            frame.render_widget(block, body_area);
            self.spinner.render(frame, inner, theme);
        } else if view.items.is_empty() {
            let (text, color) = match view.error {
                Some(error) => (error, theme.error()),
                None => (NO_DATA, theme.overlay1()),
            };
            let inner = block.inner(body_area);
            frame.render_widget(block, body_area);
            let message = Paragraph::new(text)
                .style(Style::default().fg(color))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            let line = inner.centered(Constraint::Percentage(100), Constraint::Length(2));
            frame.render_widget(message, line);
        } else {
            let table = Table::new(self.rows(theme, view), view.columns.iter().map(|c| c.width))
                .header(self.header(theme, view))
                .block(block)
                .row_highlight_style(
                    Style::default()
                        .bg(theme.selection_bg())
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");
            frame.render_stateful_widget(table, body_area, &mut self.state);
        }

        if show_search {
            frame.render_widget(self.search_line(theme, view), search_area);
        }
        frame.render_widget(Self::footer(theme, view), footer_area);
    }

    fn header<T>(&self, theme: &Theme, view: &TableView<'_, T>) -> Row<'static> {
        let focused = view.sortable().nth(self.sort_focus).map(|c| c.key);
        let cells = view.columns.iter().map(|column| {
            let mut label = column.label.to_string();
            if view.query.sort_key.as_deref() == Some(column.key) {
                label = format!("{label} {}", view.query.sort_order.arrow());
            }
            let mut style = Style::default().fg(theme.header()).add_modifier(Modifier::BOLD);
            if column.sortable && focused == Some(column.key) {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(label).style(style)
        });
        Row::new(cells).height(1).style(Style::default().bg(theme.surface0()))
    }

    fn rows<T: Record>(&self, theme: &Theme, view: &TableView<'_, T>) -> Vec<Row<'static>> {
        view.items
            .iter()
            .map(|item| {
                Row::new(view.columns.iter().map(|c| c.cell(item, theme)))
                    .style(Style::default().fg(theme.text()))
            })
            .collect()
    }

    fn search_line<T>(&self, theme: &Theme, view: &TableView<'_, T>) -> Paragraph<'static> {
        let (text, style) = if self.searching {
            (format!("/{}_", self.search), Style::default().fg(theme.yellow()))
        } else if let Some(pending) = view.pending_filter {
            (format!("/{pending} (searching...)"), Style::default().fg(theme.subtext0()))
        } else {
            (
                format!("/{} ({} matches)", view.query.filter(), view.total_count),
                Style::default().fg(theme.subtext0()),
            )
        };
        Paragraph::new(text).style(style)
    }

    fn footer<T>(theme: &Theme, view: &TableView<'_, T>) -> Paragraph<'static> {
        let label = Style::default().fg(theme.overlay1());
        let value = Style::default().fg(theme.text()).add_modifier(Modifier::BOLD);
        let dot = Span::styled(" · ", Style::default().fg(theme.surface2()));
        Paragraph::new(Line::from(vec![
            Span::styled("Page ", label),
            Span::styled(view.query.page.to_string(), value),
            Span::styled(" of ", label),
            Span::styled(view.page_count.to_string(), value),
            dot.clone(),
            Span::styled(view.total_count.to_string(), value),
            Span::styled(" total", label),
            dot,
            Span::styled("page size ", label),
            Span::styled(view.query.page_size.to_string(), value),
        ]))
        .alignment(Alignment::Right)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::config::ListingConfig;
    use crate::listing::ListResult;

    #[derive(Clone, Debug)]
    struct Role {
        id: String,
        name: String,
    }

    impl Record for Role {
        fn id(&self) -> &str {
            &self.id
        }

        fn field(&self, key: &str) -> Option<String> {
            match key {
                "name" => Some(self.name.clone()),
                "id" => Some(self.id.clone()),
                _ => None,
            }
        }
    }

    static COLUMNS: &[ColumnSpec<Role>] = &[
        ColumnSpec::new("id", "ID", Constraint::Length(6)),
        ColumnSpec::new("name", "Name", Constraint::Min(10)).sortable(),
        ColumnSpec::new("description", "Description", Constraint::Min(10)).sortable(),
    ];

    fn role(id: &str, name: &str) -> Role {
        Role {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn loaded(items: Vec<Role>, total: u64) -> ListController<Role> {
        let mut c = ListController::new(&ListingConfig::default());
        let req = c.start().unwrap();
        c.apply(req.generation, Ok(ListResult::new(items, total)));
        c
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn table() -> DataTable {
        DataTable::new("Roles", Arc::new(KeyResolver::default()))
    }

    fn draw(table: &mut DataTable, controller: &ListController<Role>) -> String {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|f| table.render(f, f.area(), &theme, &TableView::new(COLUMNS, controller)))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn page_keys_forward_raw_values() {
        let c = loaded(vec![role("1", "admin")], 1);
        let view = TableView::new(COLUMNS, &c);
        let mut t = table();
        assert_eq!(
            t.handle_key(key(KeyCode::Char(']')), &view).unwrap(),
            EventResult::Event(TableEvent::PageChange(2))
        );
        assert_eq!(
            t.handle_key(key(KeyCode::Char('[')), &view).unwrap(),
            EventResult::Event(TableEvent::PageChange(0))
        );
        assert_eq!(
            t.handle_key(key(KeyCode::Char('z')), &view).unwrap(),
            EventResult::Event(TableEvent::PageSizeChange)
        );
    }

    #[test]
    fn sort_focus_cycles_sortable_columns() {
        let c = loaded(vec![role("1", "admin")], 1);
        let view = TableView::new(COLUMNS, &c);
        let mut t = table();
        assert_eq!(
            t.handle_key(key(KeyCode::Char('s')), &view).unwrap(),
            EventResult::Event(TableEvent::SortChange("name"))
        );
        t.handle_key(key(KeyCode::Char('>')), &view).unwrap();
        assert_eq!(
            t.handle_key(key(KeyCode::Char('s')), &view).unwrap(),
            EventResult::Event(TableEvent::SortChange("description"))
        );
        t.handle_key(key(KeyCode::Char('>')), &view).unwrap();
        assert_eq!(
            t.handle_key(key(KeyCode::Char('s')), &view).unwrap(),
            EventResult::Event(TableEvent::SortChange("name"))
        );
    }

    #[test]
    fn search_mode_emits_text() {
        let c = loaded(vec![role("1", "admin")], 1);
        let view = TableView::new(COLUMNS, &c);
        let mut t = table();
        assert_eq!(
            t.handle_key(key(KeyCode::Char('/')), &view).unwrap(),
            EventResult::Event(TableEvent::SearchStarted)
        );
        assert!(t.is_searching());
        t.handle_key(key(KeyCode::Char('j')), &view).unwrap();
        assert_eq!(
            t.handle_key(key(KeyCode::Char('o')), &view).unwrap(),
            EventResult::Event(TableEvent::SearchChanged("jo".to_string()))
        );
        // list shortcuts are plain text while searching
        assert_eq!(
            t.handle_key(key(KeyCode::Char('s')), &view).unwrap(),
            EventResult::Event(TableEvent::SearchChanged("jos".to_string()))
        );
        assert_eq!(
            t.handle_key(key(KeyCode::Enter), &view).unwrap(),
            EventResult::Event(TableEvent::SearchSubmitted)
        );
        assert!(!t.is_searching());
    }

    #[test]
    fn esc_clears_active_filter() {
        let mut c = loaded(vec![role("1", "admin")], 1);
        c.set_filter("adm", std::time::Instant::now());
        let view = TableView::new(COLUMNS, &c);
        let mut t = table();
        assert_eq!(
            t.handle_key(key(KeyCode::Esc), &view).unwrap(),
            EventResult::Event(TableEvent::SearchCleared)
        );

        let c = loaded(vec![role("1", "admin")], 1);
        let view = TableView::new(COLUMNS, &c);
        assert_eq!(t.handle_key(key(KeyCode::Esc), &view).unwrap(), EventResult::Ignored);
    }

    #[test]
    fn enter_activates_cursor_row() {
        let c = loaded(vec![role("1", "admin"), role("2", "clerk")], 2);
        let view = TableView::new(COLUMNS, &c);
        let mut t = table();
        t.handle_key(key(KeyCode::Char('j')), &view).unwrap();
        t.handle_key(key(KeyCode::Char('j')), &view).unwrap();
        assert_eq!(
            t.handle_key(key(KeyCode::Enter), &view).unwrap(),
            EventResult::Event(TableEvent::Activated(1))
        );

        let empty = loaded(vec![], 0);
        let view = TableView::new(COLUMNS, &empty);
        assert_eq!(t.handle_key(key(KeyCode::Enter), &view).unwrap(), EventResult::Ignored);
        assert_eq!(t.cursor(), None);
    }

    #[test]
    fn renders_rows_sort_arrow_and_footer() {
        let mut c = loaded(vec![role("1", "admin")], 1);
        let req = c.set_sort("name").unwrap();
        c.apply(req.generation, Ok(ListResult::new(vec![role("1", "admin")], 31)));

        let text = draw(&mut table(), &c);
        assert!(text.contains("admin"));
        assert!(text.contains("Name ▲"));
        assert!(text.contains("Page 1 of 4 · 31 total · page size 10"));
    }

    #[test]
    fn renders_no_data_and_errors() {
        let c = loaded(vec![], 0);
        assert!(draw(&mut table(), &c).contains(NO_DATA));

        let mut c = ListController::<Role>::new(&ListingConfig::default());
        let req = c.start().unwrap();
        c.apply(req.generation, Err("Failed to fetch roles".to_string()));
        let text = draw(&mut table(), &c);
        assert!(text.contains("Failed to fetch roles"));
        assert!(!text.contains("admin"));
    }

    #[test]
    fn loading_hides_rows() {
        let mut c = loaded(vec![role("1", "admin")], 1);
        c.invalidate();
        let text = draw(&mut table(), &c);
        assert!(text.contains("Loading..."));
        assert!(!text.contains("admin"));
    }
}
