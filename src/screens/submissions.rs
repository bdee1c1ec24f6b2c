//! Submissions: read-only, server paged and sorted, newest first.

use std::sync::Arc;
use std::time::Instant;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::Cell;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::api::submissions::{DEFAULT_SORT, Submission, SubmissionsFetcher};
use crate::config::{GlobalAction, KeyResolver};
use crate::listing::{
    ColumnSpec, FetchRequest, ListController, ListPane, PageLoaded, PaneEvent, SortOrder,
};
use crate::registry::{ScreenContext, ScreenProvider};
use crate::service::{Service, ServiceMsg};
use crate::ui::{EventResult, Keybinding};

fn status_cell(row: &Submission, theme: &Theme) -> Cell<'static> {
    let status = row.application_status.clone().unwrap_or_default();
    let color = match status.to_ascii_lowercase().as_str() {
        "approved" | "completed" => theme.success(),
        "rejected" => theme.error(),
        _ => theme.text(),
    };
    Cell::from(status).style(color)
}

static COLUMNS: &[ColumnSpec<Submission>] = &[
    ColumnSpec::new("formName", "Form Name", Constraint::Percentage(25)).sortable(),
    ColumnSpec::new("id", "Submission Id", Constraint::Percentage(15)),
    ColumnSpec::new("createdBy", "Submitted By", Constraint::Percentage(20)).sortable(),
    ColumnSpec::new("created", "Submission Date", Constraint::Percentage(20)).sortable(),
    ColumnSpec::new("applicationStatus", "Status", Constraint::Percentage(20))
        .sortable()
        .with_render(status_cell),
];

pub enum SubmissionsMsg {
    Initialize,
    Fetch(FetchRequest),
    Loaded(PageLoaded<Submission>),
    Close,
}

pub struct SubmissionsScreen {
    pane: ListPane<Submission, SubmissionsMsg>,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<SubmissionsMsg>,
    msg_rx: UnboundedReceiver<SubmissionsMsg>,
}

impl SubmissionsScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let controller =
            ListController::new(&ctx.config.listing).with_sort(DEFAULT_SORT, SortOrder::Desc);
        // The submissions query takes no search argument.
        let pane = ListPane::new(
            "Submissions",
            COLUMNS,
            controller,
            Arc::new(SubmissionsFetcher::new(ctx.client.clone())),
            msg_tx.clone(),
            SubmissionsMsg::Loaded,
            ctx.resolver.clone(),
        )
        .without_search();
        Self {
            pane,
            resolver: ctx.resolver.clone(),
            msg_tx,
            msg_rx,
        }
    }

    fn fetch(&self, request: Option<FetchRequest>) -> ServiceMsg {
        request.map_or(ServiceMsg::Idle, |r| {
            ServiceMsg::Run(vec![self.pane.fetch_command(r)])
        })
    }

    fn process_message(&mut self, msg: SubmissionsMsg) -> ServiceMsg {
        match msg {
            SubmissionsMsg::Initialize => {
                let request = self.pane.start();
                self.fetch(request)
            }
            SubmissionsMsg::Fetch(request) => self.fetch(Some(request)),
            SubmissionsMsg::Loaded(page) => {
                let request = self.pane.apply(page);
                self.fetch(request)
            }
            SubmissionsMsg::Close => ServiceMsg::Close,
        }
    }
}

impl Service for SubmissionsScreen {
    fn init(&mut self) {
        let _ = self.msg_tx.send(SubmissionsMsg::Initialize);
    }

    fn handle_tick(&mut self) -> bool {
        match self.pane.tick(Instant::now()) {
            Some(request) => {
                let _ = self.msg_tx.send(SubmissionsMsg::Fetch(request));
                true
            }
            None => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let msg = match self.pane.handle_key(key)? {
            EventResult::Event(PaneEvent::Fetch(request)) => SubmissionsMsg::Fetch(request),
            EventResult::Event(PaneEvent::Activated(_)) | EventResult::Consumed => {
                return Ok(EventResult::Consumed);
            }
            EventResult::Ignored if self.resolver.matches_global(&key, GlobalAction::Back) => {
                SubmissionsMsg::Close
            }
            EventResult::Ignored => return Ok(EventResult::Ignored),
        };
        let _ = self.msg_tx.send(msg);
        Ok(EventResult::Consumed)
    }

    fn update(&mut self) -> Result<ServiceMsg> {
        let mut result = ServiceMsg::Idle;
        while let Ok(msg) = self.msg_rx.try_recv() {
            result = result.merge(self.process_message(msg));
            if matches!(result, ServiceMsg::Close) {
                break;
            }
        }
        Ok(result)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.pane.render(frame, area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Submissions".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        self.pane.keybindings()
    }
}

pub struct SubmissionsProvider;

impl ScreenProvider for SubmissionsProvider {
    fn key(&self) -> &'static str {
        "submissions"
    }

    fn display_name(&self) -> &'static str {
        "Submissions"
    }

    fn description(&self) -> &'static str {
        "Browse form submissions, newest first"
    }

    fn create(&self, ctx: &ScreenContext) -> Box<dyn Service> {
        Box::new(SubmissionsScreen::new(ctx))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::screens::testing::{context_for, screen_text};
    use crate::service::testing::{command_names, run};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    async fn mount_order(server: &MockServer, order: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({"variables": {
                "sortBy": "created", "sortOrder": order
            }})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {
                "getSubmission": {
                    "submissions": [{
                        "id": 7,
                        "formName": "Leave request",
                        "createdBy": "john",
                        "created": "2024-03-01T10:15:00Z",
                        "applicationStatus": "Approved"
                    }],
                    "totalCount": 1,
                    "pageNo": 1
                }
            }})))
            .expect(times)
            .mount(server)
            .await;
    }

    async fn settle(screen: &mut SubmissionsScreen) {
        let msg = screen.update().unwrap();
        assert_eq!(command_names(&msg), vec!["Loading submissions (page 1)"]);
        run(msg).await;
        screen.update().unwrap();
    }

    #[tokio::test]
    async fn sorting_by_date_flips_direction_and_refetches() {
        let server = MockServer::start().await;
        mount_order(&server, "desc", 2).await;
        mount_order(&server, "asc", 1).await;

        let mut screen = SubmissionsScreen::new(&context_for(&server));
        screen.init();
        settle(&mut screen).await;
        let text = screen_text(&mut screen);
        assert!(text.contains("Leave request"));
        assert!(text.contains("Approved"));

        // Focus moves formName -> createdBy -> created.
        screen.handle_key(key('>')).unwrap();
        screen.handle_key(key('>')).unwrap();
        assert!(matches!(screen.update().unwrap(), ServiceMsg::Idle));

        screen.handle_key(key('s')).unwrap();
        settle(&mut screen).await;
        screen.handle_key(key('s')).unwrap();
        settle(&mut screen).await;
    }

    #[tokio::test]
    async fn search_key_is_ignored() {
        let server = MockServer::start().await;
        mount_order(&server, "desc", 1).await;

        let mut screen = SubmissionsScreen::new(&context_for(&server));
        screen.init();
        settle(&mut screen).await;

        let result = screen.handle_key(key('/')).unwrap();
        assert!(matches!(result, EventResult::Ignored));
        assert!(
            !screen
                .keybindings()
                .iter()
                .any(|k| k.description == "Search")
        );
    }
}
