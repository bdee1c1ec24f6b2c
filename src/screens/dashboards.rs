//! Dashboards: which roles may see each dashboard.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::api::ApiClient;
use crate::api::dashboards::{self, DashboardAuthorization, DashboardsFetcher};
use crate::app::AppMessage;
use crate::commands::{Command, report_mutation};
use crate::config::{GlobalAction, KeyResolver, ListAction};
use crate::listing::{ColumnSpec, FetchRequest, ListController, ListPane, PageLoaded, PaneEvent};
use crate::registry::{ScreenContext, ScreenProvider};
use crate::service::{Service, ServiceMsg};
use crate::ui::{Component, EventResult, FormDialog, FormEvent, FormField, Keybinding};

static COLUMNS: &[ColumnSpec<DashboardAuthorization>] = &[
    ColumnSpec::new("name", "Dashboard", Constraint::Percentage(40)).sortable(),
    ColumnSpec::new("roles", "Roles", Constraint::Percentage(60)),
];

pub enum DashboardsMsg {
    Initialize,
    Fetch(FetchRequest),
    Loaded(PageLoaded<DashboardAuthorization>),
    ShowEdit(DashboardAuthorization),
    Save {
        dashboard: DashboardAuthorization,
        roles: Vec<String>,
    },
    Changed,
    Close,
}

struct Editor {
    dialog: FormDialog,
    dashboard: DashboardAuthorization,
}

pub struct DashboardsScreen {
    client: ApiClient,
    pane: ListPane<DashboardAuthorization, DashboardsMsg>,
    editor: Option<Editor>,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<DashboardsMsg>,
    msg_rx: UnboundedReceiver<DashboardsMsg>,
}

/// Split a comma separated role list, dropping blanks and repeats.
fn parse_roles(text: &str) -> Vec<String> {
    let mut roles: Vec<String> = Vec::new();
    for role in text.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        if !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }
    roles
}

impl DashboardsScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let pane = ListPane::new(
            "Dashboards",
            COLUMNS,
            ListController::new(&ctx.config.listing),
            Arc::new(DashboardsFetcher::new(ctx.client.clone())),
            msg_tx.clone(),
            DashboardsMsg::Loaded,
            ctx.resolver.clone(),
        );
        Self {
            client: ctx.client.clone(),
            pane,
            editor: None,
            resolver: ctx.resolver.clone(),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: DashboardsMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn fetch(&self, request: Option<FetchRequest>) -> ServiceMsg {
        request.map_or(ServiceMsg::Idle, |r| {
            ServiceMsg::Run(vec![self.pane.fetch_command(r)])
        })
    }

    fn process_message(&mut self, msg: DashboardsMsg) -> ServiceMsg {
        match msg {
            DashboardsMsg::Initialize => {
                let request = self.pane.start();
                self.fetch(request)
            }
            DashboardsMsg::Fetch(request) => self.fetch(Some(request)),
            DashboardsMsg::Loaded(page) => {
                let request = self.pane.apply(page);
                self.fetch(request)
            }
            DashboardsMsg::ShowEdit(dashboard) => {
                let field = FormField::new("roles", "Roles (comma separated)")
                    .with_value(dashboard.role_list());
                self.editor = Some(Editor {
                    dialog: FormDialog::new(format!("Roles for {}", dashboard.name), vec![field]),
                    dashboard,
                });
                ServiceMsg::Idle
            }
            DashboardsMsg::Save { dashboard, roles } => UpdateDashboardRolesCmd {
                client: self.client.clone(),
                dashboard,
                roles,
                tx: self.msg_tx.clone(),
            }
            .into(),
            DashboardsMsg::Changed => {
                let request = self.pane.invalidate();
                self.fetch(request)
            }
            DashboardsMsg::Close => ServiceMsg::Close,
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let Some(editor) = &mut self.editor else {
            return Ok(EventResult::Ignored);
        };
        let msg = match editor.dialog.handle_key(key)? {
            EventResult::Event(FormEvent::Submitted(values)) => Some(DashboardsMsg::Save {
                dashboard: editor.dashboard.clone(),
                roles: parse_roles(values.get("roles")),
            }),
            EventResult::Event(FormEvent::Cancelled) => None,
            _ => return Ok(EventResult::Consumed),
        };
        self.editor = None;
        if let Some(msg) = msg {
            self.queue(msg);
        }
        Ok(EventResult::Consumed)
    }
}

impl Service for DashboardsScreen {
    fn init(&mut self) {
        self.queue(DashboardsMsg::Initialize);
    }

    fn handle_tick(&mut self) -> bool {
        match self.pane.tick(Instant::now()) {
            Some(request) => {
                self.queue(DashboardsMsg::Fetch(request));
                true
            }
            None => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.editor.is_some() {
            return self.handle_editor_key(key);
        }

        match self.pane.handle_key(key)? {
            EventResult::Event(PaneEvent::Fetch(request)) => {
                self.queue(DashboardsMsg::Fetch(request));
                return Ok(EventResult::Consumed);
            }
            EventResult::Event(PaneEvent::Activated(index)) => {
                if let Some(dashboard) = self.pane.item(index) {
                    self.queue(DashboardsMsg::ShowEdit(dashboard.clone()));
                }
                return Ok(EventResult::Consumed);
            }
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {}
        }

        let r = &self.resolver;
        let msg = if r.matches_list(&key, ListAction::Edit) {
            self.pane.selected().cloned().map(DashboardsMsg::ShowEdit)
        } else if r.matches_global(&key, GlobalAction::Back) {
            Some(DashboardsMsg::Close)
        } else {
            return Ok(EventResult::Ignored);
        };

        if let Some(msg) = msg {
            self.queue(msg);
        }
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
        if let Some(editor) = &mut self.editor {
            editor.dialog.render(frame, area, theme);
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let mut bc = vec!["Dashboards".to_string()];
        if let Some(editor) = &self.editor {
            bc.push(editor.dashboard.name.clone());
        }
        bc
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut bindings = self.pane.keybindings();
        bindings.push(Keybinding::hint(
            self.resolver.display_list(ListAction::Edit),
            "Edit roles",
        ));
        bindings
    }
}

struct UpdateDashboardRolesCmd {
    client: ApiClient,
    dashboard: DashboardAuthorization,
    roles: Vec<String>,
    tx: UnboundedSender<DashboardsMsg>,
}

#[async_trait]
impl Command for UpdateDashboardRolesCmd {
    fn name(&self) -> String {
        format!("Updating roles of {}", self.dashboard.name)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let outcome = dashboards::update_roles(&self.client, &self.dashboard, self.roles).await;
        let success = format!("Roles of {} updated", self.dashboard.name);
        report_mutation(outcome, success, &app_tx, &self.tx, DashboardsMsg::Changed);
        Ok(())
    }
}

pub struct DashboardsProvider;

impl ScreenProvider for DashboardsProvider {
    fn key(&self) -> &'static str {
        "dashboards"
    }

    fn display_name(&self) -> &'static str {
        "Dashboards"
    }

    fn description(&self) -> &'static str {
        "Choose which roles can see each dashboard"
    }

    fn create(&self, ctx: &ScreenContext) -> Box<dyn Service> {
        Box::new(DashboardsScreen::new(ctx))
    }
}
