//! Roles: list, create, edit and delete permission groups.

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
use crate::api::roles::{self, Role, RoleDraft, RolesFetcher};
use crate::app::AppMessage;
use crate::commands::{Command, report_mutation};
use crate::config::{GlobalAction, KeyResolver, ListAction};
use crate::listing::{ColumnSpec, FetchRequest, ListController, ListPane, PageLoaded, PaneEvent};
use crate::registry::{ScreenContext, ScreenProvider};
use crate::service::{Service, ServiceMsg};
use crate::ui::{
    Component, ConfirmDialog, ConfirmEvent, EventResult, FormDialog, FormEvent, FormField,
    FormValues, Keybinding,
};

static COLUMNS: &[ColumnSpec<Role>] = &[
    ColumnSpec::new("name", "Name", Constraint::Percentage(35)).sortable(),
    ColumnSpec::new("description", "Description", Constraint::Percentage(65)).sortable(),
];

pub enum RolesMsg {
    Initialize,
    Fetch(FetchRequest),
    Loaded(PageLoaded<Role>),
    ShowCreate,
    ShowEdit(Role),
    ShowDelete(Role),
    Create(RoleDraft),
    Update { id: String, draft: RoleDraft },
    Delete(Role),
    /// A mutation succeeded; reload the current page.
    Changed,
    Close,
}

enum Modal {
    Form {
        dialog: FormDialog,
        editing: Option<Role>,
    },
    Delete {
        dialog: ConfirmDialog,
        role: Role,
    },
}

pub struct RolesScreen {
    client: ApiClient,
    pane: ListPane<Role, RolesMsg>,
    modal: Option<Modal>,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<RolesMsg>,
    msg_rx: UnboundedReceiver<RolesMsg>,
}

impl RolesScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let pane = ListPane::new(
            "Roles",
            COLUMNS,
            ListController::new(&ctx.config.listing),
            Arc::new(RolesFetcher::new(ctx.client.clone())),
            msg_tx.clone(),
            RolesMsg::Loaded,
            ctx.resolver.clone(),
        );
        Self {
            client: ctx.client.clone(),
            pane,
            modal: None,
            resolver: ctx.resolver.clone(),
            msg_tx,
            msg_rx,
        }
    }

    /// Queue a message to be processed by update().
    fn queue(&self, msg: RolesMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn fetch(&self, request: Option<FetchRequest>) -> ServiceMsg {
        request.map_or(ServiceMsg::Idle, |r| {
            ServiceMsg::Run(vec![self.pane.fetch_command(r)])
        })
    }

    fn role_form(title: &str, role: Option<&Role>) -> FormDialog {
        let mut name = FormField::new("name", "Name").required();
        let mut description = FormField::new("description", "Description");
        if let Some(role) = role {
            name = name.with_value(role.name.clone());
            description = description.with_value(role.description.clone().unwrap_or_default());
        }
        FormDialog::new(title, vec![name, description])
    }

    fn draft(values: &FormValues) -> RoleDraft {
        RoleDraft {
            name: values.get("name").to_string(),
            description: values.get("description").to_string(),
        }
    }

    fn process_message(&mut self, msg: RolesMsg) -> ServiceMsg {
        match msg {
            RolesMsg::Initialize => {
                let request = self.pane.start();
                self.fetch(request)
            }
            RolesMsg::Fetch(request) => self.fetch(Some(request)),
            RolesMsg::Loaded(page) => {
                let request = self.pane.apply(page);
                self.fetch(request)
            }
            RolesMsg::ShowCreate => {
                self.modal = Some(Modal::Form {
                    dialog: Self::role_form("New role", None),
                    editing: None,
                });
                ServiceMsg::Idle
            }
            RolesMsg::ShowEdit(role) => {
                self.modal = Some(Modal::Form {
                    dialog: Self::role_form("Edit role", Some(&role)),
                    editing: Some(role),
                });
                ServiceMsg::Idle
            }
            RolesMsg::ShowDelete(role) => {
                let dialog = ConfirmDialog::new(
                    format!("Are you sure deleting the role {}", role.name),
                    self.resolver.clone(),
                )
                .with_title("Delete role")
                .with_confirm_text("Delete")
                .danger();
                self.modal = Some(Modal::Delete { dialog, role });
                ServiceMsg::Idle
            }
            RolesMsg::Create(draft) => CreateRoleCmd {
                client: self.client.clone(),
                draft,
                tx: self.msg_tx.clone(),
            }
            .into(),
            RolesMsg::Update { id, draft } => UpdateRoleCmd {
                client: self.client.clone(),
                id,
                draft,
                tx: self.msg_tx.clone(),
            }
            .into(),
            RolesMsg::Delete(role) => DeleteRoleCmd {
                client: self.client.clone(),
                role,
                tx: self.msg_tx.clone(),
            }
            .into(),
            RolesMsg::Changed => {
                let request = self.pane.invalidate();
                self.fetch(request)
            }
            RolesMsg::Close => ServiceMsg::Close,
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let Some(modal) = &mut self.modal else {
            return Ok(EventResult::Ignored);
        };
        let msg = match modal {
            Modal::Form { dialog, editing } => match dialog.handle_key(key)? {
                EventResult::Event(FormEvent::Submitted(values)) => {
                    let draft = Self::draft(&values);
                    Some(match editing.take() {
                        Some(role) => RolesMsg::Update { id: role.id, draft },
                        None => RolesMsg::Create(draft),
                    })
                }
                EventResult::Event(FormEvent::Cancelled) => None,
                _ => return Ok(EventResult::Consumed),
            },
            Modal::Delete { dialog, role } => match dialog.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => Some(RolesMsg::Delete(role.clone())),
                EventResult::Event(ConfirmEvent::Cancelled) => None,
                _ => return Ok(EventResult::Consumed),
            },
        };
        self.modal = None;
        if let Some(msg) = msg {
            self.queue(msg);
        }
        Ok(EventResult::Consumed)
    }
}

impl Service for RolesScreen {
    fn init(&mut self) {
        self.queue(RolesMsg::Initialize);
    }

    fn handle_tick(&mut self) -> bool {
        match self.pane.tick(Instant::now()) {
            Some(request) => {
                self.queue(RolesMsg::Fetch(request));
                true
            }
            None => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }

        match self.pane.handle_key(key)? {
            EventResult::Event(PaneEvent::Fetch(request)) => {
                self.queue(RolesMsg::Fetch(request));
                return Ok(EventResult::Consumed);
            }
            EventResult::Event(PaneEvent::Activated(index)) => {
                if let Some(role) = self.pane.item(index) {
                    self.queue(RolesMsg::ShowEdit(role.clone()));
                }
                return Ok(EventResult::Consumed);
            }
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {}
        }

        let r = &self.resolver;
        let msg = if r.matches_list(&key, ListAction::New) {
            Some(RolesMsg::ShowCreate)
        } else if r.matches_list(&key, ListAction::Edit) {
            self.pane.selected().cloned().map(RolesMsg::ShowEdit)
        } else if r.matches_list(&key, ListAction::Delete) {
            self.pane.selected().cloned().map(RolesMsg::ShowDelete)
        } else if r.matches_global(&key, GlobalAction::Back) {
            Some(RolesMsg::Close)
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
        match &mut self.modal {
            Some(Modal::Form { dialog, .. }) => dialog.render(frame, area, theme),
            Some(Modal::Delete { dialog, .. }) => dialog.render(frame, area, theme),
            None => {}
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let mut bc = vec!["Roles".to_string()];
        match &self.modal {
            Some(Modal::Form { editing: Some(role), .. }) => bc.push(format!("Edit {}", role.name)),
            Some(Modal::Form { editing: None, .. }) => bc.push("New".to_string()),
            Some(Modal::Delete { role, .. }) => bc.push(format!("Delete {}", role.name)),
            None => {}
        }
        bc
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        let mut bindings = self.pane.keybindings();
        bindings.extend([
            Keybinding::hint(r.display_list(ListAction::New), "New role"),
            Keybinding::hint(r.display_list(ListAction::Edit), "Edit role"),
            Keybinding::hint(r.display_list(ListAction::Delete), "Delete role"),
        ]);
        bindings
    }
}

struct CreateRoleCmd {
    client: ApiClient,
    draft: RoleDraft,
    tx: UnboundedSender<RolesMsg>,
}

#[async_trait]
impl Command for CreateRoleCmd {
    fn name(&self) -> String {
        format!("Creating role {}", self.draft.name)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let outcome = roles::create(&self.client, &self.draft).await;
        let success = format!("Role {} created", self.draft.name);
        report_mutation(outcome, success, &app_tx, &self.tx, RolesMsg::Changed);
        Ok(())
    }
}

struct UpdateRoleCmd {
    client: ApiClient,
    id: String,
    draft: RoleDraft,
    tx: UnboundedSender<RolesMsg>,
}

#[async_trait]
impl Command for UpdateRoleCmd {
    fn name(&self) -> String {
        format!("Updating role {}", self.draft.name)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let outcome = roles::update(&self.client, &self.id, &self.draft).await;
        let success = format!("Role {} updated", self.draft.name);
        report_mutation(outcome, success, &app_tx, &self.tx, RolesMsg::Changed);
        Ok(())
    }
}

struct DeleteRoleCmd {
    client: ApiClient,
    role: Role,
    tx: UnboundedSender<RolesMsg>,
}

#[async_trait]
impl Command for DeleteRoleCmd {
    fn name(&self) -> String {
        format!("Deleting role {}", self.role.name)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let outcome = roles::delete(&self.client, &self.role.id).await;
        let success = format!("Role {} deleted", self.role.name);
        report_mutation(outcome, success, &app_tx, &self.tx, RolesMsg::Changed);
        Ok(())
    }
}

pub struct RolesProvider;

impl ScreenProvider for RolesProvider {
    fn key(&self) -> &'static str {
        "roles"
    }

    fn display_name(&self) -> &'static str {
        "Roles"
    }

    fn description(&self) -> &'static str {
        "Create, edit and delete permission groups"
    }

    fn create(&self, ctx: &ScreenContext) -> Box<dyn Service> {
        Box::new(RolesScreen::new(ctx))
    }
}
