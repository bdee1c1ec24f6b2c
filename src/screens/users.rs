//! Users: server-side search and role membership.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::Theme;
use crate::api::ApiClient;
use crate::api::roles;
use crate::api::users::{self, User, UserRole, UsersFetcher};
use crate::app::AppMessage;
use crate::commands::{Command, NoticeCmd, report_mutation};
use crate::config::{GlobalAction, KeyResolver, ListAction};
use crate::listing::{ColumnSpec, FetchRequest, ListController, ListPane, PageLoaded, PaneEvent};
use crate::registry::{ScreenContext, ScreenProvider};
use crate::service::{Service, ServiceMsg};
use crate::ui::{
    Component, ConfirmDialog, ConfirmEvent, EventResult, Keybinding, PickerDialog, PickerEvent,
};

static COLUMNS: &[ColumnSpec<User>] = &[
    ColumnSpec::new("username", "Username", Constraint::Percentage(20)).sortable(),
    ColumnSpec::new("email", "Email", Constraint::Percentage(25)).sortable(),
    ColumnSpec::new("firstName", "First name", Constraint::Percentage(15)).sortable(),
    ColumnSpec::new("lastName", "Last name", Constraint::Percentage(15)).sortable(),
    ColumnSpec::new("roles", "Roles", Constraint::Percentage(25)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Add,
    Remove,
}

pub enum UsersMsg {
    Initialize,
    Fetch(FetchRequest),
    Loaded(PageLoaded<User>),
    /// Fetch the role list, then offer the roles `user` does not have.
    LoadRoleChoices(User),
    RoleChoices { user: User, roles: Vec<UserRole> },
    /// Offer the roles `user` has.
    PickRoleToRemove(User),
    Confirm { user: User, role: UserRole, change: Membership },
    Apply { user: User, role: UserRole, change: Membership },
    /// Membership changed; reload the current page.
    Changed,
    Close,
}

enum Modal {
    Pick {
        dialog: PickerDialog<UserRole>,
        user: User,
        change: Membership,
    },
    Confirm {
        dialog: ConfirmDialog,
        user: User,
        role: UserRole,
        change: Membership,
    },
}

pub struct UsersScreen {
    client: ApiClient,
    pane: ListPane<User, UsersMsg>,
    modal: Option<Modal>,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<UsersMsg>,
    msg_rx: UnboundedReceiver<UsersMsg>,
}

impl UsersScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let pane = ListPane::new(
            "Users",
            COLUMNS,
            ListController::new(&ctx.config.listing),
            Arc::new(UsersFetcher::new(ctx.client.clone())),
            msg_tx.clone(),
            UsersMsg::Loaded,
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

    fn queue(&self, msg: UsersMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn fetch(&self, request: Option<FetchRequest>) -> ServiceMsg {
        request.map_or(ServiceMsg::Idle, |r| {
            ServiceMsg::Run(vec![self.pane.fetch_command(r)])
        })
    }

    fn picker(title: String, roles: Vec<UserRole>) -> PickerDialog<UserRole> {
        let items = roles.into_iter().map(|r| (r.name.clone(), r)).collect();
        PickerDialog::new(title, items)
    }

    fn process_message(&mut self, msg: UsersMsg) -> ServiceMsg {
        match msg {
            UsersMsg::Initialize => {
                let request = self.pane.start();
                self.fetch(request)
            }
            UsersMsg::Fetch(request) => self.fetch(Some(request)),
            UsersMsg::Loaded(page) => {
                let request = self.pane.apply(page);
                self.fetch(request)
            }
            UsersMsg::LoadRoleChoices(user) => LoadRoleChoicesCmd {
                client: self.client.clone(),
                user,
                tx: self.msg_tx.clone(),
            }
            .into(),
            UsersMsg::RoleChoices { user, roles } => {
                let available: Vec<UserRole> =
                    roles.into_iter().filter(|r| !user.has_role(&r.id)).collect();
                if available.is_empty() {
                    debug!(user = %user.username, "No roles left to add");
                    return NoticeCmd {
                        message: format!("{} already has every role", user.username),
                    }
                    .into();
                }
                self.modal = Some(Modal::Pick {
                    dialog: Self::picker(format!("Add role to {}", user.username), available),
                    user,
                    change: Membership::Add,
                });
                ServiceMsg::Idle
            }
            UsersMsg::PickRoleToRemove(user) => {
                if user.roles.is_empty() {
                    return NoticeCmd {
                        message: format!("{} has no roles to remove", user.username),
                    }
                    .into();
                }
                self.modal = Some(Modal::Pick {
                    dialog: Self::picker(
                        format!("Remove role from {}", user.username),
                        user.roles.clone(),
                    ),
                    user,
                    change: Membership::Remove,
                });
                ServiceMsg::Idle
            }
            UsersMsg::Confirm { user, role, change } => {
                let message = match change {
                    Membership::Add => format!("Add role {} to {}?", role.name, user.username),
                    Membership::Remove => {
                        format!("Remove role {} from {}?", role.name, user.username)
                    }
                };
                let mut dialog = ConfirmDialog::new(message, self.resolver.clone());
                if change == Membership::Remove {
                    dialog = dialog.with_confirm_text("Remove").danger();
                }
                self.modal = Some(Modal::Confirm {
                    dialog,
                    user,
                    role,
                    change,
                });
                ServiceMsg::Idle
            }
            UsersMsg::Apply { user, role, change } => MembershipCmd {
                client: self.client.clone(),
                user,
                role,
                change,
                tx: self.msg_tx.clone(),
            }
            .into(),
            UsersMsg::Changed => {
                let request = self.pane.invalidate();
                self.fetch(request)
            }
            UsersMsg::Close => ServiceMsg::Close,
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let Some(modal) = &mut self.modal else {
            return Ok(EventResult::Ignored);
        };
        let msg = match modal {
            Modal::Pick {
                dialog,
                user,
                change,
            } => match dialog.handle_key(key)? {
                EventResult::Event(PickerEvent::Picked(role)) => Some(UsersMsg::Confirm {
                    user: user.clone(),
                    role,
                    change: *change,
                }),
                EventResult::Event(PickerEvent::Cancelled) => None,
                _ => return Ok(EventResult::Consumed),
            },
            Modal::Confirm {
                dialog,
                user,
                role,
                change,
            } => match dialog.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => Some(UsersMsg::Apply {
                    user: user.clone(),
                    role: role.clone(),
                    change: *change,
                }),
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

impl Service for UsersScreen {
    fn init(&mut self) {
        self.queue(UsersMsg::Initialize);
    }

    fn handle_tick(&mut self) -> bool {
        match self.pane.tick(Instant::now()) {
            Some(request) => {
                self.queue(UsersMsg::Fetch(request));
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
                self.queue(UsersMsg::Fetch(request));
                return Ok(EventResult::Consumed);
            }
            EventResult::Event(PaneEvent::Activated(index)) => {
                if let Some(user) = self.pane.item(index) {
                    self.queue(UsersMsg::LoadRoleChoices(user.clone()));
                }
                return Ok(EventResult::Consumed);
            }
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {}
        }

        let r = &self.resolver;
        let msg = if r.matches_list(&key, ListAction::AddRole) {
            self.pane.selected().cloned().map(UsersMsg::LoadRoleChoices)
        } else if r.matches_list(&key, ListAction::RemoveRole) {
            self.pane.selected().cloned().map(UsersMsg::PickRoleToRemove)
        } else if r.matches_global(&key, GlobalAction::Back) {
            Some(UsersMsg::Close)
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
            Some(Modal::Pick { dialog, .. }) => dialog.render(frame, area, theme),
            Some(Modal::Confirm { dialog, .. }) => dialog.render(frame, area, theme),
            None => {}
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let mut bc = vec!["Users".to_string()];
        match &self.modal {
            Some(Modal::Pick { user, .. } | Modal::Confirm { user, .. }) => {
                bc.push(user.username.clone());
            }
            None => {}
        }
        bc
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        let mut bindings = self.pane.keybindings();
        bindings.extend([
            Keybinding::hint(r.display_list(ListAction::AddRole), "Add role"),
            Keybinding::hint(r.display_list(ListAction::RemoveRole), "Remove role"),
        ]);
        bindings
    }
}

struct LoadRoleChoicesCmd {
    client: ApiClient,
    user: User,
    tx: UnboundedSender<UsersMsg>,
}

#[async_trait]
impl Command for LoadRoleChoicesCmd {
    fn name(&self) -> String {
        "Loading roles".to_string()
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        match roles::list(&self.client).await {
            Ok(list) => {
                let roles = list
                    .into_iter()
                    .map(|r| UserRole {
                        id: r.id,
                        name: r.name,
                    })
                    .collect();
                let _ = self.tx.send(UsersMsg::RoleChoices {
                    user: self.user,
                    roles,
                });
            }
            Err(e) => {
                let _ = app_tx.send(AppMessage::failure(e.user_message()));
            }
        }
        Ok(())
    }
}

struct MembershipCmd {
    client: ApiClient,
    user: User,
    role: UserRole,
    change: Membership,
    tx: UnboundedSender<UsersMsg>,
}

#[async_trait]
impl Command for MembershipCmd {
    fn name(&self) -> String {
        match self.change {
            Membership::Add => format!("Adding {} to {}", self.role.name, self.user.username),
            Membership::Remove => {
                format!("Removing {} from {}", self.role.name, self.user.username)
            }
        }
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let (outcome, success) = match self.change {
            Membership::Add => (
                users::add_role(&self.client, &self.user.id, &self.role).await,
                format!("Role {} added to {}", self.role.name, self.user.username),
            ),
            Membership::Remove => (
                users::remove_role(&self.client, &self.user.id, &self.role.id).await,
                format!("Role {} removed from {}", self.role.name, self.user.username),
            ),
        };
        report_mutation(outcome, success, &app_tx, &self.tx, UsersMsg::Changed);
        Ok(())
    }
}

pub struct UsersProvider;

impl ScreenProvider for UsersProvider {
    fn key(&self) -> &'static str {
        "users"
    }

    fn display_name(&self) -> &'static str {
        "Users"
    }

    fn description(&self) -> &'static str {
        "Search users and manage their roles"
    }

    fn create(&self, ctx: &ScreenContext) -> Box<dyn Service> {
        Box::new(UsersScreen::new(ctx))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{AppConfig, ListingConfig};
    use crate::screens::testing::{context_for, context_with, screen_text};
    use crate::service::testing::{command_names, run};
    use crate::ui::ToastType;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn users_body(name: &str) -> serde_json::Value {
        json!({
            "data": [{
                "id": "u-1",
                "username": name,
                "email": format!("{name}@example.com"),
                "role": [{"id": "g1", "name": "reviewer"}]
            }],
            "count": 1
        })
    }

    async fn start(screen: &mut UsersScreen) {
        screen.init();
        let msg = screen.update().unwrap();
        assert_eq!(command_names(&msg), vec!["Loading users (page 1)"]);
        run(msg).await;
        screen.update().unwrap();
    }

    #[tokio::test]
    async fn search_is_debounced_into_one_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(query_param_is_missing("search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users_body("alice")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(query_param("search", "jo"))
            .and(query_param("pageNo", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users_body("john")))
            .expect(1)
            .mount(&server)
            .await;

        let config = AppConfig {
            listing: ListingConfig {
                search_debounce_ms: 50,
                ..ListingConfig::default()
            },
            ..AppConfig::default()
        };
        let mut screen = UsersScreen::new(&context_with(&server, config));
        start(&mut screen).await;

        for c in ['/', 'j', 'o'] {
            screen.handle_key(key(KeyCode::Char(c))).unwrap();
            assert!(!screen.handle_tick());
        }
        assert!(matches!(screen.update().unwrap(), ServiceMsg::Idle));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(screen.handle_tick());
        let msg = screen.update().unwrap();
        assert_eq!(command_names(&msg), vec!["Loading users (page 1)"]);
        run(msg).await;
        screen.update().unwrap();

        assert!(!screen.handle_tick());
        assert!(screen_text(&mut screen).contains("john@example.com"));
    }

    #[tokio::test]
    async fn add_role_picks_from_missing_roles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users_body("john")))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "g1", "name": "reviewer"},
                {"id": "g2", "name": "designer"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/user/u-1/permission/groups/g2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut screen = UsersScreen::new(&context_for(&server));
        start(&mut screen).await;

        screen.handle_key(key(KeyCode::Char('a'))).unwrap();
        let msg = screen.update().unwrap();
        assert_eq!(command_names(&msg), vec!["Loading roles"]);
        run(msg).await;
        screen.update().unwrap();

        let text = screen_text(&mut screen);
        assert!(text.contains("designer"));
        assert_eq!(screen.breadcrumbs(), vec!["Users", "john"]);

        screen.handle_key(key(KeyCode::Enter)).unwrap();
        screen.update().unwrap();
        assert!(screen_text(&mut screen).contains("Add role designer to john?"));

        screen.handle_key(key(KeyCode::Char('y'))).unwrap();
        let msg = screen.update().unwrap();
        assert_eq!(command_names(&msg), vec!["Adding designer to john"]);
        run(msg).await;

        let msg = screen.update().unwrap();
        assert_eq!(command_names(&msg), vec!["Loading users (page 1)"]);
        run(msg).await;
    }

    #[tokio::test]
    async fn role_keys_explain_when_nothing_to_pick() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "u-1", "username": "john", "role": [{"id": "g1", "name": "reviewer"}]},
                    {"id": "u-2", "username": "mary", "role": []}
                ],
                "count": 2
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/roles"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": "g1", "name": "reviewer"}])),
            )
            .mount(&server)
            .await;

        let mut screen = UsersScreen::new(&context_for(&server));
        start(&mut screen).await;

        screen.handle_key(key(KeyCode::Char('a'))).unwrap();
        run(screen.update().unwrap()).await;
        let msg = screen.update().unwrap();
        assert_eq!(command_names(&msg), vec!["Notice"]);
        let posted = run(msg).await;
        assert!(matches!(
            &posted[..],
            [AppMessage::ShowToast { message, toast_type: ToastType::Info }]
                if message == "john already has every role"
        ));
        assert_eq!(screen.breadcrumbs(), vec!["Users"]);

        screen.handle_key(key(KeyCode::Down)).unwrap();
        screen.handle_key(key(KeyCode::Char('x'))).unwrap();
        let posted = run(screen.update().unwrap()).await;
        assert!(matches!(
            &posted[..],
            [AppMessage::ShowToast { message, toast_type: ToastType::Info }]
                if message == "mary has no roles to remove"
        ));
    }

    #[tokio::test]
    async fn remove_role_failure_keeps_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users_body("john")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/user/u-1/permission/groups/g1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut screen = UsersScreen::new(&context_for(&server));
        start(&mut screen).await;

        screen.handle_key(key(KeyCode::Char('x'))).unwrap();
        screen.update().unwrap();
        screen.handle_key(key(KeyCode::Enter)).unwrap();
        screen.update().unwrap();
        screen.handle_key(key(KeyCode::Char('y'))).unwrap();

        let posted = run(screen.update().unwrap()).await;
        assert!(matches!(
            &posted[..],
            [AppMessage::ShowToast { message, .. }] if message == "Failed to remove role"
        ));
        assert!(matches!(screen.update().unwrap(), ServiceMsg::Idle));
    }
}
