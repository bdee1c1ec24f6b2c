use std::sync::Arc;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::Theme;
use crate::commands::Command;
use crate::config::{GlobalAction, KeyResolver};
use crate::registry::{ScreenContext, ScreenRegistry};
use crate::service::{ScreenSelectorView, Service, ServiceMsg};
use crate::tui::{Event, Tui};
use crate::ui::{
    CommandId, CommandTracker, Component, ErrorDialog, ErrorDialogEvent, EventResult, HelpEvent,
    HelpOverlay, KeybindingSection, StatusBar, Toast, ToastManager, ToastType,
};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 4.0;
const STATUS_BAR_HEIGHT: u16 = 6;

/// Messages posted to the App by running commands.
#[derive(Debug, Clone)]
pub enum AppMessage {
    /// A spawned command finished. `error` is set when `execute` failed.
    CommandCompleted {
        id: CommandId,
        error: Option<String>,
    },
    ShowToast {
        message: String,
        toast_type: ToastType,
    },
}

impl AppMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self::ShowToast {
            message: message.into(),
            toast_type: ToastType::Success,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::ShowToast {
            message: message.into(),
            toast_type: ToastType::Info,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::ShowToast {
            message: message.into(),
            toast_type: ToastType::Error,
        }
    }
}

enum Route {
    Selector(ScreenSelectorView),
    Active(Box<dyn Service>),
}

pub struct App {
    registry: ScreenRegistry,
    ctx: ScreenContext,
    theme: Theme,
    route: Route,
    toasts: ToastManager,
    error: Option<ErrorDialog>,
    help: Option<HelpOverlay>,
    commands: CommandTracker,
    status_bar: StatusBar,
    should_quit: bool,
    app_tx: UnboundedSender<AppMessage>,
    app_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(registry: ScreenRegistry, ctx: ScreenContext, theme: Theme) -> Self {
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        let route = Route::Selector(ScreenSelectorView::new(&registry, ctx.resolver.clone()));
        let status_bar = StatusBar::new(&ctx.config.api, ctx.resolver.clone());
        Self {
            registry,
            ctx,
            theme,
            route,
            toasts: ToastManager::new(),
            error: None,
            help: None,
            commands: CommandTracker::new(),
            status_bar,
            should_quit: false,
            app_tx,
            app_rx,
        }
    }

    fn resolver(&self) -> Arc<KeyResolver> {
        self.ctx.resolver.clone()
    }

    /// Open the screen registered under `key`.
    pub fn open_screen(&mut self, key: &str) -> Result<()> {
        let provider = self.registry.get(key).ok_or_else(|| {
            eyre!(
                "Unknown screen {key:?}, expected one of: {}",
                self.registry.keys().join(", ")
            )
        })?;
        info!(screen = key, "Opening screen");
        let mut screen = provider.create(&self.ctx);
        screen.init();
        self.route = Route::Active(screen);
        self.update_screen();
        Ok(())
    }

    fn close_screen(&mut self) {
        if let Route::Active(screen) = &mut self.route {
            screen.destroy();
        }
        debug!("Back to the screen selector");
        self.route = Route::Selector(ScreenSelectorView::new(&self.registry, self.resolver()));
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;

        while !self.should_quit {
            let Some(event) = tui.next_event().await else {
                break;
            };
            self.handle_event(event, &mut tui)?;
            self.drain_messages();
        }

        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tui: &mut Tui) -> Result<()> {
        match event {
            Event::Init => {}
            Event::Quit => self.should_quit = true,
            Event::Suspend => {
                tui.suspend()?;
                tui.resume()?;
            }
            Event::Error(message) => {
                error!(%message, "Terminal event error");
                self.show_error(message);
            }
            Event::Tick => self.handle_tick(),
            Event::Render | Event::Resize(..) => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Key(key) => self.handle_key(key),
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.toasts.on_tick();
        let queued = match &mut self.route {
            Route::Active(screen) => screen.handle_tick(),
            Route::Selector(_) => false,
        };
        if queued {
            self.update_screen();
        }
    }

    /// Overlays first, then the screen, then global keys the screen left
    /// alone.
    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = &mut self.error {
            if let Ok(EventResult::Event(ErrorDialogEvent::Dismissed)) = dialog.handle_key(key) {
                self.error = None;
            }
            return;
        }
        if let Some(help) = &mut self.help {
            if let Ok(EventResult::Event(HelpEvent::Close)) = help.handle_key(key) {
                self.help = None;
            }
            return;
        }

        let handled = match &mut self.route {
            Route::Active(screen) => screen.handle_key(key).map(|r| r.is_consumed()),
            Route::Selector(selector) => match selector.handle_key(key) {
                Ok(EventResult::Event(screen_key)) => {
                    if let Err(e) = self.open_screen(screen_key) {
                        self.show_error(e.to_string());
                    }
                    return;
                }
                other => other.map(|r| r.is_consumed()),
            },
        };

        match handled {
            Ok(true) => self.update_screen(),
            Ok(false) => self.handle_global_key(key),
            Err(e) => {
                error!(error = %e, "Key handling failed");
                self.show_error(e.to_string());
            }
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) {
        let r = self.resolver();
        if r.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if r.matches_global(&key, GlobalAction::Help) {
            self.help = Some(HelpOverlay::new(self.help_sections(), r.clone()));
        } else if r.matches_global(&key, GlobalAction::CommandsToggle) {
            self.commands.toggle_expanded();
        }
    }

    fn help_sections(&self) -> Vec<KeybindingSection> {
        let mut sections = Vec::new();
        if let Route::Active(screen) = &self.route {
            let title = screen.breadcrumbs().first().cloned().unwrap_or_default();
            sections.push(KeybindingSection::new(title, screen.keybindings()));
        }
        sections.push(KeybindingSection::new("Global", self.status_bar.global_keybindings()));
        sections
    }

    /// Let the active screen process its queue and act on the result.
    fn update_screen(&mut self) {
        let result = match &mut self.route {
            Route::Active(screen) => screen.update(),
            Route::Selector(_) => return,
        };
        match result {
            Ok(ServiceMsg::Idle) => {}
            Ok(ServiceMsg::Run(commands)) => self.spawn_commands(commands),
            Ok(ServiceMsg::Close) => self.close_screen(),
            Err(e) => {
                error!(error = %e, "Screen update failed");
                self.show_error(e.to_string());
            }
        }
    }

    fn spawn_commands(&mut self, commands: Vec<Box<dyn Command>>) {
        for command in commands {
            let name = command.name();
            debug!(command = %name, "Spawning command");
            let id = self.commands.start(name);
            let tx = self.app_tx.clone();
            tokio::spawn(async move {
                let error = command.execute(tx.clone()).await.err().map(|e| e.to_string());
                let _ = tx.send(AppMessage::CommandCompleted { id, error });
            });
        }
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.app_rx.try_recv() {
            self.handle_message(message);
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::CommandCompleted { id, error } => {
                self.commands.complete(id, error.is_none());
                if let Some(message) = error {
                    error!(%message, "Command failed");
                    self.show_error(message);
                }
                self.update_screen();
            }
            AppMessage::ShowToast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
        }
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(ErrorDialog::new(message, self.resolver()));
    }

    fn breadcrumbs(&self) -> Vec<String> {
        match &self.route {
            Route::Selector(_) => vec!["Screens".to_string()],
            Route::Active(screen) => screen.breadcrumbs(),
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let theme = self.theme;
        let [header, body, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(STATUS_BAR_HEIGHT),
            ])
            .areas(frame.area());

        self.render_breadcrumbs(frame, header, &theme);

        let keybindings = match &mut self.route {
            Route::Selector(selector) => {
                selector.render(frame, body, &theme);
                Vec::new()
            }
            Route::Active(screen) => {
                screen.render(frame, body, &theme);
                screen.keybindings()
            }
        };
        self.status_bar.render(
            frame,
            footer,
            &theme,
            &keybindings,
            &self.commands.running_names(),
        );

        self.commands.render(frame, body, &theme);
        self.toasts.render(frame, body, &theme);
        if let Some(help) = &mut self.help {
            help.render(frame, frame.area(), &theme);
        }
        if let Some(dialog) = &mut self.error {
            dialog.render(frame, frame.area(), &theme);
        }
    }

    fn render_breadcrumbs(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let separator = Span::styled(" › ", Style::default().fg(theme.overlay0()));
        let mut spans = vec![Span::styled(
            " lazyflow",
            Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
        )];
        let crumbs = self.breadcrumbs();
        let last = crumbs.len().saturating_sub(1);
        for (i, crumb) in crumbs.into_iter().enumerate() {
            spans.push(separator.clone());
            let style = if i == last {
                Style::default().fg(theme.text()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.subtext0())
            };
            spans.push(Span::styled(crumb, style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
