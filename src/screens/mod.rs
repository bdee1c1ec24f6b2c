//! The listing screens.
//!
//! Each screen wires a [`ListPane`](crate::listing::ListPane) to one backend
//! resource and adds the mutations that resource supports.

mod dashboards;
mod roles;
mod submissions;
mod users;

use crate::registry::ScreenRegistry;

pub use dashboards::DashboardsProvider;
pub use roles::RolesProvider;
pub use submissions::SubmissionsProvider;
pub use users::UsersProvider;

/// Register every screen, in the order the selector shows them.
pub fn register_all(registry: &mut ScreenRegistry) {
    registry.register(RolesProvider);
    registry.register(UsersProvider);
    registry.register(DashboardsProvider);
    registry.register(SubmissionsProvider);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use wiremock::MockServer;

    use crate::Theme;
    use crate::api::testing::client_for;
    use crate::config::{AppConfig, KeyResolver};
    use crate::registry::ScreenContext;
    use crate::service::Service;

    pub fn context_for(server: &MockServer) -> ScreenContext {
        context_with(server, AppConfig::default())
    }

    pub fn context_with(server: &MockServer, config: AppConfig) -> ScreenContext {
        ScreenContext::new(
            Arc::new(config),
            client_for(server),
            Arc::new(KeyResolver::default()),
        )
    }

    /// Draw the screen on a test terminal and return everything on it.
    pub fn screen_text(screen: &mut dyn Service) -> String {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|frame| screen.render(frame, frame.area(), &theme))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_four_screens_in_order() {
        let mut registry = ScreenRegistry::new();
        register_all(&mut registry);
        assert_eq!(registry.keys(), vec!["roles", "users", "dashboards", "submissions"]);
    }
}
