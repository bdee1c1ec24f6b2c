use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::{AppConfig, KeyResolver};
use crate::service::Service;

/// Everything a screen needs at construction time.
#[derive(Clone)]
pub struct ScreenContext {
    pub config: Arc<AppConfig>,
    pub client: ApiClient,
    pub resolver: Arc<KeyResolver>,
}

impl ScreenContext {
    pub const fn new(config: Arc<AppConfig>, client: ApiClient, resolver: Arc<KeyResolver>) -> Self {
        Self {
            config,
            client,
            resolver,
        }
    }
}

/// Trait for listing screens.
///
/// Implement this trait to register a new screen with the registry.
/// The selector uses it to display available screens and to create the
/// screen when the user picks one.
pub trait ScreenProvider: Send + Sync {
    /// Unique key, also accepted by `--screen` (e.g. "roles").
    fn key(&self) -> &'static str;

    /// Human-readable display name (e.g. "Roles").
    fn display_name(&self) -> &'static str;

    /// Short description of what the screen does.
    fn description(&self) -> &'static str {
        ""
    }

    /// Create a new screen instance.
    fn create(&self, ctx: &ScreenContext) -> Box<dyn Service>;
}

/// Registry of available screens, in registration order.
#[derive(Default)]
pub struct ScreenRegistry {
    providers: Vec<Arc<dyn ScreenProvider>>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen provider.
    ///
    /// A provider with the same key replaces the earlier one in place.
    pub fn register<P: ScreenProvider + 'static>(&mut self, provider: P) {
        let provider: Arc<dyn ScreenProvider> = Arc::new(provider);
        match self.providers.iter_mut().find(|p| p.key() == provider.key()) {
            Some(slot) => *slot = provider,
            None => self.providers.push(provider),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn ScreenProvider>> {
        self.providers.iter().find(|p| p.key() == key).cloned()
    }

    pub fn all(&self) -> Vec<Arc<dyn ScreenProvider>> {
        self.providers.clone()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.key()).collect()
    }
}
