//! Application configuration.
//!
//! Configuration is assembled exactly once at startup (file, then
//! environment, then command line) and shared as `Arc<AppConfig>`.
//! Nothing else in the crate reads environment variables or config files.

pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::time::Duration;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Connection settings for the platform's web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. `https://forms.example.com/api`.
    pub web_base_url: String,
    /// GraphQL endpoint used for submissions. Defaults to
    /// `<web_base_url>/graphql` when empty.
    pub graphql_url: String,
    pub multi_tenancy_enabled: bool,
    pub tenant_key: Option<String>,
    /// Bearer token attached to every request.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            web_base_url: "http://localhost:5000".to_string(),
            graphql_url: String::new(),
            multi_tenancy_enabled: false,
            tenant_key: None,
            token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn graphql_endpoint(&self) -> String {
        if self.graphql_url.is_empty() {
            format!("{}/graphql", self.web_base_url.trim_end_matches('/'))
        } else {
            self.graphql_url.clone()
        }
    }

    /// Tenant key to send, only when multi-tenancy is switched on.
    pub fn effective_tenant(&self) -> Option<&str> {
        if self.multi_tenancy_enabled {
            self.tenant_key.as_deref().filter(|t| !t.is_empty())
        } else {
            None
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Defaults for the listing screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub page_size: u32,
    pub page_size_options: Vec<u32>,
    pub search_debounce_ms: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_size_options: vec![5, 10, 25, 50, 100],
            search_debounce_ms: 1500,
        }
    }
}

impl ListingConfig {
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeConfig,
    pub api: ApiConfig,
    pub listing: ListingConfig,
    pub keybindings: KeybindingsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphql_endpoint_defaults_to_base_url() {
        let api = ApiConfig {
            web_base_url: "https://forms.example.com/api/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(api.graphql_endpoint(), "https://forms.example.com/api/graphql");

        let api = ApiConfig {
            graphql_url: "https://gql.example.com/query".to_string(),
            ..api
        };
        assert_eq!(api.graphql_endpoint(), "https://gql.example.com/query");
    }

    #[test]
    fn tenant_is_ignored_without_multi_tenancy() {
        let mut api = ApiConfig {
            tenant_key: Some("acme".to_string()),
            ..ApiConfig::default()
        };
        assert_eq!(api.effective_tenant(), None);
        api.multi_tenancy_enabled = true;
        assert_eq!(api.effective_tenant(), Some("acme"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [listing]
            page_size = 25

            [keybindings.list]
            reload = "ctrl+r"
            "#,
        )
        .unwrap();
        assert_eq!(config.listing.page_size, 25);
        assert_eq!(config.listing.search_debounce_ms, 1500);
        assert_eq!(config.keybindings.list.reload.to_string(), "ctrl+r");
        assert_eq!(config.keybindings.list.sort.to_string(), "s");
        assert_eq!(config.api.timeout_secs, 30);
    }
}
