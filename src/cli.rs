use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "lazyflow", version, about = "TUI for administering a forms and workflow platform")]
pub struct Args {
    /// Config file to load instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file and environment
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Tenant key sent with every request (enables multi-tenancy)
    #[arg(long)]
    pub tenant: Option<String>,

    /// Screen to open on start (roles, users, dashboards, submissions)
    #[arg(short, long)]
    pub screen: Option<String>,
}

impl Args {
    /// Flags win over the file and the environment.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.base_url {
            config.api.web_base_url.clone_from(url);
        }
        if let Some(tenant) = &self.tenant {
            config.api.multi_tenancy_enabled = true;
            config.api.tenant_key = Some(tenant.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "lazyflow",
            "--base-url",
            "https://forms.example.com",
            "--tenant",
            "acme",
            "--screen",
            "users",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.api.web_base_url, "https://forms.example.com");
        assert_eq!(config.api.effective_tenant(), Some("acme"));
        assert_eq!(args.screen.as_deref(), Some("users"));
    }

    #[test]
    fn no_flags_keep_config() {
        let mut config = AppConfig::default();
        let before = config.api.web_base_url.clone();
        Args::parse_from(["lazyflow"]).apply(&mut config);
        assert_eq!(config.api.web_base_url, before);
        assert_eq!(config.api.effective_tenant(), None);
    }
}
