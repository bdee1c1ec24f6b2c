use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{WrapErr, bail};
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "lazyflow";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "LAZYFLOW_";

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the configuration file (an explicit path, or the default location),
/// then apply `LAZYFLOW_*` environment overrides and validate the result.
pub fn load(explicit: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let mut config = match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(path) if path.exists() => read_file(&path)?,
        Some(path) if explicit.is_some() => bail!("Config file {} does not exist", path.display()),
        Some(path) => {
            debug!("Config file not found at {:?}, using defaults", path);
            AppConfig::default()
        }
        None => {
            debug!("No config directory found, using defaults");
            AppConfig::default()
        }
    };

    apply_env(&mut config, |name| std::env::var(format!("{ENV_PREFIX}{name}")).ok());
    validate(&config)?;
    Ok(config)
}

fn read_file(path: &Path) -> color_eyre::Result<AppConfig> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str(&content)
        .wrap_err_with(|| format!("Invalid config file {}", path.display()))?;
    debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Apply environment overrides. `lookup` receives the variable name without
/// the `LAZYFLOW_` prefix.
pub fn apply_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("WEB_BASE_URL") {
        config.api.web_base_url = url;
    }
    if let Some(url) = lookup("GRAPHQL_URL") {
        config.api.graphql_url = url;
    }
    if let Some(flag) = lookup("MULTI_TENANCY_ENABLED") {
        config.api.multi_tenancy_enabled = matches!(
            flag.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if let Some(tenant) = lookup("TENANT_KEY") {
        config.api.tenant_key = Some(tenant);
    }
    if let Some(token) = lookup("TOKEN") {
        config.api.token = Some(token);
    }
}

pub fn validate(config: &AppConfig) -> color_eyre::Result<()> {
    if config.listing.page_size == 0 {
        bail!("listing.page_size must be greater than zero");
    }
    if config.listing.page_size_options.contains(&0) {
        bail!("listing.page_size_options must not contain zero");
    }
    let base = &config.api.web_base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        bail!("api.web_base_url must be an http(s) URL, got {base:?}");
    }
    if config.api.multi_tenancy_enabled && config.api.tenant_key.is_none() {
        bail!("api.tenant_key is required when multi-tenancy is enabled");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("WEB_BASE_URL", "https://forms.example.com/api"),
                ("MULTI_TENANCY_ENABLED", "true"),
                ("TENANT_KEY", "acme"),
            ]),
        );
        assert_eq!(config.api.web_base_url, "https://forms.example.com/api");
        assert!(config.api.multi_tenancy_enabled);
        assert_eq!(config.api.effective_tenant(), Some("acme"));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn multi_tenancy_flag_is_lenient() {
        let mut config = AppConfig::default();
        apply_env(&mut config, env(&[("MULTI_TENANCY_ENABLED", "FALSE")]));
        assert!(!config.api.multi_tenancy_enabled);
        apply_env(&mut config, env(&[("MULTI_TENANCY_ENABLED", "1")]));
        assert!(config.api.multi_tenancy_enabled);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.listing.page_size = 0;
        assert!(validate(&config).is_err());

        let mut config = AppConfig::default();
        config.api.web_base_url = "forms.example.com".to_string();
        assert!(validate(&config).is_err());

        let mut config = AppConfig::default();
        config.api.multi_tenancy_enabled = true;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load(Some(Path::new("/definitely/not/here/config.toml")));
        assert!(result.is_err());
    }
}
