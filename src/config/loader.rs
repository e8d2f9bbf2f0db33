//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `upstream.url` when set.
pub const UPSTREAM_URL_ENV: &str = "GAS_PROXY_UPSTREAM_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, applying environment
/// overrides from the process environment.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse, override and validate configuration text.
///
/// `env` resolves environment variables; tests pass a closure instead of
/// touching the process environment.
pub fn parse_config<F>(content: &str, env: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: ProxyConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the shared secret and upstream URL from the environment.
///
/// An inline `access.secret` wins over `access.secret_env`. Empty values
/// disable the secret check entirely.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if config.access.secret.is_none() && !config.access.secret_env.is_empty() {
        config.access.secret = env(&config.access.secret_env);
    }
    if config
        .access
        .secret
        .as_deref()
        .is_some_and(str::is_empty)
    {
        config.access.secret = None;
    }

    if let Some(url) = env(UPSTREAM_URL_ENV).filter(|u| !u.is_empty()) {
        config.upstream.url = url;
    }
}
