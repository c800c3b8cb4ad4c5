//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the connection target.
pub const DB_URL_ENV: &str = "DB_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides using the given lookup.
pub fn apply_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(DB_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.database.url = url;
    }
}

/// Build the effective configuration: file (or defaults), then environment,
/// then validation.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Like [`load_config`], with command-line overrides applied after the
/// environment and before validation.
pub fn load_config_with<F>(path: Option<&Path>, cli: F) -> Result<ServiceConfig, ConfigError>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ServiceConfig::default(),
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    cli(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
