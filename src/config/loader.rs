//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `[contract].address`.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "CONTEST_CONTRACT_ADDRESS";

/// Environment variable overriding `[network].node_url`.
pub const NODE_URL_ENV_VAR: &str = "CONTEST_NODE_URL";

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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = parse_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without semantic checks.
pub fn parse_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load from `path` when given, otherwise start from defaults; then apply
/// environment overrides and validate the result.
pub fn resolve_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    resolve_config_with(path, |_| {})
}

/// Like [`resolve_config`], with command-line overrides applied after the
/// environment and before the single validation pass.
pub fn resolve_config_with<F>(path: Option<&Path>, overrides: F) -> Result<GatewayConfig, ConfigError>
where
    F: FnOnce(&mut GatewayConfig),
{
    resolve_from(path, |key| std::env::var(key).ok(), overrides)
}

fn resolve_from<L, F>(
    path: Option<&Path>,
    lookup: L,
    overrides: F,
) -> Result<GatewayConfig, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce(&mut GatewayConfig),
{
    let mut config = match path {
        Some(path) => parse_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, lookup);
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay values from the environment. Empty values count as unset.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(address) = non_empty(CONTRACT_ADDRESS_ENV_VAR) {
        config.contract.address = Some(address.trim().to_string());
    }
    if let Some(url) = non_empty(NODE_URL_ENV_VAR) {
        config.network.node_url = url.trim().to_string();
    }
}
