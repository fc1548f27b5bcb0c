//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{BackendConfig, GatewayConfig};
use crate::config::validation::{validate_config, ConfigIssue};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment error: {0}")]
    Env(String),

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Start from defaults, apply environment overrides and validate.
pub fn load_default() -> Result<GatewayConfig, ConfigError> {
    finalize(GatewayConfig::default())
}

fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply deployment variables on top of a config.
///
/// `lookup` resolves a variable name; empty values are ignored.
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(env) = get("ENVIRONMENT") {
        config.environment = env.parse().map_err(ConfigError::Env)?;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(path) = get("DESCRIPTOR_SET") {
        config.rpc.descriptor_set = Some(path);
    }
    if let Some(port) = get("HTTP_PORT") {
        let host = split_address(&config.listener.bind_address).0;
        config.listener.bind_address = join_address(&host, &port);
    }

    override_backend(config, "user_service", get("USER_SERVICE_HOST"), get("USER_GRPC_PORT"));
    override_backend(
        config,
        "schedule_service",
        get("SCHEDULE_SERVICE_HOST"),
        get("SCHEDULE_GRPC_PORT"),
    );

    Ok(())
}

fn override_backend(
    config: &mut GatewayConfig,
    group: &str,
    host: Option<String>,
    port: Option<String>,
) {
    if host.is_none() && port.is_none() {
        return;
    }

    let current = config
        .backend(group)
        .map(|b| split_address(&b.address))
        .unwrap_or_else(|| ("127.0.0.1".to_string(), String::new()));
    let address = join_address(
        &host.unwrap_or(current.0),
        &port.unwrap_or(current.1),
    );

    match config.backends.iter_mut().find(|b| b.name == group) {
        Some(backend) => backend.address = address,
        None => config.backends.push(BackendConfig::plaintext(group, address)),
    }
    tracing::debug!(group, "Backend address overridden from environment");
}

fn split_address(address: &str) -> (String, String) {
    match address.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.to_string()),
        None => (address.to_string(), String::new()),
    }
}

/// Ports may arrive as "9000" or ":9000".
fn join_address(host: &str, port: &str) -> String {
    format!("{}:{}", host, port.trim_start_matches(':'))
}
