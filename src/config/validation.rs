//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (every resource's backend group is configured)
//! - Validate value ranges (timeouts within bounds, limits ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::resources::catalog;

/// Upper bound for `timeouts.request_secs`.
pub const MAX_REQUEST_SECS: u64 = 3_600;
/// Upper bound for `rpc.request_timeout_ms`.
pub const MAX_RPC_TIMEOUT_MS: u64 = 600_000;
/// Upper bound for `rpc.connect_timeout_secs`.
pub const MAX_CONNECT_SECS: u64 = 300;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("backend #{0} has an empty name")]
    EmptyBackendName(usize),

    #[error("backend '{0}' is configured more than once")]
    DuplicateBackend(String),

    #[error("backend '{name}' has malformed address '{address}' (expected host:port)")]
    BackendAddress { name: String, address: String },

    #[error("resource '{resource}' needs backend group '{group}' which is not configured")]
    MissingBackendGroup { resource: String, group: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("pagination.default_limit ({default}) exceeds pagination.max_limit ({max})")]
    LimitOrder { default: u32, max: u32 },
}

/// Validate a configuration, collecting every issue.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::BindAddress(config.listener.bind_address.clone()));
    }

    let mut seen = HashSet::new();
    for (i, backend) in config.backends.iter().enumerate() {
        if backend.name.trim().is_empty() {
            issues.push(ConfigIssue::EmptyBackendName(i));
            continue;
        }
        if !seen.insert(backend.name.as_str()) {
            issues.push(ConfigIssue::DuplicateBackend(backend.name.clone()));
        }
        if !is_host_port(&backend.address) {
            issues.push(ConfigIssue::BackendAddress {
                name: backend.name.clone(),
                address: backend.address.clone(),
            });
        }
    }

    for descriptor in catalog::all() {
        if config.backend(descriptor.backend_group).is_none() {
            issues.push(ConfigIssue::MissingBackendGroup {
                resource: descriptor.path.to_string(),
                group: descriptor.backend_group.to_string(),
            });
        }
    }

    if config.rpc.connect_timeout_secs == 0 {
        issues.push(ConfigIssue::Zero("rpc.connect_timeout_secs"));
    }
    if config.rpc.request_timeout_ms == 0 {
        issues.push(ConfigIssue::Zero("rpc.request_timeout_ms"));
    }
    if config.rpc.max_message_bytes == 0 {
        issues.push(ConfigIssue::Zero("rpc.max_message_bytes"));
    }
    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::Zero("timeouts.request_secs"));
    }
    for (field, value, max) in [
        ("timeouts.request_secs", config.timeouts.request_secs, MAX_REQUEST_SECS),
        ("rpc.request_timeout_ms", config.rpc.request_timeout_ms, MAX_RPC_TIMEOUT_MS),
        ("rpc.connect_timeout_secs", config.rpc.connect_timeout_secs, MAX_CONNECT_SECS),
    ] {
        if value > max {
            issues.push(ConfigIssue::TooLarge { field, max });
        }
    }
    if config.listener.max_body_bytes == 0 {
        issues.push(ConfigIssue::Zero("listener.max_body_bytes"));
    }
    if config.pagination.default_limit == 0 {
        issues.push(ConfigIssue::Zero("pagination.default_limit"));
    }
    if config.pagination.default_limit > config.pagination.max_limit {
        issues.push(ConfigIssue::LimitOrder {
            default: config.pagination.default_limit,
            max: config.pagination.max_limit,
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn is_host_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
