//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment environment.
    pub environment: Environment,

    /// Listener configuration (bind address, body limits, CORS).
    pub listener: ListenerConfig,

    /// Backend services, one entry per backend group.
    pub backends: Vec<BackendConfig>,

    /// Outbound RPC settings shared by every backend connection.
    pub rpc: RpcConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Page/limit defaults for list endpoints.
    pub pagination: PaginationConfig,

    /// Identity payload validation settings.
    pub validation: ValidationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            listener: ListenerConfig::default(),
            backends: vec![
                BackendConfig::plaintext("user_service", "127.0.0.1:9101"),
                BackendConfig::plaintext("schedule_service", "127.0.0.1:9102"),
            ],
            rpc: RpcConfig::default(),
            timeouts: TimeoutConfig::default(),
            pagination: PaginationConfig::default(),
            validation: ValidationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Look up the backend entry for a group name.
    pub fn backend(&self, group: &str) -> Option<&BackendConfig> {
        self.backends.iter().find(|b| b.name == group)
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Develop,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "develop" | "development" | "dev" => Ok(Environment::Develop),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Allow cross-origin requests from any origin.
    pub cors_enabled: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            cors_enabled: true,
        }
    }
}

/// A backend service reachable over RPC.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend group name referenced by resource descriptors.
    pub name: String,

    /// Backend address (e.g., "127.0.0.1:9101").
    pub address: String,

    /// Transport security. Plaintext when absent.
    #[serde(default)]
    pub tls: Option<BackendTlsConfig>,
}

impl BackendConfig {
    /// A backend reached over a plaintext channel.
    pub fn plaintext(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            tls: None,
        }
    }
}

/// TLS settings for a backend channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendTlsConfig {
    /// PEM bundle used to verify the backend. System roots when absent.
    pub ca_cert_path: Option<String>,

    /// Expected server name. Defaults to the host part of the address.
    pub domain_name: Option<String>,
}

/// Outbound RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Deadline for a single backend call in milliseconds.
    pub request_timeout_ms: u64,

    /// Send and receive cap for a single message in bytes.
    pub max_message_bytes: usize,

    /// Binary `FileDescriptorSet` describing every backend service. Required to serve.
    pub descriptor_set: Option<String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_ms: 5_000,
            max_message_bytes: 52_428_800, // 50MB, room for bulk list payloads
            descriptor_set: None,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total budget for one inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Pagination defaults applied to list endpoints.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Limit used when the query omits one.
    pub default_limit: u32,

    /// Largest limit a caller may request.
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Identity payload validation.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject secrets outside the allowed charset and phones outside `+998XXXXXXXXX`.
    /// When false those two checks only log a warning.
    pub strict: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.rpc.max_message_bytes, 52_428_800);
        assert!(config.validation.strict);
        assert_eq!(config.backends.len(), 2);
    }

    #[test]
    fn test_backends_from_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            environment = "production"

            [rpc]
            descriptor_set = "/etc/crm-gateway/services.pb"

            [[backends]]
            name = "user_service"
            address = "users.internal:9000"

            [[backends]]
            name = "schedule_service"
            address = "schedules.internal:9000"
            tls = { domain_name = "schedules.internal" }
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.rpc.descriptor_set.as_deref(), Some("/etc/crm-gateway/services.pb"));
        assert_eq!(config.backend("user_service").unwrap().tls, None);
        let tls = config.backend("schedule_service").unwrap().tls.clone().unwrap();
        assert_eq!(tls.domain_name.as_deref(), Some("schedules.internal"));
        assert!(tls.ca_cert_path.is_none());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
    }
}
