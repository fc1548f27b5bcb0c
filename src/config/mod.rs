//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → read once at startup by every subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; backends and descriptors are fixed for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_default, ConfigError};
pub use schema::{
    BackendConfig, BackendTlsConfig, Environment, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, PaginationConfig, RpcConfig, TimeoutConfig, ValidationConfig,
};
pub use validation::{validate_config, ConfigIssue};
