//! CRM API gateway library.
//!
//! REST CRUD surface for fourteen CRM resources, forwarded to the owning
//! backend services over gRPC.

// Core subsystems
pub mod backend;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod resources;

// Request processing
pub mod pagination;
pub mod validation;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
