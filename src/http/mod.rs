//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, deadline, list query)
//!     → routes.rs (descriptor-driven route table)
//!     → handlers.rs (extract, hand off to dispatch)
//!     → envelope.rs ({message, data} / {message, error} + status)
//!     → Send to client
//! ```

pub mod envelope;
pub mod handlers;
pub mod request;
pub mod routes;
pub mod server;

pub use envelope::{Envelope, EnvelopeBody};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
