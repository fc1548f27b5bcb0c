//! Resource client facade.
//!
//! # Data Flow
//! ```text
//! dispatch (operation + decoded input)
//!     → ResourceClient (descriptor check, message shape, deadline)
//!     → backend::RpcTransport::unary (shared channel)
//!     → Value | ClientError
//! ```
//!
//! # Design Decisions
//! - One client type for every resource; the descriptor decides what it may call
//! - No retries; a failed call is reported as-is
//! - Deadline is the inbound budget capped by `rpc.request_timeout_ms`

pub mod resource;

pub use resource::{primary_key, CallContext, ClientError, ResourceClient};
