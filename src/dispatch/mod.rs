//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! http handler (DispatchRequest + CallContext)
//!     → Decoded    (body shape, identity, page/limit)
//!     → Validated  (pipeline, when the descriptor declares it)
//!     → Dispatched (registry → ResourceClient → backend)
//!     → Normalized (Envelope + status)
//! ```

pub mod dispatcher;
pub mod error;

pub use dispatcher::{DispatchRequest, Dispatcher, RequestStage, ID_FIELD};
pub use error::{backend_status, GatewayError};
