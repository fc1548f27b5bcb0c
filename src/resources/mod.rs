//! Resource catalogue subsystem.
//!
//! # Data Flow
//! ```text
//! catalog.rs (14 static ResourceDescriptors)
//!     → http::routes (mounts only the declared operations)
//!     → dispatch (per-request orchestration keyed by descriptor)
//!     → backend::registry (descriptor.backend_group → shared connection)
//! ```
//!
//! # Design Decisions
//! - Descriptors are `'static` and never mutated
//! - One generic dispatch path serves every kind; there are no per-resource handlers
//! - Identity checks are declared on the descriptor, not inferred from payloads

pub mod catalog;
pub mod descriptor;
pub mod identity;
pub mod operation;

pub use descriptor::{ResourceDescriptor, ResourceKind};
pub use identity::{Identity, IdentityError};
pub use operation::{Operation, OperationSet};
