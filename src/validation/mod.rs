//! Payload validation subsystem.
//!
//! # Data Flow
//! ```text
//! decoded JSON body (create/update on identity-checked resources)
//!     → pipeline.rs (full_name → password → phone, first failure wins)
//!     → fields.rs (individual rules)
//!     → ValidationError → 400 envelope
//! ```
//!
//! # Design Decisions
//! - The password charset and phone format are enforced by default
//! - `validation.strict = false` turns those two rules into warnings

pub mod fields;
pub mod pipeline;

pub use fields::{validate_full_name, validate_phone, validate_secret, ValidationError};
pub use pipeline::ValidationPipeline;
