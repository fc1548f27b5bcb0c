//! Pagination normalizer.
//!
//! Converts `page`/`limit` query parameters into the `offset`/`limit` pair the
//! backends expect. Invalid values are rejected, never clamped.

pub mod page;

pub use page::{PageParamError, PageRequest};
