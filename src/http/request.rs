//! Inbound request helpers.
//!
//! # Responsibilities
//! - Read the request ID assigned by the request-id layer
//! - Derive the per-request deadline
//! - Describe the list query string
//!
//! # Design Decisions
//! - Request ID is set as early as possible (outermost layer) and echoed back
//! - Query values stay raw strings here; pagination rules decide what is valid

use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use serde::Deserialize;

use crate::client::CallContext;

/// Header holding the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Raw list query (`?search=&page=&limit=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

/// Extension trait for reading the request ID.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<String>;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> Option<String> {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Build the call context for a request that arrived now.
///
/// A budget too large to represent as an instant means no inbound deadline.
pub fn call_context(headers: &HeaderMap, budget: Duration) -> CallContext {
    CallContext::new(headers.request_id(), Instant::now().checked_add(budget))
}
