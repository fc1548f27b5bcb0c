//! Page/limit parsing.

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::PaginationConfig;

/// Rejected page or limit query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageParamError {
    #[error("page must be a positive integer, got '{0}'")]
    InvalidPageParam(String),

    #[error("limit must be an integer between 1 and {max}, got '{raw}'")]
    InvalidLimitParam { raw: String, max: u32 },
}

impl PageParamError {
    pub fn description(&self) -> &'static str {
        match self {
            PageParamError::InvalidPageParam(_) => "error while parsing page",
            PageParamError::InvalidLimitParam { .. } => "error while parsing limit",
        }
    }
}

/// A validated list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl PageRequest {
    /// Parse raw query values. Absent or empty values take the defaults.
    pub fn parse(
        raw_page: Option<&str>,
        raw_limit: Option<&str>,
        search: Option<&str>,
        config: PaginationConfig,
    ) -> Result<Self, PageParamError> {
        let page = match present(raw_page) {
            None => 1,
            Some(raw) => positive(raw).ok_or_else(|| PageParamError::InvalidPageParam(raw.to_string()))?,
        };

        let limit = match present(raw_limit) {
            None => config.default_limit,
            Some(raw) => positive(raw)
                .filter(|limit| *limit <= config.max_limit)
                .ok_or_else(|| PageParamError::InvalidLimitParam {
                    raw: raw.to_string(),
                    max: config.max_limit,
                })?,
        };

        Ok(Self {
            page,
            limit,
            search: present(search).map(str::to_string),
        })
    }

    /// Rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Backend list message.
    pub fn to_message(&self) -> Value {
        json!({
            "offset": self.offset(),
            "limit": self.limit,
            "search": self.search.as_deref().unwrap_or(""),
        })
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|n| *n > 0)
}
