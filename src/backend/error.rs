//! Backend failure types.

use std::fmt;

use thiserror::Error;
use tonic::{Code, Status};

/// Structured failure category reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCode {
    NotFound,
    InvalidArgument,
    PermissionDenied,
    Unavailable,
    Internal,
    DeadlineExceeded,
    /// Any other status; surfaced as a caller error.
    Other,
}

impl BackendCode {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendCode::NotFound => "not_found",
            BackendCode::InvalidArgument => "invalid_argument",
            BackendCode::PermissionDenied => "permission_denied",
            BackendCode::Unavailable => "unavailable",
            BackendCode::Internal => "internal",
            BackendCode::DeadlineExceeded => "deadline_exceeded",
            BackendCode::Other => "other",
        }
    }
}

impl From<Code> for BackendCode {
    fn from(code: Code) -> Self {
        match code {
            Code::NotFound => BackendCode::NotFound,
            Code::InvalidArgument => BackendCode::InvalidArgument,
            Code::PermissionDenied => BackendCode::PermissionDenied,
            Code::Unavailable => BackendCode::Unavailable,
            Code::Internal => BackendCode::Internal,
            Code::DeadlineExceeded => BackendCode::DeadlineExceeded,
            _ => BackendCode::Other,
        }
    }
}

impl fmt::Display for BackendCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed backend call. The message is the backend's own text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub code: BackendCode,
    pub message: String,
}

impl BackendError {
    pub fn new(code: BackendCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(BackendCode::Internal, message)
    }

    pub fn deadline_exceeded() -> Self {
        Self::new(BackendCode::DeadlineExceeded, "deadline exceeded")
    }
}

impl From<Status> for BackendError {
    fn from(status: Status) -> Self {
        Self::new(status.code().into(), status.message())
    }
}

/// Failure to establish or look up a backend connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("invalid backend address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to load CA bundle '{path}': {reason}")]
    CaBundle { path: String, reason: String },

    #[error("failed to connect to {address}: {reason}")]
    Dial { address: String, reason: String },

    #[error("backend group '{group}' has no connection")]
    NotConnected { group: String },
}
