//! Request-level error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::{BackendCode, BackendError, ConnectionError};
use crate::client::ClientError;
use crate::pagination::PageParamError;
use crate::resources::{IdentityError, Operation, ResourceDescriptor};
use crate::validation::ValidationError;

/// Every way a request can fail after routing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Decode(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    PageParam(#[from] PageParamError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: Operation,
    },
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unsupported {
                resource,
                operation,
            } => GatewayError::Unsupported {
                resource,
                operation,
            },
            ClientError::Backend(e) => GatewayError::Backend(e),
        }
    }
}

impl GatewayError {
    /// Caller mistakes detected before any backend call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            GatewayError::Decode(_)
                | GatewayError::Identity(_)
                | GatewayError::Validation(_)
                | GatewayError::PageParam(_)
        )
    }

    /// HTTP status for the failure envelope.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Decode(_)
            | GatewayError::Identity(_)
            | GatewayError::Validation(_)
            | GatewayError::PageParam(_) => StatusCode::BAD_REQUEST,
            GatewayError::Backend(e) => backend_status(e.code),
            GatewayError::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Unsupported { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Human-readable description of what was being attempted.
    pub fn description(&self, descriptor: &ResourceDescriptor, operation: Operation) -> String {
        match self {
            GatewayError::Decode(_) => "error while reading request body".to_string(),
            GatewayError::Identity(_) => {
                format!("error while validating {} id", descriptor.display.to_lowercase())
            }
            GatewayError::Validation(e) => e.description().to_string(),
            GatewayError::PageParam(e) => e.description().to_string(),
            GatewayError::Backend(_)
            | GatewayError::Connection(_)
            | GatewayError::Unsupported { .. } => descriptor.failure_description(operation),
        }
    }
}

/// Fixed mapping from backend failure category to HTTP status.
pub fn backend_status(code: BackendCode) -> StatusCode {
    match code {
        BackendCode::NotFound => StatusCode::NOT_FOUND,
        BackendCode::InvalidArgument => StatusCode::BAD_REQUEST,
        BackendCode::PermissionDenied => StatusCode::FORBIDDEN,
        BackendCode::Unavailable | BackendCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        BackendCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        BackendCode::Other => StatusCode::BAD_REQUEST,
    }
}
