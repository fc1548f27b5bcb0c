//! Uniform response envelope.
//!
//! # Responsibilities
//! - Wrap successful payloads as `{message, data}`
//! - Wrap every failure as `{message, error}` with a mapped status
//! - Keep the backend's own message in `error`
//!
//! # Design Decisions
//! - No response leaves the gateway outside this shape, including rejections and 404s
//! - Create answers 201, every other success 200

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::GatewayError;
use crate::resources::{Operation, ResourceDescriptor};

/// Serialized body of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvelopeBody {
    Success { message: String, data: Value },
    Failure { message: String, error: String },
}

/// A response body together with its HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: StatusCode,
    pub body: EnvelopeBody,
}

impl Envelope {
    pub fn success(status: StatusCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            status,
            body: EnvelopeBody::Success {
                message: message.into(),
                data,
            },
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status,
            body: EnvelopeBody::Failure {
                message: message.into(),
                error: error.into(),
            },
        }
    }

    /// Success envelope for a completed resource operation.
    pub fn completed(descriptor: &ResourceDescriptor, operation: Operation, data: Value) -> Self {
        let status = match operation {
            Operation::Create => StatusCode::CREATED,
            _ => StatusCode::OK,
        };
        Self::success(status, descriptor.success_message(operation), data)
    }

    /// Failure envelope for a resource operation.
    pub fn from_error(
        descriptor: &ResourceDescriptor,
        operation: Operation,
        error: &GatewayError,
    ) -> Self {
        Self::failure(
            error.status(),
            error.description(descriptor, operation),
            error.to_string(),
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, EnvelopeBody::Success { .. })
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
