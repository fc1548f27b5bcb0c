//! Uniform client bound to one resource kind.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use thiserror::Error;

use crate::backend::{BackendCode, BackendError, RpcCall, RpcTransport};
use crate::observability::metrics;
use crate::pagination::PageRequest;
use crate::resources::{Identity, Operation, ResourceDescriptor};

/// Failure of a facade operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: Operation,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Per-request values carried into every backend call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub request_id: Option<String>,
    /// Inbound deadline; outbound calls never outlive it.
    pub deadline: Option<Instant>,
}

impl CallContext {
    pub fn new(request_id: Option<String>, deadline: Option<Instant>) -> Self {
        Self {
            request_id,
            deadline,
        }
    }

    /// Outbound timeout: the smaller of `cap` and the time left before the deadline.
    /// `None` once the deadline has passed.
    pub fn budget(&self, cap: Duration) -> Option<Duration> {
        match self.deadline {
            None => Some(cap),
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    None
                } else {
                    Some(left.min(cap))
                }
            }
        }
    }
}

/// Exposes exactly the operations the descriptor declares over the shared transport.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    descriptor: &'static ResourceDescriptor,
    transport: Arc<dyn RpcTransport>,
    timeout: Duration,
}

impl ResourceClient {
    /// Create a new client for one resource kind.
    pub fn new(
        descriptor: &'static ResourceDescriptor,
        transport: Arc<dyn RpcTransport>,
        timeout: Duration,
    ) -> Self {
        Self {
            descriptor,
            transport,
            timeout,
        }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    pub async fn create(&self, ctx: &CallContext, payload: Value) -> Result<Value, ClientError> {
        self.invoke(ctx, Operation::Create, payload).await
    }

    pub async fn get_by_id(&self, ctx: &CallContext, id: Identity) -> Result<Value, ClientError> {
        self.invoke(ctx, Operation::GetById, primary_key(id)).await
    }

    pub async fn update(&self, ctx: &CallContext, payload: Value) -> Result<Value, ClientError> {
        self.invoke(ctx, Operation::Update, payload).await
    }

    pub async fn delete(&self, ctx: &CallContext, id: Identity) -> Result<Value, ClientError> {
        self.invoke(ctx, Operation::Delete, primary_key(id)).await
    }

    pub async fn list(&self, ctx: &CallContext, page: &PageRequest) -> Result<Value, ClientError> {
        self.invoke(ctx, Operation::List, page.to_message()).await
    }

    async fn invoke(
        &self,
        ctx: &CallContext,
        operation: Operation,
        payload: Value,
    ) -> Result<Value, ClientError> {
        if !self.descriptor.supports(operation) {
            return Err(ClientError::Unsupported {
                resource: self.descriptor.path,
                operation,
            });
        }

        let group = self.descriptor.backend_group;
        let started = Instant::now();

        let Some(timeout) = ctx.budget(self.timeout) else {
            metrics::record_backend_call(group, BackendCode::DeadlineExceeded.as_str(), started);
            return Err(BackendError::deadline_exceeded().into());
        };

        let call = RpcCall {
            path: self.descriptor.method_path(operation),
            payload,
            timeout,
            request_id: ctx.request_id.clone(),
        };

        tracing::debug!(
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            method = %call.path,
            address = %self.transport.address(),
            timeout_ms = timeout.as_millis() as u64,
            "Calling backend"
        );

        let result = self.transport.unary(call).await;
        let code = match &result {
            Ok(_) => "ok",
            Err(e) => e.code.as_str(),
        };
        metrics::record_backend_call(group, code, started);

        result.map_err(ClientError::from)
    }
}

/// Primary-key wrapper for id-based lookups.
pub fn primary_key(id: Identity) -> Value {
    json!({ "id": id.to_string() })
}
