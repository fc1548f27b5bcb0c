//! Generic per-request orchestration.
//!
//! # Responsibilities
//! - Decode path, query and body into the operation's input
//! - Check identities and run the validation pipeline
//! - Resolve the resource client and call the backend
//! - Normalize the outcome into an envelope
//!
//! # Design Decisions
//! - One code path for all resource kinds, parameterized by descriptor
//! - Stages only move forward; local failures never reach a backend

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::backend::ConnectionRegistry;
use crate::client::{CallContext, ResourceClient};
use crate::config::{PaginationConfig, ValidationConfig};
use crate::dispatch::error::GatewayError;
use crate::http::envelope::Envelope;
use crate::observability::metrics;
use crate::pagination::PageRequest;
use crate::resources::{Identity, Operation, ResourceDescriptor};
use crate::validation::ValidationPipeline;

/// Field carrying the resource id in update bodies.
pub const ID_FIELD: &str = "id";

/// Progress of one request. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestStage {
    Decoded,
    Validated,
    Dispatched,
    Normalized,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStage::Decoded => "decoded",
            RequestStage::Validated => "validated",
            RequestStage::Dispatched => "dispatched",
            RequestStage::Normalized => "normalized",
        };
        f.write_str(name)
    }
}

/// Raw operation input as extracted by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchRequest {
    Create {
        body: Value,
    },
    GetById {
        id: String,
    },
    Update {
        body: Value,
    },
    Delete {
        id: String,
    },
    List {
        page: Option<String>,
        limit: Option<String>,
        search: Option<String>,
    },
}

impl DispatchRequest {
    pub fn operation(&self) -> Operation {
        match self {
            DispatchRequest::Create { .. } => Operation::Create,
            DispatchRequest::GetById { .. } => Operation::GetById,
            DispatchRequest::Update { .. } => Operation::Update,
            DispatchRequest::Delete { .. } => Operation::Delete,
            DispatchRequest::List { .. } => Operation::List,
        }
    }
}

/// Input after decoding and identity checks.
enum Decoded {
    Payload(Value),
    Id(Identity),
    Page(PageRequest),
}

/// Shared dispatcher, cloned into every handler.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
    pipeline: ValidationPipeline,
    pagination: PaginationConfig,
    rpc_timeout: Duration,
}

impl Dispatcher {
    /// Create a new dispatcher over a populated registry.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        validation: ValidationConfig,
        pagination: PaginationConfig,
        rpc_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            pipeline: ValidationPipeline::new(validation),
            pagination,
            rpc_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Run one request to completion and return its envelope.
    pub async fn dispatch(
        &self,
        descriptor: &'static ResourceDescriptor,
        request: DispatchRequest,
        ctx: CallContext,
    ) -> Envelope {
        let operation = request.operation();
        let started = Instant::now();

        let envelope = match self.run(descriptor, request, &ctx).await {
            Ok(data) => Envelope::completed(descriptor, operation, data),
            Err(error) => self.log_failure(descriptor, operation, &ctx, &error),
        };

        self.finish(descriptor, operation, &ctx, &envelope, started);
        envelope
    }

    /// Normalize a failure raised before the request could be decoded (extractor rejections).
    pub fn reject(
        &self,
        descriptor: &'static ResourceDescriptor,
        operation: Operation,
        ctx: CallContext,
        error: GatewayError,
    ) -> Envelope {
        let started = Instant::now();
        let envelope = self.log_failure(descriptor, operation, &ctx, &error);
        self.finish(descriptor, operation, &ctx, &envelope, started);
        envelope
    }

    async fn run(
        &self,
        descriptor: &'static ResourceDescriptor,
        request: DispatchRequest,
        ctx: &CallContext,
    ) -> Result<Value, GatewayError> {
        let operation = request.operation();
        if !descriptor.supports(operation) {
            return Err(GatewayError::Unsupported {
                resource: descriptor.path,
                operation,
            });
        }

        let decoded = self.decode(request)?;
        trace_stage(descriptor, operation, ctx, RequestStage::Decoded);

        if descriptor.validates(operation) {
            if let Decoded::Payload(body) = &decoded {
                self.pipeline.validate(body)?;
            }
        }
        trace_stage(descriptor, operation, ctx, RequestStage::Validated);

        let transport = self.registry.group(descriptor.backend_group)?;
        let client = ResourceClient::new(descriptor, transport, self.rpc_timeout);
        trace_stage(descriptor, operation, ctx, RequestStage::Dispatched);

        let data = match (operation, decoded) {
            (Operation::Create, Decoded::Payload(body)) => client.create(ctx, body).await?,
            (Operation::Update, Decoded::Payload(body)) => client.update(ctx, body).await?,
            (Operation::GetById, Decoded::Id(id)) => client.get_by_id(ctx, id).await?,
            (Operation::Delete, Decoded::Id(id)) => client.delete(ctx, id).await?,
            (Operation::List, Decoded::Page(page)) => client.list(ctx, &page).await?,
            (operation, _) => {
                return Err(GatewayError::Decode(format!(
                    "input does not match operation {}",
                    operation
                )))
            }
        };
        Ok(data)
    }

    fn decode(&self, request: DispatchRequest) -> Result<Decoded, GatewayError> {
        match request {
            DispatchRequest::Create { body } => {
                require_object(&body)?;
                Ok(Decoded::Payload(body))
            }
            DispatchRequest::Update { body } => {
                require_object(&body)?;
                let id = body
                    .get(ID_FIELD)
                    .and_then(Value::as_str)
                    .ok_or_else(|| GatewayError::Decode("missing field `id`".to_string()))?;
                Identity::parse(id)?;
                Ok(Decoded::Payload(body))
            }
            DispatchRequest::GetById { id } | DispatchRequest::Delete { id } => {
                Ok(Decoded::Id(Identity::parse(&id)?))
            }
            DispatchRequest::List {
                page,
                limit,
                search,
            } => Ok(Decoded::Page(PageRequest::parse(
                page.as_deref(),
                limit.as_deref(),
                search.as_deref(),
                self.pagination,
            )?)),
        }
    }

    fn log_failure(
        &self,
        descriptor: &ResourceDescriptor,
        operation: Operation,
        ctx: &CallContext,
        error: &GatewayError,
    ) -> Envelope {
        let request_id = ctx.request_id.as_deref().unwrap_or("-");
        if error.is_local() {
            tracing::info!(
                request_id,
                resource = descriptor.path,
                operation = %operation,
                error = %error,
                "Request rejected"
            );
        } else {
            tracing::error!(
                request_id,
                resource = descriptor.path,
                operation = %operation,
                error = %error,
                "Backend operation failed"
            );
        }
        Envelope::from_error(descriptor, operation, error)
    }

    fn finish(
        &self,
        descriptor: &ResourceDescriptor,
        operation: Operation,
        ctx: &CallContext,
        envelope: &Envelope,
        started: Instant,
    ) {
        trace_stage(descriptor, operation, ctx, RequestStage::Normalized);
        metrics::record_request(descriptor.path, operation, envelope.status.as_u16(), started);
    }
}

fn require_object(body: &Value) -> Result<(), GatewayError> {
    if body.is_object() {
        Ok(())
    } else {
        Err(GatewayError::Decode("request body must be a JSON object".to_string()))
    }
}

fn trace_stage(
    descriptor: &ResourceDescriptor,
    operation: Operation,
    ctx: &CallContext,
    stage: RequestStage,
) {
    tracing::trace!(
        request_id = ctx.request_id.as_deref().unwrap_or("-"),
        resource = descriptor.path,
        operation = %operation,
        stage = %stage,
        "Request stage"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, RpcCall, RpcTransport};
    use crate::http::envelope::EnvelopeBody;
    use crate::resources::ResourceKind;
    use crate::validation::ValidationError;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RpcTransport for Counting {
        async fn unary(&self, call: RpcCall) -> Result<Value, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(call.payload)
        }

        fn address(&self) -> &str {
            "mock:1"
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<Counting>) {
        let transport = Arc::new(Counting::default());
        let mut registry = ConnectionRegistry::new();
        registry.insert("user_service", transport.clone());
        let dispatcher = Dispatcher::new(
            Arc::new(registry),
            ValidationConfig::default(),
            PaginationConfig::default(),
            Duration::from_secs(5),
        );
        (dispatcher, transport)
    }

    fn error_of(envelope: &Envelope) -> &str {
        match &envelope.body {
            EnvelopeBody::Failure { error, .. } => error,
            EnvelopeBody::Success { .. } => panic!("expected failure, got {:?}", envelope),
        }
    }

    #[test]
    fn test_stages_are_ordered() {
        assert!(RequestStage::Decoded < RequestStage::Validated);
        assert!(RequestStage::Validated < RequestStage::Dispatched);
        assert!(RequestStage::Dispatched < RequestStage::Normalized);
    }

    #[tokio::test]
    async fn test_malformed_id_never_dispatched() {
        let (dispatcher, transport) = dispatcher();
        let envelope = dispatcher
            .dispatch(
                ResourceKind::Student.descriptor(),
                DispatchRequest::GetById { id: "xyz".into() },
                CallContext::default(),
            )
            .await;

        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_failure_never_dispatched() {
        let (dispatcher, transport) = dispatcher();
        let envelope = dispatcher
            .dispatch(
                ResourceKind::Administrator.descriptor(),
                DispatchRequest::Create {
                    body: json!({"full_name": "Ann", "password": "Secur3Pass", "phone": "+998901234567"}),
                },
                CallContext::default(),
            )
            .await;

        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&envelope), ValidationError::InvalidName.to_string());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unchecked_kind_skips_validation() {
        let (dispatcher, transport) = dispatcher();
        let envelope = dispatcher
            .dispatch(
                ResourceKind::Branch.descriptor(),
                DispatchRequest::Create { body: json!({"name": "Downtown"}) },
                CallContext::default(),
            )
            .await;

        assert_eq!(envelope.status, StatusCode::CREATED);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_requires_valid_body_id() {
        let (dispatcher, transport) = dispatcher();
        let branch = ResourceKind::Branch.descriptor();

        let missing = dispatcher
            .dispatch(branch, DispatchRequest::Update { body: json!({"name": "x"}) }, CallContext::default())
            .await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);

        let malformed = dispatcher
            .dispatch(
                branch,
                DispatchRequest::Update { body: json!({"id": "42", "name": "x"}) },
                CallContext::default(),
            )
            .await;
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

        let ok = dispatcher
            .dispatch(
                branch,
                DispatchRequest::Update {
                    body: json!({"id": "0f8fad5b-d9cb-469f-a165-70867728950e", "name": "x"}),
                },
                CallContext::default(),
            )
            .await;
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_object_body_rejected() {
        let (dispatcher, transport) = dispatcher();
        let envelope = dispatcher
            .dispatch(
                ResourceKind::Event.descriptor(),
                DispatchRequest::Create { body: json!([1, 2, 3]) },
                CallContext::default(),
            )
            .await;
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_group_is_internal_error() {
        let (dispatcher, transport) = dispatcher();
        let envelope = dispatcher
            .dispatch(
                ResourceKind::Schedule.descriptor(),
                DispatchRequest::List { page: None, limit: None, search: None },
                CallContext::default(),
            )
            .await;
        assert_eq!(envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_undeclared_operation_is_405() {
        let (dispatcher, _) = dispatcher();
        let envelope = dispatcher
            .dispatch(
                ResourceKind::JoinEvent.descriptor(),
                DispatchRequest::List { page: None, limit: None, search: None },
                CallContext::default(),
            )
            .await;
        assert_eq!(envelope.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_bad_page_rejected() {
        let (dispatcher, transport) = dispatcher();
        let envelope = dispatcher
            .dispatch(
                ResourceKind::Teacher.descriptor(),
                DispatchRequest::List { page: Some("0".into()), limit: None, search: None },
                CallContext::default(),
            )
            .await;
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        match &envelope.body {
            EnvelopeBody::Failure { message, .. } => assert_eq!(message, "error while parsing page"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}
