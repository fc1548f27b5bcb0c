//! Backend channels.
//!
//! # Responsibilities
//! - Dial one gRPC channel per backend address
//! - Apply message-size caps and optional TLS
//! - Issue unary calls with a deadline and the caller's request ID
//! - Transcode JSON payloads to the method's Protobuf messages and back

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::MetadataValue;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

use crate::backend::codec::{self, DynamicCodec};
use crate::backend::error::{BackendCode, BackendError, ConnectionError};
use crate::backend::schema::ServiceSchema;
use crate::config::{BackendConfig, RpcConfig};

/// Metadata key carrying the inbound request ID to backends.
pub const REQUEST_ID_METADATA: &str = "x-request-id";

/// One outbound unary call.
#[derive(Debug, Clone)]
pub struct RpcCall {
    /// Full method path, e.g. `/user_service.StudentService/Create`.
    pub path: String,
    pub payload: Value,
    pub timeout: Duration,
    pub request_id: Option<String>,
}

/// A shared, thread-safe handle to one backend.
///
/// Implementations must not hold per-request state; the same handle serves
/// every resource routed to the address.
#[async_trait]
pub trait RpcTransport: Send + Sync + fmt::Debug {
    /// Perform a unary call, failing with `DeadlineExceeded` once `call.timeout` elapses.
    async fn unary(&self, call: RpcCall) -> Result<Value, BackendError>;

    /// Address this transport is connected to.
    fn address(&self) -> &str;
}

/// Establishes transports. Abstracted so the registry can be exercised without a network.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, backend: &BackendConfig) -> Result<Arc<dyn RpcTransport>, ConnectionError>;
}

/// Dials real tonic channels.
#[derive(Debug, Clone)]
pub struct GrpcDialer {
    rpc: RpcConfig,
    schema: Arc<ServiceSchema>,
}

impl GrpcDialer {
    /// Create a new dialer whose transports encode against `schema`.
    pub fn new(rpc: RpcConfig, schema: Arc<ServiceSchema>) -> Self {
        Self { rpc, schema }
    }

    fn endpoint(&self, backend: &BackendConfig) -> Result<Endpoint, ConnectionError> {
        let scheme = if backend.tls.is_some() { "https" } else { "http" };
        let uri = format!("{}://{}", scheme, backend.address);

        let invalid = |reason: String| ConnectionError::InvalidAddress {
            address: backend.address.clone(),
            reason,
        };

        let mut endpoint = Endpoint::from_shared(uri)
            .map_err(|e| invalid(e.to_string()))?
            .connect_timeout(Duration::from_secs(self.rpc.connect_timeout_secs));

        if let Some(tls) = &backend.tls {
            let mut config = ClientTlsConfig::new();
            config = match &tls.ca_cert_path {
                Some(path) => {
                    let pem = std::fs::read(path).map_err(|e| ConnectionError::CaBundle {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                    config.ca_certificate(Certificate::from_pem(pem))
                }
                None => config.with_native_roots(),
            };
            if let Some(domain) = &tls.domain_name {
                config = config.domain_name(domain.clone());
            }
            endpoint = endpoint.tls_config(config).map_err(|e| invalid(e.to_string()))?;
        }

        Ok(endpoint)
    }
}

#[async_trait]
impl Dialer for GrpcDialer {
    async fn dial(&self, backend: &BackendConfig) -> Result<Arc<dyn RpcTransport>, ConnectionError> {
        let endpoint = self.endpoint(backend)?;
        let channel = endpoint.connect().await.map_err(|e| ConnectionError::Dial {
            address: backend.address.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            group = %backend.name,
            address = %backend.address,
            tls = backend.tls.is_some(),
            "Backend channel established"
        );

        Ok(Arc::new(GrpcTransport {
            address: backend.address.clone(),
            channel,
            schema: self.schema.clone(),
            max_message_bytes: self.rpc.max_message_bytes,
        }))
    }
}

/// A tonic channel making Protobuf unary calls on behalf of JSON callers.
#[derive(Clone)]
pub struct GrpcTransport {
    address: String,
    channel: Channel,
    schema: Arc<ServiceSchema>,
    max_message_bytes: usize,
}

impl fmt::Debug for GrpcTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcTransport")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl GrpcTransport {
    async fn call(&self, call: RpcCall) -> Result<Value, BackendError> {
        let path = PathAndQuery::try_from(call.path.as_str())
            .map_err(|e| BackendError::internal(format!("invalid method path '{}': {}", call.path, e)))?;
        let method = self
            .schema
            .method(&call.path)
            .map_err(|e| BackendError::internal(e.to_string()))?;
        let message = codec::to_message(&method.input(), call.payload)
            .map_err(|e| BackendError::new(BackendCode::InvalidArgument, e))?;

        // Channel is a cheap handle; Grpc needs &mut self.
        let mut client = tonic::client::Grpc::new(self.channel.clone())
            .max_decoding_message_size(self.max_message_bytes)
            .max_encoding_message_size(self.max_message_bytes);

        client
            .ready()
            .await
            .map_err(|e| BackendError::new(BackendCode::Unavailable, e.to_string()))?;

        let mut request = tonic::Request::new(message);
        request.set_timeout(call.timeout);
        if let Some(id) = call.request_id.as_deref() {
            match MetadataValue::try_from(id) {
                Ok(value) => {
                    request.metadata_mut().insert(REQUEST_ID_METADATA, value);
                }
                Err(_) => tracing::debug!(request_id = %id, "Request ID is not valid metadata"),
            }
        }

        let response = client
            .unary(request, path, DynamicCodec::new(method.output()))
            .await?;
        codec::to_json(&response.into_inner()).map_err(BackendError::internal)
    }
}

#[async_trait]
impl RpcTransport for GrpcTransport {
    async fn unary(&self, call: RpcCall) -> Result<Value, BackendError> {
        let timeout = call.timeout;
        let started = Instant::now();
        let result = match tokio::time::timeout(timeout, self.call(call)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::deadline_exceeded()),
        };
        tracing::trace!(
            address = %self.address,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Unary call finished"
        );
        result
    }

    fn address(&self) -> &str {
        &self.address
    }
}
