//! Backend connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig.backends
//!     → connection.rs (GrpcDialer: tonic Endpoint → Channel)
//!     → registry.rs (one channel per distinct address and TLS setting, group → channel)
//!     → client::ResourceClient (unary calls)
//!     → codec.rs (JSON ⇄ Protobuf through schema.rs descriptors)
//!     → error.rs (tonic::Status → BackendError)
//! ```
//!
//! # Design Decisions
//! - All channels are dialed during startup; the request path only reads
//! - Payloads stay JSON inside the gateway; only the wire sees Protobuf
//! - No retries here; the channel's transport owns reconnection

pub mod codec;
pub mod connection;
pub mod error;
pub mod registry;
pub mod schema;

pub use codec::DynamicCodec;
pub use connection::{Dialer, GrpcDialer, GrpcTransport, RpcCall, RpcTransport, REQUEST_ID_METADATA};
pub use error::{BackendCode, BackendError, ConnectionError};
pub use registry::{ConnectionRegistry, GroupStatus};
pub use schema::{SchemaError, ServiceSchema};
