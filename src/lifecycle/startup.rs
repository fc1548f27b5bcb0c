//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Load the backend schema, then dial every backend before serving
//! - Bind the listener last and serve until shutdown
//!
//! # Design Decisions
//! - Unreachable backends are not fatal; only their resources fail
//! - A missing or unreadable schema is fatal, as is a listener that cannot bind

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::backend::{ConnectionRegistry, Dialer, GrpcDialer, SchemaError, ServiceSchema};
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

/// Fatal startup or serving failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("backend schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Load `rpc.descriptor_set`. Catalogue methods it lacks are logged; their calls fail with 500.
pub fn load_schema(config: &GatewayConfig) -> Result<ServiceSchema, SchemaError> {
    let path = config
        .rpc
        .descriptor_set
        .as_deref()
        .ok_or(SchemaError::NotConfigured)?;
    let schema = ServiceSchema::load(Path::new(path))?;

    let missing = schema.missing_methods();
    if missing.is_empty() {
        tracing::info!(descriptor_set = %path, "Backend schema loaded");
    } else {
        tracing::warn!(
            descriptor_set = %path,
            missing = missing.len(),
            methods = ?missing,
            "Backend schema does not describe every resource method"
        );
    }
    Ok(schema)
}

/// Build the server over connections made with `dialer`.
pub async fn build_server(config: GatewayConfig, dialer: &dyn Dialer) -> HttpServer {
    let registry = ConnectionRegistry::connect_all(&config.backends, dialer).await;
    tracing::info!(
        connections = registry.connection_count(),
        healthy = registry.all_connected(),
        "Backend registry ready"
    );
    HttpServer::new(config, Arc::new(registry))
}

/// Start every subsystem and serve until `shutdown` fires.
pub async fn run(config: GatewayConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let schema = Arc::new(load_schema(&config)?);
    let dialer = GrpcDialer::new(config.rpc.clone(), schema);
    let bind_address = config.listener.bind_address.clone();
    let server = build_server(config, &dialer).await;

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    serve_until(server, listener, &shutdown).await
}

async fn serve_until(
    server: HttpServer,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    // Subscribe before checking: a trigger after this point is delivered to `rx`.
    let rx = shutdown.subscribe();
    if shutdown.is_triggered() {
        tracing::info!("Shutdown requested during startup");
        return Ok(());
    }
    server.run(listener, rx).await?;
    Ok(())
}
