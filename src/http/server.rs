//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router from the resource catalogue
//! - Wire up middleware (request ID, tracing, body limit, CORS)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::backend::ConnectionRegistry;
use crate::config::{Environment, GatewayConfig};
use crate::dispatch::Dispatcher;
use crate::http::{handlers, routes};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    /// Inbound budget for one request.
    pub request_timeout: Duration,
    pub environment: Environment,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server over an already populated registry.
    pub fn new(config: GatewayConfig, registry: Arc<ConnectionRegistry>) -> Self {
        let dispatcher = Dispatcher::new(
            registry,
            config.validation,
            config.pagination,
            Duration::from_millis(config.rpc.request_timeout_ms),
        );

        let state = AppState {
            dispatcher,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            environment: config.environment,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = routes::api_routes()
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes));

        if config.listener.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until shutdown fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = ?self.config.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
