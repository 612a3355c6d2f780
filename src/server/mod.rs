//! HTTP server components for registry-auth
//!
//! This module provides the HTTP server infrastructure: the router with the
//! two decision endpoints and the server lifecycle (bind, serve, graceful
//! shutdown).

pub mod router;

pub use router::{build_router, AppState, HealthResponse, EXEC_ID_HEADER};

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::store::PermissionStore;

/// HTTP server for registry-auth
///
/// Owns the listener configuration and shared state, serves until the
/// shutdown future resolves.
pub struct Server<S: PermissionStore + 'static> {
    config: ServerConfig,
    state: AppState<S>,
}

impl<S: PermissionStore + 'static> Server<S> {
    /// Create a new server instance
    pub fn new(config: ServerConfig, state: AppState<S>) -> Self {
        Self { config, state }
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr()
    }

    /// Run the server until the shutdown future resolves
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.bind_addr();
        let app = build_router(self.state)
            .layer(tower_http::trace::TraceLayer::new_for_http());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!("Auth server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Auth server shutdown complete");
        Ok(())
    }
}

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    /// Failed to serve requests
    #[error("Server error: {0}")]
    Serve(String),
}
