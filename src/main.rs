//! registry-auth - Authentication and authorization decisions for a container registry
//!
//! This is the main entry point for the auth server. Configuration is
//! resolved from the environment once; any missing or malformed value
//! aborts startup with a non-zero exit status before the listener binds.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use registry_auth::auth::AccessControl;
use registry_auth::config::Config;
use registry_auth::server::{AppState, Server};
use registry_auth::store::{create_pool, MysqlPermissionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        "Starting registry-auth server"
    );

    // The pool is created once and shared by every concurrent decision for
    // the process lifetime. Connections are lazy, so this only fails on a
    // malformed target.
    let pool = create_pool(&config.database, &config.pool)
        .context("Failed to create the backing-store connection pool")?;
    let store = Arc::new(MysqlPermissionStore::new(
        pool,
        config.pool.query_timeout(),
    ));

    let state = AppState {
        access: Arc::new(AccessControl::new(store)),
    };

    let server = Server::new(config.server, state);
    server
        .run(shutdown_signal())
        .await
        .context("Auth server terminated with an error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
