//! Connection-pool construction
//!
//! The pool is created once at startup and shared by every concurrent
//! authorization decision for the lifetime of the process. Connections are
//! established lazily: nothing connects until the first checkout, so
//! construction only fails on a malformed target.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::{DatabaseConfig, PoolConfig};
use crate::error::StoreError;

/// Create the shared backing-store pool
///
/// Sizing follows the startup configuration exactly: `max_open_connections`
/// bounds simultaneous checkouts, `max_idle_connections` is the idle floor
/// kept warm, and connections older than `max_lifetime` are recycled. A
/// checkout that waits longer than `acquire_timeout` fails with
/// `PoolExhausted` rather than queueing forever.
pub fn create_pool(database: &DatabaseConfig, pool: &PoolConfig) -> Result<MySqlPool, StoreError> {
    let connected = MySqlPoolOptions::new()
        .max_connections(pool.max_open_connections)
        .min_connections(pool.max_idle_connections)
        .max_lifetime(pool.max_lifetime())
        .acquire_timeout(pool.acquire_timeout())
        .connect_lazy(&database.connection_url())
        .map_err(StoreError::Connection)?;

    info!(
        max_open = pool.max_open_connections,
        max_idle = pool.max_idle_connections,
        max_lifetime_minutes = pool.max_lifetime_minutes,
        acquire_timeout_secs = pool.acquire_timeout_secs,
        "Connection pool created"
    );

    Ok(connected)
}
