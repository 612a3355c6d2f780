//! MySQL implementation of the PermissionStore trait
//!
//! Each lookup checks out one connection from the shared pool, runs a single
//! permission query, and returns the connection when the checkout guard
//! drops. The guard drops on every exit path, so query failures can never
//! leak a checked-out connection. The query itself runs under a bounded
//! deadline: a store that hangs mid-query must not pin the worker for the
//! duration of the outage.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::MySqlPool;

use super::PermissionStore;
use crate::error::StoreError;

/// MySQL-backed permission store over the shared connection pool
pub struct MysqlPermissionStore {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl MysqlPermissionStore {
    /// Wrap an already-constructed pool
    ///
    /// `query_timeout` bounds each permission lookup after checkout; expiry
    /// surfaces as `StoreError::QueryTimeout`, which the authorizer absorbs
    /// into a denial.
    pub fn new(pool: MySqlPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

/// Run a store future under a deadline, mapping expiry to `QueryTimeout`
async fn with_deadline<T>(
    deadline: Duration,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::QueryTimeout),
    }
}

#[async_trait]
impl PermissionStore for MysqlPermissionStore {
    async fn granted_actions(
        &self,
        account: &str,
        resource_type: &str,
        resource_name: &str,
    ) -> Result<HashSet<String>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::from_acquire)?;

        // On expiry the dropped connection is discarded or re-verified by
        // the pool before reuse; it is never handed out mid-query.
        let actions: Vec<String> = with_deadline(self.query_timeout, async {
            sqlx::query_scalar(
                r#"
                SELECT ACTION
                FROM SCOPE_PERMISSION
                WHERE USERNAME = ? AND RESOURCE_TYPE = ? AND RESOURCE_NAME = ?
                "#,
            )
            .bind(account)
            .bind(resource_type)
            .bind(resource_name)
            .fetch_all(&mut *conn)
            .await
            .map_err(StoreError::Query)
        })
        .await?;

        Ok(actions.into_iter().collect())
    }
}
