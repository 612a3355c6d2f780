//! Permission store for registry-auth
//!
//! This module defines the store trait the decision engine queries and its
//! MySQL implementation backed by a bounded connection pool.

pub mod mysql;
pub mod pool;

pub use mysql::MysqlPermissionStore;
pub use pool::create_pool;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StoreError;

/// Store of granted permissions per principal and resource
///
/// This is the seam between the scope authorizer and the backing store. It
/// uses `async_trait` for async methods and `mockall::automock` for testing,
/// so decision tests can substitute a fake store for the shared pool.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Fetch the actions `account` holds on `resource_type:resource_name`
    ///
    /// Returns the empty set when the principal holds nothing for the
    /// resource. Each call checks out one pool connection and returns it on
    /// every exit path.
    async fn granted_actions(
        &self,
        account: &str,
        resource_type: &str,
        resource_name: &str,
    ) -> Result<HashSet<String>, StoreError>;
}
