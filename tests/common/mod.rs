//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use registry_auth::auth::AccessControl;
use registry_auth::error::StoreError;
use registry_auth::server::AppState;
use registry_auth::store::PermissionStore;

/// Fault a fake store injects on every lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Lookups fail as a query error (absorbed into Deny)
    Query,
    /// Lookups fail as pool exhaustion (mapped to 503)
    PoolExhausted,
}

/// In-memory permission store for integration tests
///
/// Holds a fixed grant table keyed by account and resource; optionally
/// injects a fault on every lookup.
#[derive(Default)]
pub struct StaticPermissionStore {
    grants: HashMap<(String, String, String), HashSet<String>>,
    fault: Option<Fault>,
}

impl StaticPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `actions` to `account` on `resource_type:resource_name`
    pub fn grant(
        mut self,
        account: &str,
        resource_type: &str,
        resource_name: &str,
        actions: &[&str],
    ) -> Self {
        self.grants.insert(
            (
                account.to_string(),
                resource_type.to_string(),
                resource_name.to_string(),
            ),
            actions.iter().map(|a| a.to_string()).collect(),
        );
        self
    }

    /// Make every lookup fail with the given fault
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }
}

#[async_trait]
impl PermissionStore for StaticPermissionStore {
    async fn granted_actions(
        &self,
        account: &str,
        resource_type: &str,
        resource_name: &str,
    ) -> Result<HashSet<String>, StoreError> {
        match self.fault {
            Some(Fault::Query) => Err(StoreError::Query(sqlx::Error::RowNotFound)),
            Some(Fault::PoolExhausted) => Err(StoreError::PoolExhausted),
            None => Ok(self
                .grants
                .get(&(
                    account.to_string(),
                    resource_type.to_string(),
                    resource_name.to_string(),
                ))
                .cloned()
                .unwrap_or_default()),
        }
    }
}

/// Permission store that enforces a bounded checkout discipline
///
/// Models the connection pool contract: at most `max_open` lookups run
/// concurrently, each checkout is released on every exit path, and the
/// high-water mark of simultaneous checkouts is recorded for assertions.
pub struct BoundedStore {
    inner: StaticPermissionStore,
    slots: Semaphore,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
    fail_accounts: HashSet<String>,
}

impl BoundedStore {
    pub fn new(inner: StaticPermissionStore, max_open: usize) -> Self {
        Self {
            inner,
            slots: Semaphore::new(max_open),
            in_flight: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
            fail_accounts: HashSet::new(),
        }
    }

    /// Force lookups for `account` to fail, to exercise error exit paths
    pub fn failing_for(mut self, account: &str) -> Self {
        self.fail_accounts.insert(account.to_string());
        self
    }

    /// Highest number of simultaneous checkouts observed
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    /// Checkouts currently outstanding
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Releases one checkout when dropped, on every exit path
struct Checkout<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PermissionStore for BoundedStore {
    async fn granted_actions(
        &self,
        account: &str,
        resource_type: &str,
        resource_name: &str,
    ) -> Result<HashSet<String>, StoreError> {
        let _permit = self.slots.acquire().await.expect("semaphore closed");

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(current, Ordering::SeqCst);
        let _checkout = Checkout {
            in_flight: &self.in_flight,
        };

        // Hold the checkout long enough for concurrent callers to pile up.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        if self.fail_accounts.contains(account) {
            return Err(StoreError::Query(sqlx::Error::RowNotFound));
        }

        self.inner
            .granted_actions(account, resource_type, resource_name)
            .await
    }
}

/// Create an application state over any permission store
pub fn create_test_state<S: PermissionStore>(store: Arc<S>) -> AppState<S> {
    AppState {
        access: Arc::new(AccessControl::new(store)),
    }
}

/// Run a test server in the background and return its address
///
/// The server shuts down when the returned sender is dropped or sent.
pub async fn run_test_server<S: PermissionStore + 'static>(
    state: AppState<S>,
) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>) {
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let app = registry_auth::server::build_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
    });

    (addr, shutdown_tx)
}
