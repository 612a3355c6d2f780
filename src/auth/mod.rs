//! Access-control decision engine
//!
//! This module provides the two decision functions the gateway calls:
//! credential authentication and scope authorization. Both produce a binary
//! `Decision` and tag every log line with the caller-supplied correlation id.

pub mod scope;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{DecodeError, StoreError};
use crate::models::{Credential, Decision};
use crate::store::PermissionStore;

use scope::{parse_scope_entry, parse_token_request};

/// Access-control decision engine
///
/// One instance is shared by all concurrent requests; the permission store
/// behind it owns the only shared mutable state (the connection pool).
pub struct AccessControl<S: PermissionStore> {
    store: Arc<S>,
}

impl<S: PermissionStore> AccessControl<S> {
    /// Create a new decision engine over a permission store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Decide whether a username/token pair is acceptable
    ///
    /// Tokens are validated by the upstream identity provider before they
    /// reach this hook, so no store lookup happens here; the decision only
    /// rejects structurally absent credentials. Pure and deterministic
    /// aside from the trace lines keyed by `exec_id`.
    pub fn authenticate(&self, credential: &Credential, exec_id: &str) -> Decision {
        info!(
            exec_id,
            username = %credential.username,
            "Authentication request received"
        );

        let decision = if credential.username.is_empty() || credential.token.is_empty() {
            Decision::Deny
        } else {
            Decision::Allow
        };

        info!(exec_id, %decision, "Authentication decided");
        decision
    }

    /// Decide whether the requesting principal may perform every action in
    /// the scope request
    ///
    /// The policy is conjunctive and fail-closed: a request with no account,
    /// no parseable scope entries, a malformed entry, or any entry whose
    /// requested actions exceed the stored grant is denied as a whole.
    /// Store faults on a single entry also deny; only pool exhaustion is
    /// propagated, so the gateway can answer "temporarily unavailable"
    /// instead of a misleading permanent denial.
    pub async fn authorize(&self, raw_body: &[u8], exec_id: &str) -> Result<Decision, StoreError> {
        info!(exec_id, "Authorization request received");

        let (account, scopes) = match validate_token_request(raw_body) {
            Ok(validated) => validated,
            Err(e) => {
                warn!(exec_id, error = %e, "Scope request rejected, denying");
                return Ok(Decision::Deny);
            }
        };

        info!(
            exec_id,
            account = %account,
            entries = scopes.len(),
            "Scope request validated"
        );

        for raw_scope in &scopes {
            let scope = match parse_scope_entry(raw_scope) {
                Some(scope) => scope,
                None => {
                    warn!(exec_id, entry = %raw_scope, "Malformed scope entry, denying");
                    return Ok(Decision::Deny);
                }
            };

            let granted = match self
                .store
                .granted_actions(&account, &scope.resource_type, &scope.resource_name)
                .await
            {
                Ok(granted) => granted,
                Err(StoreError::PoolExhausted) => {
                    warn!(exec_id, "Connection pool exhausted during authorization");
                    return Err(StoreError::PoolExhausted);
                }
                Err(e) => {
                    // Fail closed: an unresolvable entry denies the request.
                    warn!(exec_id, error = %e, entry = %raw_scope, "Store lookup failed, denying");
                    return Ok(Decision::Deny);
                }
            };

            if !scope.actions.is_subset(&granted) {
                info!(
                    exec_id,
                    account = %account,
                    entry = %raw_scope,
                    "Requested actions exceed grant, denying"
                );
                return Ok(Decision::Deny);
            }
        }

        info!(exec_id, account = %account, "All scope entries granted");
        Ok(Decision::Allow)
    }
}

/// Extract the account and scope entries a decision needs, fail-closed
fn validate_token_request(raw_body: &[u8]) -> Result<(String, Vec<String>), DecodeError> {
    let request = parse_token_request(raw_body);
    let account = request.account.ok_or(DecodeError::MissingAccount)?;
    if request.scopes.is_empty() {
        return Err(DecodeError::EmptyScope);
    }
    Ok((account, request.scopes))
}
