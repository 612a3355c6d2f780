//! Domain models for registry-auth
//!
//! This module contains the core domain models used throughout the application.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

/// Outcome of a single access-control decision
///
/// Every per-request code path collapses to one of these two values; the
/// gateway maps Allow to a 200-class response and Deny to a 401-class one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request is permitted
    Allow,
    /// The request is refused (fail-closed default)
    Deny,
}

impl Decision {
    /// Check whether this decision grants access
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Deny => write!(f, "deny"),
        }
    }
}

/// Username/token pair presented on the authentication endpoint
///
/// Constructed per request from the decoded payload and discarded after the
/// decision. The field names on the wire are the legacy `UName`/`Token`
/// keys the registry front-end sends.
#[derive(Clone, Deserialize)]
pub struct Credential {
    /// Account name of the caller
    #[serde(rename = "UName", default)]
    pub username: String,

    /// Opaque bearer token; pre-validated by the upstream identity provider
    #[serde(rename = "Token", default)]
    pub token: String,
}

// The token must never reach a log line in cleartext, so Debug redacts it.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// One parsed entry of a registry token-scope request
///
/// The wire form is `type:name:action[,action...]`, e.g.
/// `repository:library/alpine:pull,push`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScope {
    /// Resource type, e.g. `repository` or `registry`
    pub resource_type: String,

    /// Resource name; may itself contain `:` (registry host with port)
    pub resource_name: String,

    /// Requested actions, e.g. `pull`, `push`
    pub actions: HashSet<String>,
}
