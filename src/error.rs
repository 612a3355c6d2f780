//! Application error types for registry-auth
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Configuration errors
///
/// These only occur during startup; none of them can reach a live request.
/// The process must exit rather than serve traffic with undefined settings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Required environment variable is absent
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    /// Environment variable is present but cannot be parsed
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Permission-store errors
///
/// At startup a `Connection` error is fatal (the pool could not be
/// constructed). At request time `Connection` and `Query` collapse into a
/// Deny decision; only `PoolExhausted` escapes to the gateway so the
/// registry can distinguish "denied" from "retry later".
#[derive(Debug, Error)]
pub enum StoreError {
    /// All pool slots were checked out for longer than the acquire timeout
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Could not construct the pool or check out a connection
    #[error("Store connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// A permission lookup failed after a connection was checked out
    #[error("Store query error: {0}")]
    Query(#[source] sqlx::Error),

    /// A permission lookup exceeded the bounded query deadline
    #[error("Store query timed out")]
    QueryTimeout,
}

impl StoreError {
    /// Classify a checkout failure: a timed-out wait is pool exhaustion,
    /// everything else is a connection fault.
    pub fn from_acquire(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            other => StoreError::Connection(other),
        }
    }
}

/// Inbound payload decode errors
///
/// Absorbed into a Deny decision (fail-closed) and logged with the
/// correlation id; never surfaced as a distinct status code so parsing
/// internals do not leak to the registry client.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Credential body was not valid JSON for the expected shape
    #[error("Malformed credential payload: {0}")]
    Credential(String),

    /// Scope request contained no parseable scope entries
    #[error("Scope request carried no parseable entries")]
    EmptyScope,

    /// Scope request named no account to decide for
    #[error("Scope request carried no account")]
    MissingAccount,
}
