//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, or `std::process`. Infrastructure failures arrive here
//! already flattened into messages.

use thiserror::Error;

// ── Store errors ──────────────────────────────────────────────────────────────

/// Errors raised by the persistent account store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("port range {start}-{end} exhausted")]
    PoolExhausted { start: u16, end: u16 },

    #[error("unable to persist account data: {0}")]
    Persist(#[from] std::io::Error),
}

// ── Status parsing errors ─────────────────────────────────────────────────────

/// Raised when platform status JSON does not have the expected shape.
#[derive(Debug, Error)]
pub enum StatusParseError {
    #[error("malformed {kind} status: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} status is missing {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors surfaced by the provisioning orchestrator to its callers.
///
/// `NotFound` maps to HTTP 404; every other variant maps to HTTP 500.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("User not found")]
    NotFound,

    /// Non-success response from the identity API, or a failed platform call.
    #[error("{0}")]
    Upstream(String),

    #[error("Unable to parse JSON from kubectl: {0}")]
    Parse(#[from] StatusParseError),

    #[error("No free service port available")]
    PoolExhausted,

    #[error("Unable to save account data: {0}")]
    Storage(String),
}

impl ProvisionError {
    /// Build an `Upstream` error from a context message and the underlying cause.
    pub fn upstream(message: &str, cause: impl std::fmt::Display) -> Self {
        Self::Upstream(format!("{message}: {cause}"))
    }
}

impl From<StoreError> for ProvisionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PoolExhausted { .. } => Self::PoolExhausted,
            other => Self::Storage(other.to_string()),
        }
    }
}
