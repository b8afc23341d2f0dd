//! Shared error kinds used across component crates, mirroring the taxonomy
//! in spec §7. Each crate still defines its own `thiserror` enum for the
//! errors specific to it; the kinds here are the ones that cross component
//! boundaries as plain data (never an exception) per the Design Note in §9.

use serde::{Deserialize, Serialize};

/// A config-load or config-validation failure. Always `Fatal` per §7 — the
/// process aborts rather than silently falling back to a guessed default.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {detail}")]
    Invalid { field: String, detail: String },
}

/// Errors surfaced by the persistence layer. Both back-ends (§6: relational
/// and file-based) map their native errors onto this one enum so C10/C8/C9
/// code never branches on which back-end is active (Design Note, §9).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("io: {0}")]
    Io(String),
    #[error("serialization: {0}")]
    Serde(String),
    #[error("backend: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Classification used when converting a collaborator-transport failure
/// (forge gateway, notifier) into a `Failed` action outcome (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Network timeout, connection reset, HTTP 5xx, or forge rate limit.
    /// Retried with backoff inside the collaborator; converted to `Failed`
    /// only after the retry budget is exhausted.
    Transient,
    /// HTTP 4xx (other than rate limit), auth failure, invalid payload.
    /// Never retried.
    Permanent,
}
