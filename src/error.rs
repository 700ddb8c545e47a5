//! Error types for reconciliation and ingestion passes.
//!
//! Two tiers, per the propagation policy:
//! - Input-level problems (unparseable dates, missing addresses,
//!   malformed generator output) are absorbed where they occur and
//!   never surface here.
//! - Collaborator failures (mail source, lead store, generation
//!   service) fail the whole pass; the caller owns retry policy.

use thiserror::Error;

/// True for transient HTTP statuses worth retrying.
fn retryable_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// Mail source failures.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mail credentials expired or revoked")]
    AuthExpired,
    #[error("mail API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl MailError {
    pub fn is_retryable(&self) -> bool {
        match self {
            MailError::Http(e) => e.is_timeout() || e.is_connect(),
            MailError::Api { status, .. } => retryable_status(*status),
            MailError::AuthExpired => false,
        }
    }
}

/// Lead store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("store configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Http(e) => e.is_timeout() || e.is_connect(),
            StoreError::Api { status, .. } => retryable_status(*status),
            StoreError::Config(_) => false,
        }
    }
}

/// Generation service failures. Malformed output is not an error —
/// adapters degrade it to an empty candidate batch.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl GenerateError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerateError::Http(e) => e.is_timeout() || e.is_connect(),
            GenerateError::Api { status, .. } => retryable_status(*status),
        }
    }
}

/// A failed reconciliation or ingestion pass.
///
/// There is no partial-update rollback; re-running the pass from
/// current state is the recovery mechanism.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("mail source: {0}")]
    Mail(#[from] MailError),
    #[error("lead store: {0}")]
    Store(#[from] StoreError),
    #[error("lead generation: {0}")]
    Generate(#[from] GenerateError),
}

impl SyncError {
    /// Whether the caller may reasonably retry the pass as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Mail(e) => e.is_retryable(),
            SyncError::Store(e) => e.is_retryable(),
            SyncError::Generate(e) => e.is_retryable(),
        }
    }
}
