//! Error types for the tail generation pipeline.

use thiserror::Error;

/// Backend transport and protocol errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    RequestFailed(String),

    #[error("Backend returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Malformed backend payload: {0}")]
    MalformedPayload(String),

    #[error("Backend retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: usize, last: String },
}

/// Pipeline errors.
///
/// Seed-corpus integrity is a precondition, so `MalformedSeedLine` aborts a run.
/// `InsufficientContext`, `Backend`, and `InvalidResponse` are local to a single
/// query: the orchestrator logs them and moves to the next query.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Malformed seed line {line_no}: expected 3 tab-separated fields, got {found}")]
    MalformedSeedLine { line_no: usize, found: usize },

    #[error("Malformed query line {line_no}: expected at least 2 tab-separated fields, got {found}")]
    MalformedQueryLine { line_no: usize, found: usize },

    #[error(
        "Insufficient context for relation '{relation}': \
         {available} eligible heads, {requested} requested"
    )]
    InsufficientContext {
        relation: String,
        available: usize,
        requested: usize,
    },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Whether this error is local to a single query.
    ///
    /// Query-local errors are logged and skipped; everything else aborts the run.
    pub fn is_query_local(&self) -> bool {
        matches!(
            self,
            PipelineError::InsufficientContext { .. }
                | PipelineError::Backend(_)
                | PipelineError::InvalidResponse(_)
        )
    }
}
