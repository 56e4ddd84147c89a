//! Error types for backend evaluation.

use thiserror::Error;

/// Errors produced while evaluating descriptors against a backend.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("unknown dataset: {0}")]
    NotFound(String),

    #[error("collection is empty after filtering: {0}")]
    EmptyCollection(String),

    #[error("no sample fixture registered for seed {0}")]
    UnknownSeed(u64),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("backend cannot evaluate '{op}' {context}")]
    UnsupportedExpression {
        op: &'static str,
        context: &'static str,
    },

    #[error("descriptor error: {0}")]
    Core(#[from] geoscope_core::Error),
}

/// Result alias for backend operations.
pub type Result<T> = std::result::Result<T, CloudError>;
