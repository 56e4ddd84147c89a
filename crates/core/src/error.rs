//! Error types for geoscope descriptors

use thiserror::Error;

/// Main error type for descriptor construction
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Unparseable date: {0}")]
    DateParse(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Training and validation samples share seed {0}")]
    SeedCollision(u64),

    #[error("Classifier needs at least one input property")]
    EmptyInputProperties,

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for geoscope operations
pub type Result<T> = std::result::Result<T, Error>;
