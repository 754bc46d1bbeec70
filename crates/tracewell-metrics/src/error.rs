//! Metrics error types.

use thiserror::Error;

/// Errors raised while creating or exporting instruments.
#[derive(Debug, Error)]
pub enum Error {
    /// The registry already holds an incompatible instrument under this name.
    #[error("metric {name:?} conflicts with an existing registration: {source}")]
    RegistrationConflict {
        name: String,
        #[source]
        source: prometheus::Error,
    },

    /// The instrument could not be constructed from the given options.
    #[error("invalid options for metric {name:?}: {source}")]
    InvalidOptions {
        name: String,
        #[source]
        source: prometheus::Error,
    },

    /// Label values could not be bound to the instrument's label names.
    #[error("label values do not match label names of metric {name:?}: {source}")]
    LabelMismatch {
        name: String,
        #[source]
        source: prometheus::Error,
    },

    /// Two distinct tag keys normalize to the same label name.
    #[error("metric {name:?}: tags {first:?} and {second:?} both map to label {label:?}")]
    TagCollision {
        name: String,
        label: String,
        first: String,
        second: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Text exposition error.
    #[error("encoding error: {0}")]
    Encode(#[source] prometheus::Error),
}

/// Result alias for metrics operations.
pub type Result<T> = std::result::Result<T, Error>;
