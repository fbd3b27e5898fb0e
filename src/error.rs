//! Error types for Helpy
//!
//! This module defines the error types used throughout the assistant,
//! using `thiserror` for ergonomic error handling. Resolution outcomes that
//! are expected in normal conversation (no operator, ambiguous operator) are
//! modelled as values in [`crate::transit::ResolutionResult`]; the variants
//! here cover the failures that propagate through `?`.

use thiserror::Error;

/// Main error type for Helpy operations
#[derive(Error, Debug)]
pub enum HelpyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// NLU provider errors (API calls, malformed completions)
    #[error("Provider error: {0}")]
    Provider(String),

    /// The real-time feed could not be reached or returned an error
    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    /// No operator serves the requested line at the requested stop
    #[error("No operator found for line {line} at stop {stop}")]
    NoOperatorFound {
        /// Stop code that was queried
        stop: String,
        /// Line that was queried
        line: String,
    },

    /// Arguments extracted by the oracle failed validation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A stop code is unknown to the static reference tables
    #[error("Not found: {0}")]
    NotFound(String),

    /// Static reference data could not be loaded
    #[error("Reference data error: {0}")]
    ReferenceData(String),

    /// Messaging transport errors (outbound send, webhook payloads)
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for Helpy operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`HelpyError`] where a specific kind matters.
pub type Result<T> = anyhow::Result<T>;
