//! Error types for the autoclean pipeline.
//!
//! One enum per concern:
//!
//! - [`LinkError`] - shareable link could not be resolved
//! - [`CsvError`] - CSV decoding, parsing and writing errors
//! - [`LoadError`] - download errors
//! - [`ImputeError`] - missing-value resolution errors
//! - [`ConfigError`] - settings and strategy file errors
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::models::{ShapeError, Strategy};

// =============================================================================
// Link Errors
// =============================================================================

/// Errors while turning a shareable link into a download URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No file identifier in the input.
    #[error("No file identifier found in link: '{0}'")]
    NoIdentifier(String),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors during CSV decoding, parsing and serialization.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Nothing to parse.
    #[error("CSV file is empty")]
    Empty,

    /// Header row missing or blank.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// A data row has more fields than the header.
    #[error("Line {line}: expected {expected} fields, found {found}")]
    Ragged {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Delimiter is not a single ASCII character.
    #[error("Invalid delimiter '{0}': must be a single ASCII character")]
    InvalidDelimiter(char),

    /// Underlying reader or writer error.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to produce CSV output.
    #[error("Failed to write CSV: {0}")]
    Write(String),

    /// Columns of unequal length.
    #[error("{0}")]
    Shape(#[from] ShapeError),

    /// Failed to read a local file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while downloading and loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Non-success status code.
    #[error("Download failed with HTTP {0}")]
    Status(u16),

    /// Request exceeded the configured timeout.
    #[error("Download timed out after {0} seconds")]
    Timeout(u64),

    /// The server answered with something that is not CSV (typically an HTML page).
    #[error("Downloaded content is not CSV ({0})")]
    NotCsv(String),

    /// Bytes arrived but could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),
}

// =============================================================================
// Imputation Errors
// =============================================================================

/// Errors from the missing-value resolution engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImputeError {
    /// Mean or median requested on a column with no observed values.
    #[error("Cannot impute column '{column}' with {strategy}: it has no non-missing values")]
    NothingToImpute { column: String, strategy: Strategy },

    /// Provider has no answer for this column.
    #[error("No strategy given for column '{0}'")]
    NoStrategy(String),

    /// Provider failed (closed input, I/O error).
    #[error("Strategy provider failed: {0}")]
    Provider(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading settings or strategy presets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// Unknown strategy name.
    #[error("Unknown strategy '{0}' (expected mean, median or drop)")]
    UnknownStrategy(String),

    /// `COL=STRATEGY` flag without the `=`.
    #[error("Invalid strategy assignment '{0}' (expected COLUMN=STRATEGY)")]
    InvalidAssignment(String),

    /// IO error.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::clean_link`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Link could not be resolved.
    #[error("{0}")]
    Link(#[from] LinkError),

    /// Download or parse failed.
    #[error("Failed to load dataset: {0}")]
    Load(#[from] LoadError),

    /// Missing-value resolution failed.
    #[error("{0}")]
    Impute(#[from] ImputeError),

    /// Serialization of the cleaned dataset failed.
    #[error("{0}")]
    Csv(#[from] CsvError),

    /// Settings or presets are invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket or serve failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for imputation operations.
pub type ImputeResult<T> = Result<T, ImputeError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
