//! Typed errors for the café pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match on
//! what went wrong. Extraction and classification never fail; only fetching
//! and the export boundary do.

use thiserror::Error;

/// Errors raised by a [`PageFetcher`](crate::traits::fetcher::PageFetcher).
///
/// All variants are recoverable from the collector's point of view: the
/// query is retried or marked errored, never the whole run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Page did not finish loading in time
    #[error("timeout loading: {target}")]
    Timeout { target: String },

    /// Navigation or frame switch failed
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Requested handle or fixture does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading a saved state blob failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State blob was not valid JSON
    #[error("invalid state blob: {0}")]
    InvalidState(#[from] serde_json::Error),
}

/// A sensory column that left the [1, 10] bound after transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundViolation {
    pub column: String,
    pub rows: usize,
}

impl std::fmt::Display for BoundViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} rows outside 1-10", self.column, self.rows)
    }
}

/// Errors at the tabular import/export boundary.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from an input table
    #[error("table {table} is missing required column {column}")]
    MissingColumn { table: String, column: String },

    /// A cell could not be coerced to its declared column type
    #[error("table {table}, row {row}, column {column}: cannot read {value:?} as {expected}")]
    InvalidValue {
        table: String,
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    /// Batch rejected because derived scores are out of bound
    #[error("data quality check failed: {}", format_violations(.0))]
    DataQuality(Vec<BoundViolation>),
}

fn format_violations(violations: &[BoundViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level error for callers that drive a full run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// Configuration value could not be parsed
    #[error("config error: {key}={value:?} ({reason})")]
    Config {
        key: String,
        value: String,
        reason: String,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;
