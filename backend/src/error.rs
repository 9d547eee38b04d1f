//! Error types for the roster export pipeline.
//!
//! Each stage owns its error enum:
//!
//! - [`RosterError`] - roster CSV loading and writing
//! - [`RecordError`] - export record building
//! - [`DriveError`] - folder creation and file upload
//! - [`ExportError`] - top-level orchestration
//!
//! `From` conversions let `?` cross stage boundaries.

use thiserror::Error;

// =============================================================================
// Roster Errors
// =============================================================================

/// Errors while reading or writing a roster CSV.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Failed to read or write the file.
    #[error("Failed to access roster file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the file contents.
    #[error("Failed to decode roster: {0}")]
    EncodingError(String),

    /// Malformed CSV.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Empty file.
    #[error("Roster file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in roster")]
    NoHeaders,
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors while turning roster rows into export records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A date of birth is missing or cannot be formatted as `YYYY-MM-DD`.
    #[error("Malformed date for student '{student_number}' (row {row}), column '{column}': '{value}'")]
    MalformedDate {
        row: usize,
        student_number: String,
        column: String,
        value: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Failed to write records.
    #[error("Failed to write records: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Drive Errors
// =============================================================================

/// Errors from the remote storage collaborator.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Missing access token.
    #[error("Missing GOOGLE_DRIVE_ACCESS_TOKEN environment variable")]
    MissingToken,

    /// HTTP request could not be sent or read.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The API answered with a non-success status.
    #[error("Drive API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// The API answered without a usable `id`.
    #[error("Invalid Drive response: {0}")]
    InvalidResponse(String),

    /// Failed to read a local file.
    #[error("Local IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to walk the local folder.
    #[error("Failed to walk folder: {0}")]
    WalkError(#[from] walkdir::Error),
}

// =============================================================================
// Export Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Returned by [`crate::transform::pipeline::run_export`] and
/// [`crate::transform::pipeline::upload_output`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// Roster error.
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// Record building error.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Upload error.
    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    /// Some records do not match the export schema.
    #[error("{invalid} records failed validation, first: {first}")]
    Validation { invalid: usize, first: String },

    /// Nothing left to export.
    #[error("No students to export")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type for drive operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Result type for pipeline operations.
pub type ExportResult<T> = Result<T, ExportError>;
