//! # Codelab - classroom roster export
//!
//! Merges two student rosters, gives every student a unique email address,
//! shapes the rows into JSON Lines export records and uploads the output
//! folder to Google Drive.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Roster CSVs │────▶│   Combine   │────▶│  Records    │────▶│ Drive upload│
//! │  (A and B)  │     │ + emails    │     │  (JSONL)    │     │  (folder)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use codelab::{make_unique, synthesize_email};
//!
//! let emails: Vec<String> = ["Jane Smith", "John Smith", "Madonna"]
//!     .iter()
//!     .map(|name| synthesize_email(name))
//!     .collect();
//!
//! assert_eq!(
//!     make_unique(&emails),
//!     vec!["jsmith@gmail.com", "jsmith1@gmail.com", "mmadonna@gmail.com"]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Export record and column names
//! - [`roster`] - Tables, combining, gender filter, shuffling
//! - [`parser`] - Roster CSV loading with auto-detection
//! - [`email`] - Email synthesis and collision suffixing
//! - [`transform`] - Record building, JSONL output, pipeline
//! - [`validation`] - Export record schema validation
//! - [`drive`] - Upload capability, Google Drive client, folder upload
//! - [`logs`] - Progress log broadcaster

// Core modules
pub mod error;
pub mod models;

// Tables
pub mod parser;
pub mod roster;

// Shaping
pub mod email;
pub mod transform;
pub mod validation;

// Remote storage
pub mod drive;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{DriveError, ExportError, RecordError, RosterError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AdditionalDetails, ExportRecord, SpecialCharacter};

// =============================================================================
// Re-exports - Tables
// =============================================================================

pub use roster::{
    combine,
    filter_by_gender,
    gender_table,
    names_with_special_characters,
    shuffle,
    Row,
    Table,
};

pub use parser::{load_roster, parse_roster_bytes, write_roster_csv, ParseResult};

// =============================================================================
// Re-exports - Emails
// =============================================================================

pub use email::{assign_emails, make_unique, synthesize_email};

// =============================================================================
// Re-exports - Records & Pipeline
// =============================================================================

pub use transform::{
    build_records,
    prepare_export,
    run_export,
    upload_output,
    write_jsonl,
    ExportOptions,
    ExportSummary,
    PreparedExport,
    UploadSummary,
};

pub use validation::{is_valid_export_record, validate_export_record};

// =============================================================================
// Re-exports - Drive
// =============================================================================

pub use drive::{upload_all, DriveClient, DriveConfig, StorageUploader, UploadedFile};
