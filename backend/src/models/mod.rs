//! Domain models for the roster export pipeline.
//!
//! - [`ExportRecord`] - one exported student, as written to JSON Lines
//! - [`AdditionalDetails`] - nested details block of a record
//! - [`SpecialCharacter`] - sentinel flag for names with special characters

use serde::{Deserialize, Serialize};

/// Column holding the student's display name.
pub const COL_NAME: &str = "Student Name";
/// Column holding the student number.
pub const COL_NUMBER: &str = "Student Number";
/// Column holding the date of birth.
pub const COL_DOB: &str = "DoB";
/// Column holding the gender.
pub const COL_GENDER: &str = "Gender";
/// Column added by email assignment.
pub const COL_EMAIL: &str = "Email";

// =============================================================================
// Special Character Flag
// =============================================================================

/// Whether a student's name contains special characters.
///
/// Downstream consumers expect the literal strings `['yes']` and `['no']`,
/// not booleans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpecialCharacter {
    #[serde(rename = "['yes']")]
    Yes,
    #[serde(rename = "['no']")]
    No,
}

impl SpecialCharacter {
    /// Build the flag from a membership test.
    pub fn from_flag(has_special: bool) -> Self {
        if has_special {
            Self::Yes
        } else {
            Self::No
        }
    }
}

// =============================================================================
// Export Record
// =============================================================================

/// Nested details of an exported student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdditionalDetails {
    /// Date of birth as `YYYY-MM-DD`.
    pub dob: String,
    pub gender: String,
    pub special_character: SpecialCharacter,
}

/// One exported student.
///
/// Field names and nesting are part of the JSON Lines contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRecord {
    /// 0-based position of the row in the exported table.
    pub id: usize,
    pub student_number: String,
    /// Always holds exactly one entry.
    pub additional_details: Vec<AdditionalDetails>,
}

impl ExportRecord {
    pub fn new(id: usize, student_number: String, details: AdditionalDetails) -> Self {
        Self {
            id,
            student_number,
            additional_details: vec![details],
        }
    }
}
