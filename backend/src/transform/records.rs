//! Turn roster rows into export records.
//!
//! # Output Format
//!
//! ```text
//! {"id":0,"student_number":"S1","additional_details":[{"dob":"2005-01-10","gender":"Female","special_character":"['no']"}]}
//! ```
//!
//! Ids are the 0-based row positions, so callers shuffle or filter *before*
//! building.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::error::{RecordError, RecordResult};
use crate::models::{
    AdditionalDetails, ExportRecord, SpecialCharacter, COL_DOB, COL_GENDER, COL_NAME, COL_NUMBER,
};
use crate::roster::Row;

/// Accepted date-only layouts, tried in order. Day-first wins over month-first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Accepted timestamp layouts; the time part is dropped.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Year first (`2005-03-09...`) or day first with a trailing year (`09/03/2005`).
/// chrono's `%Y` also takes one or two digits, so short years are rejected here.
static FOUR_DIGIT_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{4}[-/]|\d{1,2}[-/.]\d{1,2}[-/.]\d{4}$)").expect("valid regex")
});

/// Parse a date of birth cell.
pub fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !FOUR_DIGIT_YEAR.is_match(raw) {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Format a date of birth cell as `YYYY-MM-DD`.
///
/// `row` and `student_number` are only used for the error.
pub fn format_dob(row: usize, student_number: &str, raw: Option<&str>) -> RecordResult<String> {
    let value = raw.unwrap_or("");
    parse_dob(value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| RecordError::MalformedDate {
            row,
            student_number: student_number.to_string(),
            column: COL_DOB.to_string(),
            value: value.to_string(),
        })
}

/// Build one record per row, in order.
///
/// The flag is `['yes']` when the row's name is in `special_names`. The first
/// malformed date aborts the whole batch.
pub fn build_records<'a, I>(rows: I, special_names: &BTreeSet<String>) -> RecordResult<Vec<ExportRecord>>
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .enumerate()
        .map(|(id, row)| build_record(id, row, special_names))
        .collect()
}

fn build_record(id: usize, row: &Row, special_names: &BTreeSet<String>) -> RecordResult<ExportRecord> {
    let name = row.get(COL_NAME).unwrap_or("");
    let has_special = special_names.contains(name);
    let student_number = row.get(COL_NUMBER).unwrap_or("");

    let details = AdditionalDetails {
        dob: format_dob(id, student_number, row.get(COL_DOB))?,
        gender: row.get(COL_GENDER).unwrap_or("").to_string(),
        special_character: SpecialCharacter::from_flag(has_special),
    };

    Ok(ExportRecord::new(id, student_number.to_string(), details))
}
