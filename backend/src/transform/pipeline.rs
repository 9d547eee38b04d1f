//! High-level pipeline API for roster export.
//!
//! Chains every step:
//!
//! ```text
//! roster A ─┐
//!           ├─▶ combine ─▶ emails ─▶ (gender) ─▶ shuffle ─▶ records ─▶ validate ─▶ students.jsonl
//! roster B ─┘                                                                    └▶ roster.csv
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use codelab::transform::pipeline::{run_export, upload_output, ExportOptions};
//! use codelab::drive::DriveClient;
//!
//! let summary = run_export(Path::new("a.csv"), Path::new("b.csv"), Path::new("out"), &ExportOptions::default())?;
//! let client = DriveClient::from_env()?;
//! upload_output(Path::new("out"), &client, "Class 4B", None).await?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::jsonl::write_jsonl;
use super::records::build_records;
use crate::drive::{upload_all, StorageUploader, UploadedFile};
use crate::email::assign_emails;
use crate::error::{ExportError, ExportResult, RecordError};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::ExportRecord;
use crate::parser::{load_roster, write_roster_csv};
use crate::roster::{combine, gender_table, names_with_special_characters, shuffle, Table};
use crate::validation::validate_export_record;

/// Options for the export pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Keep only rows with this exact gender
    pub gender: Option<String>,

    /// Shuffle seed; `None` uses OS entropy
    pub seed: Option<u64>,

    /// Skip schema validation of records
    pub skip_validation: bool,

    /// File name of the JSON Lines output
    pub jsonl_name: String,

    /// File name of the roster CSV output
    pub csv_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            gender: None,
            seed: None,
            skip_validation: false,
            jsonl_name: "students.jsonl".to_string(),
            csv_name: "roster.csv".to_string(),
        }
    }
}

/// Shaped data, before anything is written.
#[derive(Debug, Clone)]
pub struct PreparedExport {
    /// Combined roster with emails, filtered and shuffled
    pub table: Table,
    /// One record per row of `table`, same order
    pub records: Vec<ExportRecord>,
    /// Rows after combining, before filtering
    pub combined_rows: usize,
    pub special_names: usize,
}

/// Result of [`run_export`]
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub combined_rows: usize,
    pub exported: usize,
    pub special_names: usize,
    pub jsonl_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Result of [`upload_output`]
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub folder_id: String,
    pub files: Vec<UploadedFile>,
}

/// Shape two loaded rosters into export records.
pub fn prepare_export(a: &Table, b: &Table, options: &ExportOptions) -> ExportResult<PreparedExport> {
    let combined = combine(a, b);
    log_success(format!(
        "Combined {} + {} rows into {}",
        a.len(),
        b.len(),
        combined.len()
    ));

    if combined.is_empty() {
        return Err(ExportError::EmptyInput);
    }

    let mut table = assign_emails(&combined);
    log_success("Generated unique emails");

    if let Some(ref gender) = options.gender {
        table = gender_table(&table, gender);
        log_info_indent(format!("{} rows with gender '{}'", table.len(), gender), 1);
        if table.is_empty() {
            log_warning(format!("No students with gender '{}'", gender));
        }
    }

    let table = shuffle(&table, options.seed);

    let special = names_with_special_characters(&table);
    log_info_indent(format!("{} names with special characters", special.len()), 1);

    let records = build_records(&table, &special)?;
    log_success(format!("Built {} records", records.len()));

    if !options.skip_validation {
        validate_records(&records)?;
        log_success("All records valid");
    }

    Ok(PreparedExport {
        table,
        records,
        combined_rows: combined.len(),
        special_names: special.len(),
    })
}

fn validate_records(records: &[ExportRecord]) -> ExportResult<()> {
    let mut invalid = 0;
    let mut first = None;

    for record in records {
        let value = serde_json::to_value(record).map_err(RecordError::from)?;
        if let Err(errors) = validate_export_record(&value) {
            invalid += 1;
            if first.is_none() {
                first = Some(format!("record {}: {}", record.id, errors.join("; ")));
            }
        }
    }

    match first {
        None => Ok(()),
        Some(first) => Err(ExportError::Validation { invalid, first }),
    }
}

/// Load two roster files, shape them, and write both outputs into `output_dir`.
pub fn run_export(
    roster_a: &Path,
    roster_b: &Path,
    output_dir: &Path,
    options: &ExportOptions,
) -> ExportResult<ExportSummary> {
    log_info("📖 Reading rosters...");
    let a = load_roster(roster_a)?;
    log_success(format!(
        "{}: {} rows ({}, '{}')",
        roster_a.display(),
        a.table.len(),
        a.encoding,
        format_delimiter(a.delimiter)
    ));
    let b = load_roster(roster_b)?;
    log_success(format!(
        "{}: {} rows ({}, '{}')",
        roster_b.display(),
        b.table.len(),
        b.encoding,
        format_delimiter(b.delimiter)
    ));

    let prepared = prepare_export(&a.table, &b.table, options)?;

    let jsonl_path = output_dir.join(&options.jsonl_name);
    let csv_path = output_dir.join(&options.csv_name);
    write_jsonl(&prepared.records, &jsonl_path)?;
    write_roster_csv(&prepared.table, &csv_path)?;
    log_success(format!("Wrote {}", jsonl_path.display()));
    log_success(format!("Wrote {}", csv_path.display()));

    Ok(ExportSummary {
        combined_rows: prepared.combined_rows,
        exported: prepared.records.len(),
        special_names: prepared.special_names,
        jsonl_path,
        csv_path,
    })
}

/// Create `folder_name` remotely and upload everything in `output_dir` into it.
pub async fn upload_output<U>(
    output_dir: &Path,
    uploader: &U,
    folder_name: &str,
    parent_id: Option<&str>,
) -> ExportResult<UploadSummary>
where
    U: StorageUploader + ?Sized,
{
    log_info(format!("📤 Creating folder '{}'...", folder_name));
    let folder_id = uploader.create_folder(folder_name, parent_id).await?;
    log_success(format!("Folder id: {}", folder_id));

    let files = upload_all(output_dir, uploader, Some(&folder_id)).await?;

    Ok(UploadSummary { folder_id, files })
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
