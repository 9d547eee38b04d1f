//! JSON Lines serialization of export records.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::RecordResult;
use crate::models::ExportRecord;

/// Serialize records to JSON Lines into any writer.
pub fn write_jsonl_to<W: Write>(records: &[ExportRecord], mut writer: W) -> RecordResult<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write records to `path`, one compact JSON object per line.
///
/// Missing parent directories are created.
pub fn write_jsonl<P: AsRef<Path>>(records: &[ExportRecord], path: P) -> RecordResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    write_jsonl_to(records, BufWriter::new(file))
}

/// Render records as a JSON Lines string.
pub fn records_to_jsonl_string(records: &[ExportRecord]) -> RecordResult<String> {
    let mut buf = Vec::new();
    write_jsonl_to(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdditionalDetails, SpecialCharacter};
    use tempfile::tempdir;

    fn record(id: usize, special: bool) -> ExportRecord {
        ExportRecord::new(
            id,
            format!("S{}", id),
            AdditionalDetails {
                dob: "2005-01-10".into(),
                gender: "Female".into(),
                special_character: SpecialCharacter::from_flag(special),
            },
        )
    }

    #[test]
    fn test_one_record_per_line() {
        let text = records_to_jsonl_string(&[record(0, false), record(1, true)]).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        assert_eq!(
            lines[0],
            r#"{"id":0,"student_number":"S0","additional_details":[{"dob":"2005-01-10","gender":"Female","special_character":"['no']"}]}"#
        );
        assert!(lines[1].contains(r#""special_character":"['yes']""#));
    }

    #[test]
    fn test_empty_batch_writes_empty_file() {
        assert_eq!(records_to_jsonl_string(&[]).unwrap(), "");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("students.jsonl");

        write_jsonl(&[record(0, false)], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: ExportRecord = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(parsed, record(0, false));
    }
}
