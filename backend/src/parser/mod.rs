//! Roster CSV loading and writing with encoding and delimiter auto-detection.
//!
//! Spreadsheet exports arrive as UTF-8, Latin-1 or Windows-1252 and with
//! `;`, `,`, tab or `|` separators. Values are trimmed; blank lines are skipped.

use std::fs;
use std::path::Path;

use crate::error::{RosterError, RosterResult};
use crate::roster::{Row, Table};

/// A parsed roster plus what was detected while reading it.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: Table,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes using the given encoding name.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> RosterResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            let (text, _, had_errors) = encoding_rs::ISO_8859_15.decode(bytes);
            if had_errors {
                return Err(RosterError::EncodingError(format!("invalid {} input", encoding)));
            }
            text.to_string()
        }
        "windows-1252" | "cp1252" => {
            let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
            if had_errors {
                return Err(RosterError::EncodingError(format!("invalid {} input", encoding)));
            }
            text.to_string()
        }
        _ => String::from_utf8_lossy(bytes).to_string(),
    };

    // Excel likes to prepend a BOM.
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Pick the separator occurring most often in the header line.
///
/// Ties keep the earlier candidate; a header without separators is `,`.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;
    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse roster text with an explicit delimiter.
pub fn parse_roster_str(content: &str, delimiter: char) -> RosterResult<Table> {
    if content.trim().is_empty() {
        return Err(RosterError::EmptyFile);
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(RosterError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row = Row::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string())),
        );
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

/// Parse roster bytes with auto-detection of encoding and delimiter.
pub fn parse_roster_bytes(bytes: &[u8]) -> RosterResult<ParseResult> {
    if bytes.is_empty() {
        return Err(RosterError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_roster_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Load a roster file with auto-detection.
pub fn load_roster<P: AsRef<Path>>(path: P) -> RosterResult<ParseResult> {
    let bytes = fs::read(path.as_ref())?;
    parse_roster_bytes(&bytes)
}

/// Write a table as comma-separated CSV, headers first.
pub fn write_roster_csv<P: AsRef<Path>>(table: &Table, path: P) -> RosterResult<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    wtr.write_record(table.headers())?;
    for row in table {
        wtr.write_record(table.headers().iter().map(|h| row.get(h).unwrap_or("")))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render a table as CSV text.
pub fn roster_to_csv_string(table: &Table) -> RosterResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(table.headers())?;
    for row in table {
        wtr.write_record(table.headers().iter().map(|h| row.get(h).unwrap_or("")))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| RosterError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| RosterError::EncodingError(e.to_string()))
}
