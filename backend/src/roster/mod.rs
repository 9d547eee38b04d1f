//! In-memory roster tables.
//!
//! A [`Table`] is an immutable, ordered sequence of [`Row`]s plus its header
//! list. Every operation here returns a new table or borrows the input, so a
//! row's position is the only identity it has.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::models::{COL_GENDER, COL_NAME};

// =============================================================================
// Row
// =============================================================================

/// A single roster row: column name -> text value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Map::new();
        for (k, v) in pairs {
            map.insert(k.into(), Value::String(v.into()));
        }
        Self(map)
    }

    /// Text value of a column, if present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(|v| v.as_str())
    }

    /// Set a column, replacing any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), Value::String(value.into()));
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered rows sharing a header list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Text values of one column in row order. Missing cells are `None`.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.rows.iter().map(move |r| r.get(column))
    }

    /// New table with `column` set on every row from `values`.
    ///
    /// The header is appended if not already present.
    pub fn with_column(&self, column: &str, values: Vec<String>) -> Self {
        let mut headers = self.headers.clone();
        if !headers.iter().any(|h| h == column) {
            headers.push(column.to_string());
        }

        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut row = row.clone();
                row.set(column, value);
                row
            })
            .collect();

        Self { headers, rows }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Concatenate two tables: all rows of `a`, then all rows of `b`.
///
/// Headers are `a`'s followed by any of `b`'s not already present. Rows are
/// not deduplicated.
pub fn combine(a: &Table, b: &Table) -> Table {
    let mut headers = a.headers.clone();
    for h in &b.headers {
        if !headers.contains(h) {
            headers.push(h.clone());
        }
    }

    let mut rows = Vec::with_capacity(a.len() + b.len());
    rows.extend(a.rows.iter().cloned());
    rows.extend(b.rows.iter().cloned());

    Table { headers, rows }
}

/// Rows whose `Gender` equals `gender` exactly, lazily and in table order.
pub fn filter_by_gender<'a>(table: &'a Table, gender: &'a str) -> impl Iterator<Item = &'a Row> + 'a {
    table
        .rows
        .iter()
        .filter(move |row| row.get(COL_GENDER) == Some(gender))
}

/// Same as [`filter_by_gender`], collected into a new table.
pub fn gender_table(table: &Table, gender: &str) -> Table {
    Table {
        headers: table.headers.clone(),
        rows: filter_by_gender(table, gender).cloned().collect(),
    }
}

/// Randomly reorder the rows. A fixed `seed` always yields the same order.
pub fn shuffle(table: &Table, seed: Option<u64>) -> Table {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut rows = table.rows.clone();
    rows.shuffle(&mut rng);

    Table {
        headers: table.headers.clone(),
        rows,
    }
}

/// Whether a name has anything besides ASCII letters, whitespace and commas.
pub fn has_special_characters(name: &str) -> bool {
    name.chars()
        .any(|c| !(c.is_ascii_alphabetic() || c.is_whitespace() || c == ','))
}

/// All distinct student names containing special characters.
pub fn names_with_special_characters(table: &Table) -> BTreeSet<String> {
    table
        .column(COL_NAME)
        .flatten()
        .filter(|name| has_special_characters(name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn student(name: &str, number: &str, dob: &str, gender: &str) -> Row {
        Row::from_pairs([
            ("Student Name", name),
            ("Student Number", number),
            ("DoB", dob),
            ("Gender", gender),
        ])
    }

    pub(crate) fn headers() -> Vec<String> {
        ["Student Name", "Student Number", "DoB", "Gender"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn roster_a() -> Table {
        Table::new(
            headers(),
            vec![
                student("Jane Smith", "S1", "2005-01-10", "Female"),
                student("John Doe", "S2", "2005-03-22", "Male"),
                student("Ana Lima", "S3", "2004-11-02", "Female"),
            ],
        )
    }

    fn roster_b() -> Table {
        Table::new(
            headers(),
            vec![
                student("Mark Twain", "S4", "2005-06-30", "Male"),
                student("O'Brien, Anne-Marie", "S5", "2005-09-09", "Female"),
            ],
        )
    }

    #[test]
    fn test_combine_preserves_count_and_order() {
        let combined = combine(&roster_a(), &roster_b());

        assert_eq!(combined.len(), 5);
        let numbers: Vec<_> = combined.column("Student Number").flatten().collect();
        assert_eq!(numbers, vec!["S1", "S2", "S3", "S4", "S5"]);
    }

    #[test]
    fn test_combine_does_not_dedupe() {
        let combined = combine(&roster_a(), &roster_a());
        assert_eq!(combined.len(), 6);
        assert_eq!(combined.rows()[0], combined.rows()[3]);
    }

    #[test]
    fn test_combine_unions_headers() {
        let b = Table::new(
            vec!["Student Name".into(), "Class".into()],
            vec![Row::from_pairs([("Student Name", "Zed"), ("Class", "4B")])],
        );
        let combined = combine(&roster_a(), &b);

        assert_eq!(
            combined.headers(),
            &["Student Name", "Student Number", "DoB", "Gender", "Class"]
        );
        assert_eq!(combined.rows()[3].get("Gender"), None);
        assert_eq!(combined.rows()[0].get("Class"), None);
    }

    #[test]
    fn test_combine_with_empty() {
        let empty = Table::new(headers(), vec![]);
        assert_eq!(combine(&empty, &roster_b()), roster_b());
    }

    #[test]
    fn test_filter_by_gender_keeps_relative_order() {
        let combined = combine(&roster_a(), &roster_b());
        let female: Vec<_> = filter_by_gender(&combined, "Female")
            .filter_map(|r| r.get("Student Number"))
            .collect();

        let expected = combined
            .column("Gender")
            .filter(|g| *g == Some("Female"))
            .count();
        assert_eq!(female.len(), expected);
        assert_eq!(female, vec!["S1", "S3", "S5"]);
    }

    #[test]
    fn test_filter_is_exact_match() {
        let table = roster_a();
        assert_eq!(filter_by_gender(&table, "female").count(), 0);
        assert_eq!(gender_table(&table, "Male").len(), 1);
    }

    #[test]
    fn test_shuffle_is_seeded_permutation() {
        let combined = combine(&roster_a(), &roster_b());
        let first = shuffle(&combined, Some(42));
        let second = shuffle(&combined, Some(42));

        assert_eq!(first, second);
        assert_eq!(first.len(), combined.len());
        let mut before: Vec<_> = combined.column("Student Number").flatten().collect();
        let mut after: Vec<_> = first.column("Student Number").flatten().collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_special_names() {
        let combined = combine(&roster_a(), &roster_b());
        let special = names_with_special_characters(&combined);

        assert_eq!(special.len(), 1);
        assert!(special.contains("O'Brien, Anne-Marie"));
        assert!(!has_special_characters("Jane Smith"));
        assert!(has_special_characters("José Núñez"));
    }

    #[test]
    fn test_with_column_appends_header() {
        let table = roster_a().with_column("Email", vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(table.headers().last().map(String::as_str), Some("Email"));
        assert_eq!(table.rows()[2].get("Email"), Some("c"));
    }
}
