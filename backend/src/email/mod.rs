//! Email address synthesis from student names.
//!
//! Candidates are `<first initial><last token>@gmail.com`, lowercased and
//! reduced to ASCII letters. [`make_unique`] then suffixes collisions with a
//! per-candidate counter.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::models::{COL_EMAIL, COL_NAME};
use crate::roster::Table;

/// Mail domain for every generated address.
pub const EMAIL_DOMAIN: &str = "gmail.com";

static NAME_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,]+").expect("valid regex"));

/// Derive a candidate email from a display name.
///
/// Never fails: a name without letters yields `@gmail.com`.
pub fn synthesize_email(name: &str) -> String {
    let mut tokens = NAME_DELIMITER.split(name).filter(|t| !t.is_empty());

    let local: String = match tokens.next() {
        Some(first) => {
            let last = tokens.last().unwrap_or(first);
            first
                .chars()
                .take(1)
                .chain(last.chars())
                .flat_map(char::to_lowercase)
                .filter(char::is_ascii_lowercase)
                .collect()
        }
        None => String::new(),
    };

    format!("{}@{}", local, EMAIL_DOMAIN)
}

/// Resolve collisions in an ordered batch of emails.
///
/// The n-th repeat of a candidate becomes `<localpart>n@gmail.com`. Counters
/// are keyed by the original candidate, so a genuine input that equals an
/// already emitted suffixed address is not detected as a collision.
pub fn make_unique<S: AsRef<str>>(emails: &[S]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(emails.len());

    for email in emails {
        let email = email.as_ref();
        match seen.entry(email) {
            Entry::Vacant(slot) => {
                slot.insert(0);
                unique.push(email.to_string());
            }
            Entry::Occupied(mut slot) => {
                let count = slot.get_mut();
                *count += 1;
                let local = email.split('@').next().unwrap_or("");
                unique.push(format!("{}{}@{}", local, count, EMAIL_DOMAIN));
            }
        }
    }

    unique
}

/// Add (or replace) the `Email` column from each row's `Student Name`.
pub fn assign_emails(table: &Table) -> Table {
    let candidates: Vec<String> = table
        .column(COL_NAME)
        .map(|name| synthesize_email(name.unwrap_or("")))
        .collect();

    table.with_column(COL_EMAIL, make_unique(&candidates))
}
