//! JSON Schema validation for exported student records.
//!
//! The schema is embedded at compile time from
//! `schemas/student-export-record.json` and pins what downstream consumers
//! rely on: field names, nesting, the `YYYY-MM-DD` date pattern and the
//! `['yes']` / `['no']` sentinel values.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use codelab::validation::is_valid_export_record;
//!
//! let record = json!({
//!     "id": 0,
//!     "student_number": "S1",
//!     "additional_details": [
//!         { "dob": "2005-01-10", "gender": "Female", "special_character": "['no']" }
//!     ]
//! });
//! assert!(is_valid_export_record(&record));
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

static EXPORT_RECORD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/student-export-record.json"))
        .expect("Invalid embedded schema")
});

/// Compiled once, shared by every record of every batch.
static EXPORT_RECORD_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    jsonschema::draft7::new(&EXPORT_RECORD_SCHEMA).expect("Invalid embedded schema")
});

fn collect_errors(validator: &Validator, data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one serialized export record.
pub fn validate_export_record(data: &Value) -> Result<(), Vec<String>> {
    collect_errors(&EXPORT_RECORD_VALIDATOR, data)
}

/// Quick check of one serialized export record.
pub fn is_valid_export_record(data: &Value) -> bool {
    EXPORT_RECORD_VALIDATOR.is_valid(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "id": 3,
            "student_number": "S42",
            "additional_details": [
                { "dob": "2005-01-10", "gender": "Male", "special_character": "['yes']" }
            ]
        })
    }

    #[test]
    fn test_valid_record() {
        assert!(is_valid_export_record(&valid()));
        assert!(validate_export_record(&valid()).is_ok());
    }

    #[test]
    fn test_boolean_flag_rejected() {
        let mut record = valid();
        record["additional_details"][0]["special_character"] = json!(true);
        assert!(!is_valid_export_record(&record));
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut record = valid();
        record["additional_details"][0]["dob"] = json!("10/01/2005");
        assert!(!is_valid_export_record(&record));
    }

    #[test]
    fn test_negative_id_rejected() {
        let mut record = valid();
        record["id"] = json!(-1);
        assert!(!is_valid_export_record(&record));
    }

    #[test]
    fn test_batch_against_shared_validator() {
        for id in 0..50 {
            let mut record = valid();
            record["id"] = json!(id);
            assert!(validate_export_record(&record).is_ok());
        }

        let mut bad = valid();
        bad["student_number"] = json!(42);
        assert!(validate_export_record(&bad).is_err());
        assert!(validate_export_record(&valid()).is_ok());
    }

    #[test]
    fn test_missing_fields_reported() {
        let errors = validate_export_record(&json!({ "id": 0 })).unwrap_err();
        assert!(!errors.is_empty());
    }
}
