//! Transformation module.
//!
//! - Records: roster rows to export records
//! - JSONL: export record serialization
//! - Pipeline: load, combine, shape, write and upload

pub mod jsonl;
pub mod pipeline;
pub mod records;

pub use jsonl::{records_to_jsonl_string, write_jsonl, write_jsonl_to};
pub use pipeline::*;
pub use records::{build_records, format_dob, parse_dob};
