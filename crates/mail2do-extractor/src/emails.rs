//! Email input file (`emails.json`)
//!
//! Accepts either an object keyed by uid, in file order, or an array of
//! records carrying their own `uid`.

use crate::error::ExtractorError;
use mail2do_domain::EmailRecord;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read and parse an email file
pub fn load_emails(path: &Path) -> Result<Vec<EmailRecord>, ExtractorError> {
    let contents = fs::read_to_string(path)?;
    parse_emails(&contents)
}

/// Parse email file contents
pub fn parse_emails(contents: &str) -> Result<Vec<EmailRecord>, ExtractorError> {
    match serde_json::from_str::<Value>(contents)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(uid, mut record)| -> Result<EmailRecord, ExtractorError> {
                // The key is authoritative
                if let Some(obj) = record.as_object_mut() {
                    obj.insert("uid".to_string(), Value::String(uid));
                }
                Ok(serde_json::from_value(record)?)
            })
            .collect(),
        Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
        _ => Err(ExtractorError::JsonParse(
            "Expected an object keyed by uid or an array of emails".to_string(),
        )),
    }
}
