//! Parse LLM output into a candidate task

use crate::error::ExtractorError;
use mail2do_domain::{CandidateTask, FieldValue, SOURCE_UID_KEY};
use serde_json::{Map, Value};
use tracing::warn;

/// Parse a model reply into a candidate for the email `uid`
///
/// The reply must be one JSON value. An object is the task; for an array
/// the first object is kept and the rest dropped.
pub fn parse_llm_response(uid: &str, response: &str) -> Result<CandidateTask, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::ExtractionFailed(format!("JSON parse error: {}", e)))?;

    let object = match json {
        Value::Object(map) => map,
        Value::Array(items) => {
            let total = items.len();
            let first = items.into_iter().next().ok_or_else(|| {
                ExtractorError::ExtractionFailed("Model returned an empty array".to_string())
            })?;
            let Value::Object(map) = first else {
                return Err(ExtractorError::ExtractionFailed(
                    "Expected an array of JSON objects".to_string(),
                ));
            };
            if total > 1 {
                warn!(
                    "Email {}: model returned {} items, keeping the first",
                    uid, total
                );
            }
            map
        }
        other => {
            return Err(ExtractorError::ExtractionFailed(format!(
                "Expected a JSON object, got {}",
                kind_of(&other)
            )))
        }
    };

    candidate_from_object(uid, object)
}

fn candidate_from_object(uid: &str, object: Map<String, Value>) -> Result<CandidateTask, ExtractorError> {
    let mut task = CandidateTask::new(uid);
    for (name, value) in object {
        if name == SOURCE_UID_KEY {
            continue;
        }
        let value = FieldValue::try_from(value)
            .map_err(|e| ExtractorError::ExtractionFailed(format!("Field '{}': {}", name, e)))?;
        task.set(name, value);
    }
    Ok(task)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Extract JSON from response, handling one surrounding markdown code block
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if let Some(fenced) = trimmed.strip_prefix("```") {
        // Skip the opening line (```json or ```) and the closing fence
        let (_, rest) = fenced.split_once('\n').ok_or_else(|| {
            ExtractorError::ExtractionFailed("Empty code block".to_string())
        })?;
        let inner = rest.trim_end().strip_suffix("```").ok_or_else(|| {
            ExtractorError::ExtractionFailed("Unterminated code block".to_string())
        })?;
        Ok(inner.trim())
    } else {
        Ok(trimmed)
    }
}
