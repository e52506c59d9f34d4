//! Upload outcomes - one resolved status per candidate task

use serde::{Serialize, Serializer};
use std::fmt;

/// Resolved status of one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// A new record was written
    Created,
    /// A record with the same title already exists
    SkippedDuplicate,
    /// The title is a generic placeholder and carries no identity
    SkippedFallbackName,
    /// The existence check or the write failed
    Failed(String),
}

impl UploadStatus {
    /// Whether the candidate ended up as a record in the store
    pub fn is_created(&self) -> bool {
        matches!(self, UploadStatus::Created)
    }

    /// Whether this is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, UploadStatus::Failed(_))
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Created => f.write_str("created"),
            UploadStatus::SkippedDuplicate => f.write_str("skipped (already exists)"),
            UploadStatus::SkippedFallbackName => f.write_str("skipped (fallback name)"),
            UploadStatus::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

impl Serialize for UploadStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One entry of the result log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// Task title (`(unnamed)` when the candidate had none)
    pub task: String,

    /// Resolved status
    pub status: UploadStatus,
}

impl UploadOutcome {
    /// Create an outcome, substituting a placeholder for an empty title
    pub fn new(task: impl Into<String>, status: UploadStatus) -> Self {
        let task = task.into();
        let task = if task.trim().is_empty() {
            "(unnamed)".to_string()
        } else {
            task
        };
        Self { task, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serialises_as_report_text() {
        let outcome = UploadOutcome::new("Task", UploadStatus::SkippedFallbackName);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"task": "Task", "status": "skipped (fallback name)"})
        );
    }

    #[test]
    fn test_failure_carries_reason() {
        let status = UploadStatus::Failed("validation_error".to_string());
        assert_eq!(status.to_string(), "failed (validation_error)");
        assert!(status.is_failure());
    }

    #[test]
    fn test_empty_title_gets_placeholder() {
        let outcome = UploadOutcome::new("  ", UploadStatus::SkippedFallbackName);
        assert_eq!(outcome.task, "(unnamed)");
    }
}
