//! Gatekeeper configuration

use crate::GatekeeperError;
use serde::{Deserialize, Serialize};

/// Names that never identify a real task
pub const DEFAULT_FALLBACK_NAMES: &[&str] = &["ToDo", "Task", "Untitled", "(unnamed task)"];

/// Default Jaro-Winkler similarity needed to coerce an option value
pub const DEFAULT_COERCE_THRESHOLD: f64 = 0.85;

/// What to do with a select, status or multi-select value outside the allowed set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuePolicy {
    /// Fail the candidate with a schema violation
    #[default]
    Reject,

    /// Replace the value with the closest allowed one, if close enough
    Coerce,
}

/// Configuration for schema conformance checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Policy for invalid option values
    pub value_policy: ValuePolicy,

    /// Minimum similarity (0.0-1.0) for [`ValuePolicy::Coerce`]
    pub coerce_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            value_policy: ValuePolicy::Reject,
            coerce_threshold: DEFAULT_COERCE_THRESHOLD,
        }
    }
}

impl ValidationConfig {
    /// Configuration that coerces near-miss option values
    pub fn coercing() -> Self {
        Self {
            value_policy: ValuePolicy::Coerce,
            ..Self::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), GatekeeperError> {
        if !(self.coerce_threshold > 0.0 && self.coerce_threshold <= 1.0) {
            return Err(GatekeeperError::Config(format!(
                "coerce_threshold must be in (0.0, 1.0], got {}",
                self.coerce_threshold
            )));
        }
        Ok(())
    }
}

/// Configuration for the deduplication resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Block-listed titles, compared trimmed and case-insensitively
    pub fallback_names: Vec<String>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            fallback_names: DEFAULT_FALLBACK_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
