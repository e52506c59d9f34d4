//! Configuration for the Extractor

use mail2do_gatekeeper::{ValidationConfig, ValuePolicy, DEFAULT_COERCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Instruction template file
    pub prompt_path: PathBuf,

    /// Processed-set file (one uid per line)
    pub processed_path: PathBuf,

    /// Field that receives the processing date
    pub date_added_field: String,

    /// Policy for option values outside the allowed set
    pub value_policy: ValuePolicy,

    /// Minimum similarity for the coerce policy
    pub coerce_threshold: f64,

    /// Pause between model calls (milliseconds)
    pub request_delay_ms: u64,
}

impl ExtractorConfig {
    /// Pause between model calls as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Schema gate settings
    pub fn validation(&self) -> ValidationConfig {
        ValidationConfig {
            value_policy: self.value_policy,
            coerce_threshold: self.coerce_threshold,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.date_added_field.trim().is_empty() {
            return Err("date_added_field must not be empty".to_string());
        }
        if self.processed_path.as_os_str().is_empty() {
            return Err("processed_path must not be empty".to_string());
        }
        self.validation().validate().map_err(|e| e.to_string())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            prompt_path: PathBuf::from("prompt.txt"),
            processed_path: PathBuf::from("processed_emails.txt"),
            date_added_field: "Date Added".to_string(),
            value_policy: ValuePolicy::Reject,
            coerce_threshold: DEFAULT_COERCE_THRESHOLD,
            request_delay_ms: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_empty_date_field_rejected() {
        let config = ExtractorConfig {
            date_added_field: " ".to_string(),
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_threshold_rejected() {
        let config = ExtractorConfig {
            coerce_threshold: 2.0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("value_policy = \"coerce\"\n").unwrap();
        assert_eq!(config.value_policy, ValuePolicy::Coerce);
        assert_eq!(config.date_added_field, "Date Added");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            request_delay_ms: 0,
            ..ExtractorConfig::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
