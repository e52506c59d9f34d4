//! Configuration for the uploader

use mail2do_gatekeeper::{DedupConfig, DEFAULT_FALLBACK_NAMES};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for batch uploads
///
/// Can be loaded from TOML:
///
/// ```toml
/// [upload]
/// fallback_names = ["ToDo", "Task", "Untitled", "(unnamed task)"]
/// request_delay_ms = 400
/// dry_run = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Titles that are never uploaded (matched trimmed, case-insensitive)
    pub fallback_names: Vec<String>,

    /// Pause between store writes (milliseconds)
    pub request_delay_ms: u64,

    /// Log the writes instead of performing them
    pub dry_run: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            fallback_names: DEFAULT_FALLBACK_NAMES.iter().map(|s| s.to_string()).collect(),
            request_delay_ms: 400,
            dry_run: false,
        }
    }
}

impl UploadConfig {
    /// Configuration that writes nothing
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Pause between store writes as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Deduplication settings
    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            fallback_names: self.fallback_names.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(blank) = self.fallback_names.iter().find(|n| n.trim().is_empty()) {
            return Err(format!("fallback_names contains a blank entry: {:?}", blank));
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UploadConfig::default();
        assert_eq!(config.fallback_names.len(), 4);
        assert_eq!(config.request_delay(), Duration::from_millis(400));
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dry_run_preset() {
        let config = UploadConfig::dry_run();
        assert!(config.dry_run);
        assert_eq!(config.request_delay_ms, UploadConfig::default().request_delay_ms);
    }

    #[test]
    fn test_blank_fallback_name_rejected() {
        let config = UploadConfig {
            fallback_names: vec!["Task".to_string(), "  ".to_string()],
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = UploadConfig::from_toml("dry_run = true\n").unwrap();
        assert!(config.dry_run);
        assert_eq!(config.request_delay_ms, 400);
        assert!(config.fallback_names.contains(&"Untitled".to_string()));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = UploadConfig {
            fallback_names: vec!["Misc".to_string()],
            request_delay_ms: 0,
            dry_run: true,
        };
        let toml = config.to_toml().unwrap();
        assert_eq!(UploadConfig::from_toml(&toml).unwrap(), config);
    }
}
