//! Configuration management for the CLI.
//!
//! Settings come from a TOML file, then from the environment. Credentials
//! only ever come from the environment.

use crate::error::{CliError, Result};
use mail2do_extractor::ExtractorConfig;
use mail2do_llm::openai::OpenAiConfig;
use mail2do_store::NotionConfig;
use mail2do_uploader::UploadConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model provider settings
    pub openai: OpenAiConfig,

    /// Destination store settings
    pub notion: NotionConfig,

    /// Extraction settings
    pub extractor: ExtractorConfig,

    /// Upload settings
    pub upload: UploadConfig,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".mail2do").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    debug!("No config at {}; using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply environment overrides, reading variables through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = read("OPENAI_MODEL") {
            self.openai.model = model;
        }
        if let Some(temperature) = read("OPENAI_TEMPERATURE") {
            self.openai.temperature = temperature.trim().parse().map_err(|_| {
                CliError::Config(format!("OPENAI_TEMPERATURE is not a number: {}", temperature))
            })?;
        }
        if let Some(prompt) = read("LLM_PROMPT") {
            self.extractor.prompt_path = PathBuf::from(prompt);
        }
        if let Some(database_id) = read("NOTION_DATABASE_ID") {
            self.notion.database_id = database_id;
        }
        if let Some(version) = read("NOTION_VERSION") {
            self.notion.api_version = version;
        }
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(CliError::Config(format!(
                "openai.temperature must be between 0.0 and 2.0, got {}",
                self.openai.temperature
            )));
        }
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("extractor: {}", e)))?;
        self.upload
            .validate()
            .map_err(|e| CliError::Config(format!("upload: {}", e)))?;
        Ok(())
    }

    /// Destination database id, which must be configured.
    pub fn database_id(&self) -> Result<&str> {
        let id = self.notion.database_id.trim();
        if id.is_empty() {
            return Err(CliError::Config(
                "notion.database_id is not set (or NOTION_DATABASE_ID)".to_string(),
            ));
        }
        Ok(id)
    }
}

/// Secrets read from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    openai_api_key: Option<String>,
    notion_token: Option<String>,
}

impl Credentials {
    /// Read credentials through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: read("OPENAI_API_KEY"),
            notion_token: read("NOTION_TOKEN"),
        }
    }

    /// The model provider key.
    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or(CliError::MissingCredential("OPENAI_API_KEY"))
    }

    /// The Notion integration token.
    pub fn notion_token(&self) -> Result<&str> {
        self.notion_token
            .as_deref()
            .ok_or(CliError::MissingCredential("NOTION_TOKEN"))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<set>"))
            .field("notion_token", &self.notion_token.as_ref().map(|_| "<set>"))
            .finish()
    }
}
