//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential is not set
    #[error("{0} must be set (environment or .env)")]
    MissingCredential(&'static str),

    /// Model provider error
    #[error("LLM error: {0}")]
    Llm(#[from] mail2do_llm::LlmError),

    /// Destination store error
    #[error("Store error: {0}")]
    Store(#[from] mail2do_store::StoreError),

    /// Extraction error
    #[error("{0}")]
    Extractor(#[from] mail2do_extractor::ExtractorError),

    /// Upload error
    #[error("{0}")]
    Uploader(#[from] mail2do_uploader::UploaderError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
