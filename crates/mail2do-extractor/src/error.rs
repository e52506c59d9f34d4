//! Error types for the Extractor

use mail2do_gatekeeper::GatekeeperError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The model reply is not a usable JSON object
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The extracted task does not fit the destination schema
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// JSON parsing error (input files)
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// File access error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<GatekeeperError> for ExtractorError {
    fn from(e: GatekeeperError) -> Self {
        match e {
            GatekeeperError::SchemaViolation(msg) => ExtractorError::SchemaViolation(msg),
            other => ExtractorError::Config(other.to_string()),
        }
    }
}
