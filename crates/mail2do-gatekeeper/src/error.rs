//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Candidate does not conform to the destination schema
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// The store could not answer the duplicate query
    #[error("{0}")]
    DedupQueryFailure(String),

    /// The schema has no title field to deduplicate on
    #[error("Schema has no title field")]
    MissingTitleField,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
