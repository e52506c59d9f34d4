//! Error types for upload operations

use thiserror::Error;

/// Errors that can occur while uploading candidates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploaderError {
    /// Storage layer error
    #[error("{0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workspace users could not be listed
    #[error("Could not list workspace users: {0}")]
    UserDirectory(String),

    /// Nothing in the candidate maps onto a writable schema field
    #[error("no mappable fields")]
    NoMappableFields,
}
