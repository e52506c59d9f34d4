//! mail2do Storage Layer
//!
//! Implements the `TaskStore` trait against the Notion API, and loads the
//! destination schema descriptor.
//!
//! # Architecture
//!
//! - `NotionClient`: HTTP client for database queries, page creation and users
//! - `encode`: `PageRecord` → Notion property JSON
//! - `schema`: raw database JSON → `SchemaDescriptor`, with related-database
//!   traversal and reference values
//! - `MemoryStore`: in-process `TaskStore` for tests and offline runs
//!
//! # Examples
//!
//! ```no_run
//! use mail2do_store::{NotionClient, NotionConfig, SchemaLoader};
//!
//! let config = NotionConfig::new("0123456789abcdef0123456789abcdef");
//! let client = NotionClient::new("secret_token", config).unwrap();
//! let schema = SchemaLoader::new(&client).load(client.database_id()).unwrap();
//! println!("title field: {:?}", schema.title_field());
//! ```

#![warn(missing_docs)]

pub mod encode;
pub mod memory;
pub mod notion;
pub mod schema;

use thiserror::Error;

pub use memory::MemoryStore;
pub use notion::{NotionClient, NotionConfig};
pub use schema::{canonical_id, descriptor_from_database, DatabaseSource, SchemaLoader};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Network-level failure (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The store answered with an error status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Store-provided error message
        message: String,
    },

    /// Database not found or not shared with the integration
    #[error("Database not accessible: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Client could not be set up
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Http(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            StoreError::Http(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            StoreError::InvalidData(format!("Malformed response body: {}", e))
        } else {
            StoreError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(format!("JSON error: {}", e))
    }
}
