//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators. Implementations live in other crates.

use crate::{CandidateTask, EmailRecord, PageRecord, StoreUser};

/// Trait for language-model calls
///
/// Implemented by the infrastructure layer (mail2do-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Complete a conversation made of a system instruction and one user message
    fn generate(&self, instruction: &str, message: &str) -> Result<String, Self::Error>;

    /// Same as [`LlmProvider::generate`], asking the model for a JSON object reply
    fn generate_json(&self, instruction: &str, message: &str) -> Result<String, Self::Error>;
}

/// Trait for the destination store
///
/// Implemented by the infrastructure layer (mail2do-store)
pub trait TaskStore {
    /// Error type for store operations
    type Error;

    /// Whether a record whose `title_field` equals `title` exists (exact match)
    fn title_exists(&self, title_field: &str, title: &str) -> Result<bool, Self::Error>;

    /// Create one new record and return its store id
    fn create_page(&mut self, record: &PageRecord) -> Result<String, Self::Error>;

    /// List the workspace's users
    fn list_users(&self) -> Result<Vec<StoreUser>, Self::Error>;
}

/// Trait for turning one email into one candidate task
///
/// Implemented by the application layer (mail2do-extractor)
pub trait TaskExtraction {
    /// Error type for extraction operations
    type Error;

    /// Extract a candidate task from an email, given the composed instruction
    fn extract(&self, prompt: &str, email: &EmailRecord) -> Result<CandidateTask, Self::Error>;
}
