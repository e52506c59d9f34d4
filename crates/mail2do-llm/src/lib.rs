//! mail2do LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `mail2do-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use mail2do_llm::MockProvider;
//! use mail2do_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"Task name": "Call plumber"}"#);
//! let reply = provider.generate_json("instruction", "email").unwrap();
//! assert_eq!(reply, r#"{"Task name": "Call plumber"}"#);
//! ```

#![warn(missing_docs)]

pub mod openai;

use mail2do_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be set up (missing key, runtime failure)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

const ERROR_MARKER: &str = "ERROR";

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies without any network calls. Replies can be
/// keyed on a fragment of the user message, so one mock can serve a batch of
/// different emails.
///
/// # Examples
///
/// ```
/// use mail2do_llm::MockProvider;
/// use mail2do_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("kettle", r#"{"Task name": "Return defective item"}"#);
/// provider.add_response("on-call", r#"{"Task name": "Add on-call dates"}"#);
///
/// let reply = provider.generate("sys", "Subject: broken kettle").unwrap();
/// assert_eq!(reply, r#"{"Task name": "Return defective item"}"#);
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, String)>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed reply for every message
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` whenever the user message contains `fragment`
    ///
    /// Fragments are checked in insertion order.
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), response.into()));
    }

    /// Fail whenever the user message contains `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.add_response(fragment, ERROR_MARKER);
    }

    /// Number of completed calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every `(instruction, message)` pair received, in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded calls
    pub fn reset_call_count(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn reply(&self, instruction: &str, message: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((instruction.to_string(), message.to_string()));

        let responses = self.responses.lock().unwrap();
        if let Some((_, response)) = responses.iter().find(|(f, _)| message.contains(f.as_str())) {
            if response == ERROR_MARKER {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, instruction: &str, message: &str) -> Result<String, Self::Error> {
        self.reply(instruction, message)
    }

    fn generate_json(&self, instruction: &str, message: &str) -> Result<String, Self::Error> {
        self.reply(instruction, message)
    }
}
