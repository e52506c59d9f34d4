//! OpenAI Provider Implementation
//!
//! Talks to any OpenAI-compatible chat completions endpoint.
//!
//! # Features
//!
//! - Async HTTP communication driven on a provider-owned runtime, so the
//!   blocking `LlmProvider` trait can be used from synchronous pipelines
//! - Configurable endpoint, model and temperature
//! - Retry logic with exponential backoff
//! - JSON mode for structured replies
//!
//! # Examples
//!
//! ```no_run
//! use mail2do_llm::{OpenAiProvider, openai::OpenAiConfig};
//! use mail2do_domain::traits::LlmProvider;
//!
//! let provider = OpenAiProvider::new("sk-...", OpenAiConfig::default()).unwrap();
//! let reply = provider.generate_json("Extract a task.", "Subject: ...").unwrap();
//! ```

use crate::LlmError;
use mail2do_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Settings for the OpenAI provider (the API key is passed separately)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// API base URL
    pub base_url: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    pub max_retries: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    api_key: String,
    config: OpenAiConfig,
    client: reqwest::Client,
    runtime: Runtime,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the API key is empty or the HTTP
    /// client or runtime cannot be built.
    pub fn new(api_key: impl Into<String>, config: OpenAiConfig) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("OpenAI API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            api_key,
            config,
            client,
            runtime,
        })
    }

    /// Model this provider talks to
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Run one chat completion
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable after all attempts
    /// - The model is not available
    /// - The reply has no message content
    pub async fn chat(
        &self,
        instruction: &str,
        message: &str,
        json_mode: bool,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let request_body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.config.max_retries.max(1) {
            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed = response.json::<ChatResponse>().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message.content)
                            .ok_or_else(|| {
                                LlmError::InvalidResponse("No message content in reply".to_string())
                            });
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.config.model.clone()));
                    } else if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(LlmError::Config("OpenAI rejected the API key".to_string()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.config.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("LLM request failed (attempt {}), retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    fn generate(&self, instruction: &str, message: &str) -> Result<String, Self::Error> {
        debug!("Calling {} ({} chars)", self.config.model, message.len());
        self.runtime.block_on(self.chat(instruction, message, false))
    }

    fn generate_json(&self, instruction: &str, message: &str) -> Result<String, Self::Error> {
        debug!("Calling {} in JSON mode ({} chars)", self.config.model, message.len());
        self.runtime.block_on(self.chat(instruction, message, true))
    }
}
