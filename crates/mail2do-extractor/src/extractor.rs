//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::processed::ProcessedSet;
use crate::prompt::PromptComposer;
use chrono::{Local, NaiveDateTime};
use mail2do_domain::traits::{LlmProvider, TaskExtraction};
use mail2do_domain::{CandidateTask, EmailRecord, FieldValue, SchemaDescriptor};
use mail2do_gatekeeper::SchemaGate;
use serde::Serialize;
use std::fmt::Display;
use std::thread;
use tracing::{debug, error, info, warn};

/// An email that produced no candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFailure {
    /// Email uid
    pub uid: String,
    /// Why extraction failed
    pub error: String,
}

/// Result of extracting a batch of emails
#[derive(Debug)]
pub struct ExtractionBatch {
    /// Candidates, in email order
    pub candidates: Vec<CandidateTask>,

    /// Emails that failed, in email order
    pub failures: Vec<ExtractionFailure>,

    /// Emails skipped because they were already processed
    pub already_processed: usize,

    /// Final state of the processed set
    pub processed: ProcessedSet,
}

/// The Extractor turns emails into schema-conformant candidate tasks
pub struct Extractor<L: LlmProvider> {
    llm_provider: L,
    schema: SchemaDescriptor,
    gatekeeper: SchemaGate,
    config: ExtractorConfig,
    timestamp: NaiveDateTime,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a new Extractor for one destination schema
    pub fn new(llm_provider: L, schema: SchemaDescriptor, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            gatekeeper: SchemaGate::new(config.validation()),
            schema,
            config,
            timestamp: Local::now().naive_local(),
        }
    }

    /// Fix the processing timestamp (prompt date line and date-added value)
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Destination schema
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Processing timestamp
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The underlying model provider
    pub fn llm_provider(&self) -> &L {
        &self.llm_provider
    }

    /// Compose the instruction for this extractor's schema and timestamp
    pub fn compose_prompt(&self, composer: &PromptComposer) -> String {
        composer.compose(&self.schema, self.timestamp)
    }

    /// Extract every email not yet in `processed`.
    ///
    /// Per-email failures are collected, never returned as errors; their uids
    /// are not recorded. Successful uids are recorded before the candidate
    /// is kept. With `ignore_processed`, every email is extracted.
    pub fn extract_batch(
        &self,
        composer: &PromptComposer,
        emails: Vec<EmailRecord>,
        mut processed: ProcessedSet,
        ignore_processed: bool,
    ) -> ExtractionBatch {
        let prompt = self.compose_prompt(composer);
        debug!("Prompt length: {} chars", prompt.len());

        let mut candidates = Vec::new();
        let mut failures = Vec::new();
        let mut already_processed = 0;
        let mut calls = 0usize;

        for email in emails {
            if !ignore_processed && processed.contains(&email.uid) {
                debug!("Email {} already processed", email.uid);
                already_processed += 1;
                continue;
            }

            if calls > 0 && self.config.request_delay_ms > 0 {
                thread::sleep(self.config.request_delay());
            }
            calls += 1;

            match self.extract(&prompt, &email) {
                Ok(candidate) => {
                    if let Err(e) = processed.record(&email.uid) {
                        error!("Could not record email {} as processed: {}", email.uid, e);
                    }
                    candidates.push(candidate);
                }
                Err(e) => {
                    warn!("Email {} failed to extract: {}", email.uid, e);
                    failures.push(ExtractionFailure {
                        uid: email.uid,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Extraction complete: {} candidates, {} failed, {} already processed",
            candidates.len(),
            failures.len(),
            already_processed
        );

        ExtractionBatch {
            candidates,
            failures,
            already_processed,
            processed,
        }
    }

    /// Drop any model value for the date-added field; it is never validated
    fn take_date_added(&self, task: &mut CandidateTask) {
        let field = &self.config.date_added_field;
        if self.schema.contains(field) && task.remove(field).is_some() {
            debug!("Discarded model value for '{}'", field);
        }
    }

    fn inject_date_added(&self, task: &mut CandidateTask) {
        let field = &self.config.date_added_field;
        if self.schema.contains(field) {
            let date = self.timestamp.format("%Y-%m-%d").to_string();
            task.set(field.clone(), FieldValue::Text(date));
        }
    }
}

impl<L> TaskExtraction for Extractor<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    type Error = ExtractorError;

    fn extract(&self, prompt: &str, email: &EmailRecord) -> Result<CandidateTask, Self::Error> {
        let response = self
            .llm_provider
            .generate_json(prompt, &email.to_message())
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;
        debug!("LLM response length: {} chars", response.len());

        let mut candidate = parse_llm_response(&email.uid, &response)?;
        self.take_date_added(&mut candidate);
        let mut candidate = self.gatekeeper.conform(candidate, &self.schema)?;
        self.inject_date_added(&mut candidate);
        Ok(candidate)
    }
}
