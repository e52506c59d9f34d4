//! End-to-end pipeline: emails in, upload outcomes out.

use crate::error::Result;
use mail2do_domain::traits::{LlmProvider, TaskStore};
use mail2do_domain::{EmailRecord, SchemaDescriptor, UploadOutcome};
use mail2do_extractor::{
    ExtractionFailure, Extractor, ExtractorConfig, ProcessedSet, PromptComposer,
};
use mail2do_uploader::{BatchUploader, UploadConfig};
use serde::Serialize;
use std::fmt::Display;
use tracing::info;

/// Output of the `run` command.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// One outcome per extracted candidate, in email order
    pub results: Vec<UploadOutcome>,

    /// Emails that produced no candidate
    pub extraction_failures: Vec<ExtractionFailure>,

    /// Emails skipped because they were already processed
    pub already_processed: usize,
}

/// Extraction followed by deduplicated upload, for one destination schema.
pub struct Pipeline<L: LlmProvider> {
    extractor: Extractor<L>,
    composer: PromptComposer,
    uploader: BatchUploader,
}

impl<L> Pipeline<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a pipeline.
    pub fn new(
        llm: L,
        schema: SchemaDescriptor,
        composer: PromptComposer,
        extractor_config: ExtractorConfig,
        upload_config: UploadConfig,
    ) -> Self {
        Self {
            extractor: Extractor::new(llm, schema, extractor_config),
            composer,
            uploader: BatchUploader::new(upload_config),
        }
    }

    /// Fix the processing timestamp.
    pub fn with_timestamp(mut self, timestamp: chrono::NaiveDateTime) -> Self {
        self.extractor = self.extractor.with_timestamp(timestamp);
        self
    }

    /// The extraction stage.
    pub fn extractor(&self) -> &Extractor<L> {
        &self.extractor
    }

    /// The upload stage.
    pub fn uploader(&self) -> &BatchUploader {
        &self.uploader
    }

    /// Run every email through extraction and upload.
    ///
    /// The people directory is built before any model call, so a store that
    /// cannot list users stops the run before anything is recorded.
    pub fn run<S>(
        &mut self,
        emails: Vec<EmailRecord>,
        processed: ProcessedSet,
        ignore_processed: bool,
        store: &mut S,
    ) -> Result<RunReport>
    where
        S: TaskStore,
        S::Error: Display,
    {
        let schema = self.extractor.schema();
        let people = self.uploader.people_directory(schema, store)?;

        let batch = self
            .extractor
            .extract_batch(&self.composer, emails, processed, ignore_processed);
        info!(
            "{} candidates from {} emails",
            batch.candidates.len(),
            batch.candidates.len() + batch.failures.len() + batch.already_processed
        );

        let schema = self.extractor.schema();
        let results = self
            .uploader
            .upload_with_people(&batch.candidates, schema, &people, store);

        Ok(RunReport {
            results,
            extraction_failures: batch.failures,
            already_processed: batch.already_processed,
        })
    }
}
