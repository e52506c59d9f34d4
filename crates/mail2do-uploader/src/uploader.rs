//! Batch upload of deduplicated candidates

use crate::mapping::build_record;
use crate::{PeopleDirectory, UploadConfig, UploadSummary, UploaderError};
use mail2do_domain::traits::TaskStore;
use mail2do_domain::{CandidateTask, SchemaDescriptor, UploadOutcome, UploadStatus};
use mail2do_gatekeeper::{DedupKey, DedupResolver, Resolution, SchemaGate, TitleKey};
use std::fmt::Display;
use std::thread;
use tracing::{debug, info, warn};

/// Runs deduplication and upload over a batch of candidates
///
/// Candidates are handled strictly in order, one store round-trip at a time.
/// Existing records are never updated, and a failed candidate never stops
/// the batch.
///
/// # Examples
///
/// ```
/// use mail2do_domain::{CandidateTask, FieldSpec, FieldType, SchemaDescriptor};
/// use mail2do_store::MemoryStore;
/// use mail2do_uploader::{BatchUploader, UploadConfig};
///
/// let schema = SchemaDescriptor::new("db1", "Tasks", vec![
///     FieldSpec::new("Task name", FieldType::Title),
/// ]);
/// let mut store = MemoryStore::new();
/// let mut uploader = BatchUploader::new(UploadConfig {
///     request_delay_ms: 0,
///     ..UploadConfig::default()
/// });
///
/// let tasks = vec![CandidateTask::new("1").with("Task name", "Return kettle")];
/// let outcomes = uploader.upload_all(&tasks, &schema, &mut store).unwrap();
/// assert_eq!(outcomes[0].status.to_string(), "created");
/// ```
pub struct BatchUploader<K: DedupKey = TitleKey> {
    config: UploadConfig,
    resolver: DedupResolver<K>,
    gate: Option<SchemaGate>,
    summary: UploadSummary,
    writes: usize,
}

impl BatchUploader<TitleKey> {
    /// Create an uploader that deduplicates on the title field
    pub fn new(config: UploadConfig) -> Self {
        let resolver = DedupResolver::new(config.dedup_config());
        Self::with_resolver(config, resolver)
    }
}

impl<K: DedupKey> BatchUploader<K> {
    /// Create an uploader with a custom dedup resolver
    pub fn with_resolver(config: UploadConfig, resolver: DedupResolver<K>) -> Self {
        Self {
            config,
            resolver,
            gate: None,
            summary: UploadSummary::new(),
            writes: 0,
        }
    }

    /// Check every candidate against the schema before deduplication.
    ///
    /// For candidates that did not come straight from extraction, such as a
    /// task file edited by hand. A rejected candidate is reported as failed
    /// without reaching the store.
    pub fn with_gate(mut self, gate: SchemaGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Current configuration
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Counters accumulated so far
    pub fn summary(&self) -> &UploadSummary {
        &self.summary
    }

    /// Reset the counters
    pub fn reset_summary(&mut self) {
        self.summary.reset();
    }

    /// Build the people directory for `schema`.
    ///
    /// Users are only listed when the schema has a person field.
    pub fn people_directory<S>(
        &self,
        schema: &SchemaDescriptor,
        store: &S,
    ) -> Result<PeopleDirectory, UploaderError>
    where
        S: TaskStore,
        S::Error: Display,
    {
        if !schema.has_person_fields() {
            return Ok(PeopleDirectory::default());
        }

        let users = store
            .list_users()
            .map_err(|e| UploaderError::UserDirectory(e.to_string()))?;
        debug!("Listed {} workspace users", users.len());
        Ok(PeopleDirectory::from_users(&users))
    }

    /// Deduplicate and upload every candidate, in order
    ///
    /// # Errors
    ///
    /// Fails only if the people directory cannot be built; per-candidate
    /// problems are reported in the outcomes.
    pub fn upload_all<S>(
        &mut self,
        tasks: &[CandidateTask],
        schema: &SchemaDescriptor,
        store: &mut S,
    ) -> Result<Vec<UploadOutcome>, UploaderError>
    where
        S: TaskStore,
        S::Error: Display,
    {
        let people = self.people_directory(schema, store)?;
        Ok(self.upload_with_people(tasks, schema, &people, store))
    }

    /// Deduplicate and upload every candidate with a prepared people directory
    pub fn upload_with_people<S>(
        &mut self,
        tasks: &[CandidateTask],
        schema: &SchemaDescriptor,
        people: &PeopleDirectory,
        store: &mut S,
    ) -> Vec<UploadOutcome>
    where
        S: TaskStore,
        S::Error: Display,
    {
        let outcomes: Vec<UploadOutcome> = tasks
            .iter()
            .map(|task| self.upload_one(task, schema, people, store))
            .collect();

        info!("{}", self.summary.summary());
        outcomes
    }

    /// Deduplicate and upload one candidate
    pub fn upload_one<S>(
        &mut self,
        task: &CandidateTask,
        schema: &SchemaDescriptor,
        people: &PeopleDirectory,
        store: &mut S,
    ) -> UploadOutcome
    where
        S: TaskStore,
        S::Error: Display,
    {
        let title = schema
            .title_field()
            .map(|field| task.title(field))
            .unwrap_or_default();

        let checked;
        let task = match &self.gate {
            Some(gate) => match gate.conform(task.clone(), schema) {
                Ok(conformed) => {
                    checked = conformed;
                    &checked
                }
                Err(e) => {
                    warn!("Rejected {:?}: {}", title, e);
                    let status = UploadStatus::Failed(e.to_string());
                    self.summary.record(&status);
                    return UploadOutcome::new(title, status);
                }
            },
            None => task,
        };

        let status = match self.resolver.resolve(task, schema, store) {
            Ok(Resolution::Unique) => self.write(task, schema, people, store, &title),
            Ok(resolution) => resolution
                .status()
                .unwrap_or_else(|| UploadStatus::Failed("unresolved".to_string())),
            Err(e) => {
                warn!("Duplicate check failed for {:?}: {}", title, e);
                UploadStatus::Failed(e.to_string())
            }
        };

        debug!("{:?}: {}", title, status);
        self.summary.record(&status);
        UploadOutcome::new(title, status)
    }

    fn write<S>(
        &mut self,
        task: &CandidateTask,
        schema: &SchemaDescriptor,
        people: &PeopleDirectory,
        store: &mut S,
        title: &str,
    ) -> UploadStatus
    where
        S: TaskStore,
        S::Error: Display,
    {
        let record = build_record(task, schema, people);
        if record.is_empty() {
            warn!("Nothing to write for {:?}", title);
            return UploadStatus::Failed(UploaderError::NoMappableFields.to_string());
        }

        if self.config.dry_run {
            info!("Dry run: would create {:?} with {} properties", title, record.len());
            return UploadStatus::Created;
        }

        if self.writes > 0 && self.config.request_delay_ms > 0 {
            thread::sleep(self.config.request_delay());
        }
        self.writes += 1;

        match store.create_page(&record) {
            Ok(id) => {
                debug!("Created page {} for {:?}", id, title);
                UploadStatus::Created
            }
            Err(e) => {
                warn!("Write failed for {:?}: {}", title, e);
                UploadStatus::Failed(UploaderError::Store(e.to_string()).to_string())
            }
        }
    }
}
