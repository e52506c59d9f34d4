//! Deduplication against the destination store
//!
//! Decides, for one candidate, whether it is new, a duplicate of an existing
//! record, or too generic to be trusted at all. The resolver never writes.

use crate::{DedupConfig, GatekeeperError};
use mail2do_domain::traits::TaskStore;
use mail2do_domain::{CandidateTask, SchemaDescriptor, UploadStatus};
use std::fmt::Display;
use tracing::debug;

/// Produces the value a candidate is deduplicated on
pub trait DedupKey {
    /// Store field the key is matched against
    fn field<'a>(&'a self, schema: &'a SchemaDescriptor) -> Option<&'a str>;

    /// Key value for a candidate (empty when the candidate has none)
    fn key(&self, task: &CandidateTask, schema: &SchemaDescriptor) -> String;
}

/// Deduplicates on the schema's title field
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleKey;

impl DedupKey for TitleKey {
    fn field<'a>(&'a self, schema: &'a SchemaDescriptor) -> Option<&'a str> {
        schema.title_field()
    }

    fn key(&self, task: &CandidateTask, schema: &SchemaDescriptor) -> String {
        schema
            .title_field()
            .map(|field| task.title(field))
            .unwrap_or_default()
    }
}

/// Outcome of deduplicating one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No matching record; proceed to upload
    Unique,

    /// Title is empty or block-listed; no query was made
    FallbackName,

    /// A record with the same title exists
    Duplicate,
}

impl Resolution {
    /// Terminal upload status, if this resolution ends the candidate's journey
    pub fn status(&self) -> Option<UploadStatus> {
        match self {
            Resolution::Unique => None,
            Resolution::FallbackName => Some(UploadStatus::SkippedFallbackName),
            Resolution::Duplicate => Some(UploadStatus::SkippedDuplicate),
        }
    }
}

/// Resolves candidates against the store before upload
pub struct DedupResolver<K: DedupKey = TitleKey> {
    key: K,
    fallback_names: Vec<String>,
}

impl DedupResolver<TitleKey> {
    /// Create a resolver keyed on the title field
    pub fn new(config: DedupConfig) -> Self {
        Self::with_key(TitleKey, config)
    }
}

impl Default for DedupResolver<TitleKey> {
    fn default() -> Self {
        Self::new(DedupConfig::default())
    }
}

impl<K: DedupKey> DedupResolver<K> {
    /// Create a resolver with a custom key strategy
    pub fn with_key(key: K, config: DedupConfig) -> Self {
        Self {
            key,
            fallback_names: config
                .fallback_names
                .iter()
                .map(|n| n.trim().to_lowercase())
                .collect(),
        }
    }

    /// Whether `title` is empty or block-listed (trimmed, case-insensitive)
    pub fn is_fallback_name(&self, title: &str) -> bool {
        let normalised = title.trim().to_lowercase();
        normalised.is_empty() || self.fallback_names.contains(&normalised)
    }

    /// Resolve one candidate
    ///
    /// # Errors
    ///
    /// Returns [`GatekeeperError::DedupQueryFailure`] if the store query
    /// fails, and [`GatekeeperError::MissingTitleField`] if the schema has
    /// no field to match on.
    pub fn resolve<S>(
        &self,
        task: &CandidateTask,
        schema: &SchemaDescriptor,
        store: &S,
    ) -> Result<Resolution, GatekeeperError>
    where
        S: TaskStore,
        S::Error: Display,
    {
        let key = self.key.key(task, schema);
        if self.is_fallback_name(&key) {
            debug!("Title {:?} is a fallback name", key);
            return Ok(Resolution::FallbackName);
        }

        let field = self
            .key
            .field(schema)
            .ok_or(GatekeeperError::MissingTitleField)?;

        let exists = store
            .title_exists(field, &key)
            .map_err(|e| GatekeeperError::DedupQueryFailure(e.to_string()))?;

        if exists {
            debug!("Title {:?} already exists", key);
            Ok(Resolution::Duplicate)
        } else {
            Ok(Resolution::Unique)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail2do_domain::{FieldSpec, FieldType};
    use mail2do_store::MemoryStore;
    use proptest::prelude::*;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "db1",
            "Tasks",
            vec![
                FieldSpec::new("Task name", FieldType::Title),
                FieldSpec::new("Notes", FieldType::Text),
            ],
        )
    }

    fn task(title: &str) -> CandidateTask {
        CandidateTask::new("1").with("Task name", title)
    }

    #[test]
    fn test_fallback_name_short_circuits() {
        let resolver = DedupResolver::default();
        let store = MemoryStore::new().with_titles(["Task"]);

        let resolution = resolver.resolve(&task("Task"), &schema(), &store).unwrap();

        assert_eq!(resolution, Resolution::FallbackName);
        assert_eq!(store.query_count(), 0);
    }

    #[test]
    fn test_empty_title_is_fallback() {
        let resolver = DedupResolver::default();
        let store = MemoryStore::new();
        let untitled = CandidateTask::new("1").with("Notes", "no title here");

        assert_eq!(
            resolver.resolve(&untitled, &schema(), &store).unwrap(),
            Resolution::FallbackName
        );
        assert_eq!(store.query_count(), 0);
    }

    #[test]
    fn test_existing_title_is_duplicate() {
        let resolver = DedupResolver::default();
        let store = MemoryStore::new().with_titles(["Add Alice's on-call dates"]);

        let resolution = resolver
            .resolve(&task("Add Alice's on-call dates"), &schema(), &store)
            .unwrap();

        assert_eq!(resolution, Resolution::Duplicate);
        assert_eq!(resolution.status(), Some(UploadStatus::SkippedDuplicate));
        assert_eq!(store.query_count(), 1);
    }

    #[test]
    fn test_new_title_is_unique() {
        let resolver = DedupResolver::default();
        let store = MemoryStore::new().with_titles(["Pay rent"]);

        let resolution = resolver
            .resolve(&task("Return defective item"), &schema(), &store)
            .unwrap();
        assert_eq!(resolution, Resolution::Unique);
        assert_eq!(resolution.status(), None);
    }

    #[test]
    fn test_query_failure_is_reported() {
        let resolver = DedupResolver::default();
        let store = MemoryStore::new().fail_queries();

        let result = resolver.resolve(&task("Call plumber"), &schema(), &store);
        assert!(matches!(result, Err(GatekeeperError::DedupQueryFailure(_))));
    }

    #[test]
    fn test_custom_fallback_names() {
        let resolver = DedupResolver::new(DedupConfig {
            fallback_names: vec!["Follow up".to_string()],
        });
        assert!(resolver.is_fallback_name("follow up "));
        assert!(!resolver.is_fallback_name("Task"));
    }

    proptest! {
        #[test]
        fn prop_fallback_names_ignore_case_and_padding(
            idx in 0usize..4,
            upper in proptest::collection::vec(any::<bool>(), 16),
            pad_left in 0usize..3,
            pad_right in 0usize..3,
        ) {
            let resolver = DedupResolver::default();
            let base = crate::DEFAULT_FALLBACK_NAMES[idx];
            let cased: String = base
                .chars()
                .zip(upper.iter().cycle())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                .collect();
            let padded = format!("{}{}{}", " ".repeat(pad_left), cased, " ".repeat(pad_right));

            prop_assert!(resolver.is_fallback_name(&padded));
        }

        #[test]
        fn prop_real_titles_are_not_fallback(title in "[A-Za-z]{3,12} [a-z]{3,12} [a-z]{2,12}") {
            let resolver = DedupResolver::default();
            prop_assert!(!resolver.is_fallback_name(&title));
        }
    }
}
