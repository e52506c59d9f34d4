//! In-process task store
//!
//! A `TaskStore` that keeps pages in memory, for tests only. It counts
//! queries so tests can assert that short-circuited items never reached the
//! store.

use crate::StoreError;
use mail2do_domain::traits::TaskStore;
use mail2do_domain::{PageRecord, PropertyValue, StoreUser};
use std::cell::Cell;
use std::collections::HashSet;

/// In-memory [`TaskStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    titles: HashSet<String>,
    users: Vec<StoreUser>,
    created: Vec<PageRecord>,
    queries: Cell<usize>,
    failing_titles: HashSet<String>,
    fail_queries: bool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed titles of records that already exist
    pub fn with_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.titles.extend(titles.into_iter().map(Into::into));
        self
    }

    /// Seed workspace users
    pub fn with_users(mut self, users: Vec<StoreUser>) -> Self {
        self.users = users;
        self
    }

    /// Make every write of a record with this title fail
    pub fn fail_write_for(mut self, title: impl Into<String>) -> Self {
        self.failing_titles.insert(title.into());
        self
    }

    /// Make every title query fail
    pub fn fail_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Number of title queries received
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    /// Records created so far, in write order
    pub fn created(&self) -> &[PageRecord] {
        &self.created
    }

    /// Titles of created records, in write order
    pub fn created_titles(&self) -> Vec<String> {
        self.created.iter().filter_map(record_title).collect()
    }
}

fn record_title(record: &PageRecord) -> Option<String> {
    record.properties.iter().find_map(|(_, v)| match v {
        PropertyValue::Title(t) => Some(t.clone()),
        _ => None,
    })
}

impl TaskStore for MemoryStore {
    type Error = StoreError;

    fn title_exists(&self, _title_field: &str, title: &str) -> Result<bool, Self::Error> {
        self.queries.set(self.queries.get() + 1);
        if self.fail_queries {
            return Err(StoreError::Http("query unavailable".to_string()));
        }
        Ok(self.titles.contains(title))
    }

    fn create_page(&mut self, record: &PageRecord) -> Result<String, Self::Error> {
        let title = record_title(record);
        if let Some(t) = &title {
            if self.failing_titles.contains(t) {
                return Err(StoreError::Api {
                    status: 400,
                    message: format!("write rejected for {}", t),
                });
            }
        }

        self.created.push(record.clone());
        if let Some(t) = title {
            self.titles.insert(t);
        }
        Ok(format!("page-{}", self.created.len()))
    }

    fn list_users(&self) -> Result<Vec<StoreUser>, Self::Error> {
        Ok(self.users.clone())
    }
}
