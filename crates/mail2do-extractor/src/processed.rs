//! Processed-set tracking
//!
//! Remembers which email uids were already turned into tasks, so repeated
//! runs over the same mailbox never extract an email twice. The backing file
//! holds one uid per line and is only ever appended to.

use crate::error::ExtractorError;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Set of processed email uids, optionally backed by a file
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    uids: HashSet<String>,
    path: Option<PathBuf>,
    // Backing file was cut off mid-line
    unterminated: bool,
}

impl ProcessedSet {
    /// Load the set from `path`; a missing file yields an empty set
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ExtractorError> {
        let path = path.into();
        let (uids, unterminated) = match fs::read_to_string(&path) {
            Ok(contents) => {
                let uids: HashSet<String> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
                (uids, !contents.is_empty() && !contents.ends_with('\n'))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "{} not found; treating all emails as unprocessed",
                    path.display()
                );
                (HashSet::new(), false)
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Loaded {} processed uids from {}", uids.len(), path.display());
        Ok(Self {
            uids,
            path: Some(path),
            unterminated,
        })
    }

    /// Set that lives only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Keep the loaded uids but stop writing to the backing file
    pub fn detached(self) -> Self {
        Self {
            uids: self.uids,
            path: None,
            unterminated: false,
        }
    }

    /// Whether `uid` has been processed
    pub fn contains(&self, uid: &str) -> bool {
        self.uids.contains(uid)
    }

    /// Record `uid` as processed, appending it to the backing file.
    ///
    /// Returns `false` if the uid was already present.
    pub fn record(&mut self, uid: &str) -> Result<bool, ExtractorError> {
        if self.uids.contains(uid) {
            return Ok(false);
        }

        if let Some(path) = &self.path {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            if self.unterminated {
                writeln!(file)?;
            }
            writeln!(file, "{}", uid)?;
            file.flush()?;
            self.unterminated = false;
        }

        self.uids.insert(uid.to_string());
        Ok(true)
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of processed uids
    pub fn len(&self) -> usize {
        self.uids.len()
    }

    /// Whether no uid has been processed
    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let set = ProcessedSet::load(dir.path().join("processed_emails.txt")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_ignores_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_emails.txt");
        fs::write(&path, "101\n\n 102 \n").unwrap();

        let set = ProcessedSet::load(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("101"));
        assert!(set.contains("102"));
    }

    #[test]
    fn test_record_appends_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_emails.txt");
        fs::write(&path, "101\n").unwrap();

        let mut set = ProcessedSet::load(&path).unwrap();
        assert!(set.record("102").unwrap());
        assert!(!set.record("102").unwrap());
        assert!(!set.record("101").unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), "101\n102\n");
    }

    #[test]
    fn test_record_after_unterminated_last_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_emails.txt");
        fs::write(&path, "101").unwrap();

        let mut set = ProcessedSet::load(&path).unwrap();
        set.record("102").unwrap();
        set.record("103").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "101\n102\n103\n");

        let reloaded = ProcessedSet::load(&path).unwrap();
        assert!(reloaded.contains("101"));
        assert!(reloaded.contains("102"));
        assert!(reloaded.contains("103"));
    }

    #[test]
    fn test_detached_set_keeps_uids_but_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_emails.txt");
        fs::write(&path, "101\n").unwrap();

        let mut set = ProcessedSet::load(&path).unwrap().detached();
        assert!(set.contains("101"));
        assert!(set.record("102").unwrap());
        assert!(set.path().is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "101\n");
    }

    #[test]
    fn test_recorded_uids_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_emails.txt");

        let mut set = ProcessedSet::load(&path).unwrap();
        set.record("7").unwrap();

        let reloaded = ProcessedSet::load(&path).unwrap();
        assert!(reloaded.contains("7"));
    }

    #[test]
    fn test_in_memory_writes_nothing() {
        let mut set = ProcessedSet::in_memory();
        assert!(set.record("1").unwrap());
        assert!(set.contains("1"));
        assert!(set.path().is_none());
    }
}
