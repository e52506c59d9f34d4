//! mail2do Uploader
//!
//! Writes deduplicated candidate tasks to the destination store.
//!
//! # Overview
//!
//! For each candidate, in order:
//! - **Dedup**: fallback titles are skipped without a query; titles that
//!   already exist are skipped without a write
//! - **Mapping**: schema fields are encoded by type; empty, unknown and
//!   read-only values are dropped, and person names are resolved to user ids
//! - **Write**: one page-creation call; errors become `failed (<message>)`
//!
//! Existing records are never updated. A failed candidate never stops the
//! batch, and the batch always yields one outcome per candidate.
//!
//! # Usage
//!
//! ```no_run
//! use mail2do_uploader::{BatchUploader, UploadConfig};
//! use mail2do_store::MemoryStore;
//! # use mail2do_domain::{CandidateTask, SchemaDescriptor};
//! # fn run(schema: SchemaDescriptor, tasks: Vec<CandidateTask>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = MemoryStore::new();
//! let mut uploader = BatchUploader::new(UploadConfig::default());
//!
//! let outcomes = uploader.upload_all(&tasks, &schema, &mut store)?;
//! println!("{}", serde_json::to_string_pretty(&outcomes)?);
//! println!("{}", uploader.summary().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [upload]
//! fallback_names = ["ToDo", "Task", "Untitled", "(unnamed task)"]
//! request_delay_ms = 400
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod mapping;
mod people;
mod summary;
mod uploader;

pub use config::UploadConfig;
pub use error::UploaderError;
pub use mapping::build_record;
pub use people::PeopleDirectory;
pub use summary::UploadSummary;
pub use uploader::BatchUploader;
