//! mail2do Domain Layer
//!
//! This crate holds the domain model shared by every stage of the
//! email-to-task pipeline, and the trait interfaces for the collaborators
//! the pipeline talks to (language model, destination store).
//!
//! ## Key Concepts
//!
//! - **EmailRecord**: an immutable `{uid, subject, body}` record from the mailbox
//! - **SchemaDescriptor**: the destination database's fields, as runtime data
//! - **CandidateTask**: a schema-conformant record extracted from one email
//! - **PageRecord**: the typed write payload handed to the store
//! - **UploadOutcome**: the resolved status of one candidate
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Infrastructure implementations live in other crates
//! - The destination schema is never compiled in: fields are looked up by name

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod email;
pub mod outcome;
pub mod record;
pub mod schema;
pub mod task;
pub mod traits;

// Re-exports for convenience
pub use email::EmailRecord;
pub use outcome::{UploadOutcome, UploadStatus};
pub use record::{PageRecord, PropertyValue, StoreUser};
pub use schema::{FieldSpec, FieldType, RelationTarget, RollupSource, SchemaDescriptor};
pub use task::{CandidateTask, FieldValue, SOURCE_UID_KEY};
