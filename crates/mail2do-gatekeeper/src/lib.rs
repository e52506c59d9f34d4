//! mail2do Gatekeeper
//!
//! Quality control between extraction and upload.
//!
//! The Gatekeeper provides:
//! - Schema conformance (unknown fields, option values, value shapes)
//! - Optional coercion of near-miss option values
//! - Duplicate and fallback-name detection against the store
//!
//! # Examples
//!
//! ```
//! use mail2do_domain::{CandidateTask, FieldSpec, FieldType, SchemaDescriptor};
//! use mail2do_gatekeeper::{SchemaGate, ValidationConfig, ValidationStatus};
//!
//! let schema = SchemaDescriptor::new("db1", "Tasks", vec![
//!     FieldSpec::new("Task name", FieldType::Title),
//! ]);
//! let gate = SchemaGate::new(ValidationConfig::default());
//!
//! let task = CandidateTask::new("7").with("Task name", "Call plumber");
//! assert_eq!(gate.check(&task, &schema).status, ValidationStatus::Accepted);
//! ```

#![warn(missing_docs)]

mod config;
mod dedup;
mod error;
mod validator;

pub use config::{
    DedupConfig, ValidationConfig, ValuePolicy, DEFAULT_COERCE_THRESHOLD, DEFAULT_FALLBACK_NAMES,
};
pub use dedup::{DedupKey, DedupResolver, Resolution, TitleKey};
pub use error::GatekeeperError;
pub use validator::{Coercion, RejectionReason, SchemaGate, ValidationResult, ValidationStatus};
