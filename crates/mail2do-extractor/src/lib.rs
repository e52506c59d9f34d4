//! mail2do Extractor
//!
//! Converts emails into candidate tasks using an LLM.
//!
//! # Overview
//!
//! Each email is sent to the model together with an instruction composed
//! from the destination schema. The reply is parsed into a candidate task,
//! checked against the schema by the gatekeeper and stamped with the
//! processing date. A persisted processed set makes repeated runs over the
//! same mailbox idempotent.
//!
//! # Architecture
//!
//! ```text
//! emails.json → ProcessedSet filter → PromptComposer + LLM → parser → SchemaGate → CandidateTask
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use mail2do_extractor::{Extractor, ExtractorConfig, ProcessedSet, PromptComposer};
//! use mail2do_domain::{EmailRecord, FieldSpec, FieldType, SchemaDescriptor};
//! use mail2do_llm::MockProvider;
//!
//! let schema = SchemaDescriptor::new("db1", "Tasks", vec![
//!     FieldSpec::new("Task name", FieldType::Title),
//! ]);
//! let llm = MockProvider::new(r#"{"Task name": "Return defective item"}"#);
//! let extractor = Extractor::new(llm, schema, ExtractorConfig::default());
//!
//! let emails = vec![EmailRecord::new("42", "Broken kettle", "It stopped working.")];
//! let batch = extractor.extract_batch(
//!     &PromptComposer::default_template(),
//!     emails,
//!     ProcessedSet::in_memory(),
//!     false,
//! );
//!
//! println!("Candidates: {}", batch.candidates.len());
//! println!("Failures: {}", batch.failures.len());
//! ```

#![warn(missing_docs)]

mod config;
mod emails;
mod error;
mod extractor;
mod parser;
mod processed;
mod prompt;


pub use config::ExtractorConfig;
pub use emails::{load_emails, parse_emails};
pub use error::ExtractorError;
pub use extractor::{ExtractionBatch, ExtractionFailure, Extractor};
pub use parser::parse_llm_response;
pub use processed::ProcessedSet;
pub use prompt::{date_line, stamp_date, strip_date_line, PromptComposer, DATE_LINE_PREFIX};
