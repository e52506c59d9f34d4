//! mail2do CLI library.
//!
//! This library provides the core functionality for the mail2do command-line
//! interface, including configuration management, the end-to-end pipeline,
//! command execution, and JSON output.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

pub use cli::{Cli, Command};
pub use config::{Config, Credentials};
pub use error::{CliError, Result};
pub use pipeline::{Pipeline, RunReport};
