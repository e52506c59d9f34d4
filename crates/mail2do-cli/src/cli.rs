//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mail2do - Turn emails into deduplicated Notion tasks.
#[derive(Debug, Parser)]
#[command(name = "mail2do")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.mail2do/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract tasks from emails and upload them
    Run(RunArgs),

    /// Load the destination schema and print it as JSON
    Schema(SchemaArgs),

    /// Extract candidate tasks from emails and print them as JSON
    Parse(ParseArgs),

    /// Upload candidate tasks and print the outcomes
    Upload(UploadArgs),

    /// Write the current date line into a prompt file
    StampDate(StampDateArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Email file
    #[arg(default_value = "emails.json")]
    pub emails: PathBuf,

    /// Extract every email, even ones already processed
    #[arg(long)]
    pub ignore_processed: bool,

    /// Log the writes instead of performing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the schema command.
#[derive(Debug, Parser)]
pub struct SchemaArgs {
    /// Also write the descriptor to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip reading existing rows for reference values
    #[arg(long)]
    pub no_reference_values: bool,
}

/// Arguments for the parse command.
#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// Email file
    pub emails: PathBuf,

    /// Cached schema descriptor (skips loading it from Notion)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Extract every email, even ones already processed
    #[arg(long)]
    pub ignore_processed: bool,
}

/// Arguments for the upload command.
#[derive(Debug, Parser)]
pub struct UploadArgs {
    /// Candidate task file, as printed by `parse`
    pub tasks: PathBuf,

    /// Log the writes instead of performing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the stamp-date command.
#[derive(Debug, Parser)]
pub struct StampDateArgs {
    /// Prompt file (default: the configured prompt path)
    pub file: Option<PathBuf>,
}
