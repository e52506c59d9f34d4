//! mail2do CLI - Turn emails into deduplicated Notion tasks.

use clap::Parser;
use mail2do_cli::commands;
use mail2do_cli::{Cli, Command, Config, Credentials};
use std::env;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout carries only JSON
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> mail2do_cli::Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(|key| env::var(key).ok())?;
    config.validate()?;
    let credentials = Credentials::from_lookup(|key| env::var(key).ok());

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &credentials),
        Command::Schema(args) => commands::execute_schema(args, &config, &credentials),
        Command::Parse(args) => commands::execute_parse(args, &config, &credentials),
        Command::Upload(args) => commands::execute_upload(args, &config, &credentials),
        Command::StampDate(args) => commands::execute_stamp_date(args, &config),
    }
}
