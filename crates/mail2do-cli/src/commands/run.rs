//! Run command implementation.

use super::{load_schema, notion_client, openai_provider};
use crate::cli::RunArgs;
use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::output::print_json;
use crate::pipeline::Pipeline;
use mail2do_extractor::{load_emails, ProcessedSet, PromptComposer};
use std::path::Path;
use tracing::info;

/// Execute the run command.
pub fn execute_run(args: RunArgs, config: &Config, credentials: &Credentials) -> Result<()> {
    let mut upload = config.upload.clone();
    upload.dry_run |= args.dry_run;

    // Everything that can fail at startup happens before the first model call
    let llm = openai_provider(config, credentials)?;
    let mut store = notion_client(config, credentials)?;
    let schema = load_schema(&store, config, true)?;
    let composer = PromptComposer::load(&config.extractor.prompt_path)?;
    let emails = load_emails(&args.emails)?;
    let processed = processed_set(&config.extractor.processed_path, upload.dry_run)?;

    let mut pipeline = Pipeline::new(llm, schema, composer, config.extractor.clone(), upload);
    let report = pipeline.run(emails, processed, args.ignore_processed, &mut store)?;

    print_json(&report)
}

/// Load the processed set; a dry run reads it but never appends.
pub(crate) fn processed_set(path: &Path, dry_run: bool) -> Result<ProcessedSet> {
    let processed = ProcessedSet::load(path)?;
    if dry_run {
        info!("Dry run: {} will not be updated", path.display());
        return Ok(processed.detached());
    }
    Ok(processed)
}
