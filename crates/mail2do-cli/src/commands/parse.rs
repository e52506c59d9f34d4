//! Parse command implementation.

use super::{load_schema, notion_client, openai_provider};
use crate::cli::ParseArgs;
use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::output::{print_json, read_json};
use mail2do_domain::SchemaDescriptor;
use mail2do_extractor::{load_emails, Extractor, ProcessedSet, PromptComposer};
use tracing::info;

/// Execute the parse command.
pub fn execute_parse(args: ParseArgs, config: &Config, credentials: &Credentials) -> Result<()> {
    let llm = openai_provider(config, credentials)?;
    let schema: SchemaDescriptor = match &args.schema {
        Some(path) => {
            info!("Using cached schema {}", path.display());
            read_json(path)?
        }
        None => load_schema(&notion_client(config, credentials)?, config, true)?,
    };
    let composer = PromptComposer::load(&config.extractor.prompt_path)?;
    let emails = load_emails(&args.emails)?;
    let processed = ProcessedSet::load(&config.extractor.processed_path)?;

    let extractor = Extractor::new(llm, schema, config.extractor.clone());
    let batch = extractor.extract_batch(&composer, emails, processed, args.ignore_processed);

    print_json(&batch.candidates)
}
