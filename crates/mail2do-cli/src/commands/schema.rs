//! Schema command implementation.

use super::{load_schema, notion_client};
use crate::cli::SchemaArgs;
use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::output::{print_json, write_json};
use tracing::info;

/// Execute the schema command.
pub fn execute_schema(args: SchemaArgs, config: &Config, credentials: &Credentials) -> Result<()> {
    let client = notion_client(config, credentials)?;
    let schema = load_schema(&client, config, !args.no_reference_values)?;

    if let Some(path) = &args.output {
        write_json(path, &schema)?;
        info!("Schema written to {}", path.display());
    }

    print_json(&schema)
}
