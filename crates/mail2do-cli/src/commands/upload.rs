//! Upload command implementation.

use super::{load_schema, notion_client};
use crate::cli::UploadArgs;
use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::output::{print_json, read_json};
use mail2do_domain::CandidateTask;
use mail2do_gatekeeper::SchemaGate;
use mail2do_uploader::BatchUploader;

/// Execute the upload command.
pub fn execute_upload(args: UploadArgs, config: &Config, credentials: &Credentials) -> Result<()> {
    let tasks: Vec<CandidateTask> = read_json(&args.tasks)?;
    let mut store = notion_client(config, credentials)?;
    let schema = load_schema(&store, config, false)?;

    let mut upload = config.upload.clone();
    upload.dry_run |= args.dry_run;

    // Task files may be stale or edited by hand
    let gate = SchemaGate::new(config.extractor.validation());
    let mut uploader = BatchUploader::new(upload).with_gate(gate);
    let outcomes = uploader.upload_all(&tasks, &schema, &mut store)?;

    print_json(&outcomes)
}
