//! Stamp-date command implementation.

use crate::cli::StampDateArgs;
use crate::config::Config;
use crate::error::Result;
use chrono::Local;
use mail2do_extractor::{date_line, stamp_date};
use tracing::info;

/// Execute the stamp-date command.
pub fn execute_stamp_date(args: StampDateArgs, config: &Config) -> Result<()> {
    let path = args
        .file
        .unwrap_or_else(|| config.extractor.prompt_path.clone());
    let now = Local::now().naive_local();

    stamp_date(&path, now)?;
    info!("{} stamped with '{}'", path.display(), date_line(now));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_stamps_configured_prompt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "Be brief.\n").unwrap();
        let mut config = Config::default();
        config.extractor.prompt_path = path.clone();

        execute_stamp_date(StampDateArgs { file: None }, &config).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Current date: "));
        assert!(contents.contains("Be brief."));
    }
}
