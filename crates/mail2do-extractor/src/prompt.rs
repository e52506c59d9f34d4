//! Instruction composition for task extraction

use crate::error::ExtractorError;
use chrono::NaiveDateTime;
use mail2do_domain::SchemaDescriptor;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Prefix of the timestamp line at the top of a composed instruction
pub const DATE_LINE_PREFIX: &str = "# Current date:";

/// Reference values shown per field
pub const MAX_REFERENCE_VALUES: usize = 10;

/// `# Current date: YYYY-MM-DD HH:MM`
pub fn date_line(now: NaiveDateTime) -> String {
    format!("{} {}", DATE_LINE_PREFIX, now.format("%Y-%m-%d %H:%M"))
}

fn is_date_line(line: &str) -> bool {
    line.strip_prefix('#')
        .map(|rest| rest.trim_start().starts_with("Current date:"))
        .unwrap_or(false)
}

/// Template text without a leading `# Current date:` line
pub fn strip_date_line(template: &str) -> &str {
    let mut lines = template.splitn(2, '\n');
    match lines.next() {
        Some(first) if is_date_line(first.trim_end_matches('\r')) => lines.next().unwrap_or(""),
        _ => template,
    }
}

/// Rewrite (or insert) the first line of a template file as a date line.
///
/// A missing file is created holding only the date line.
pub fn stamp_date(path: &Path, now: NaiveDateTime) -> Result<(), ExtractorError> {
    let stamp = date_line(now);
    let contents = if path.exists() {
        let existing = fs::read_to_string(path)?;
        let body = strip_date_line(&existing).trim_end_matches('\n');
        if body.is_empty() {
            format!("{}\n", stamp)
        } else {
            format!("{}\n{}\n", stamp, body)
        }
    } else {
        format!("{}\n", stamp)
    };
    fs::write(path, contents)?;
    debug!("Stamped {} with {}", path.display(), stamp);
    Ok(())
}

/// Builds the extraction instruction from a template and the schema
#[derive(Debug, Clone, PartialEq)]
pub struct PromptComposer {
    template: String,
}

impl PromptComposer {
    /// Create a composer from template text
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Composer using the built-in instruction text
    pub fn default_template() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }

    /// Read the template from `path`, falling back to the built-in text
    /// when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ExtractorError> {
        if !path.exists() {
            warn!(
                "Prompt template {} not found; using the built-in instructions",
                path.display()
            );
            return Ok(Self::default_template());
        }
        Ok(Self::new(fs::read_to_string(path)?))
    }

    /// Raw template text
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Compose the full instruction. Deterministic for a fixed `now`.
    pub fn compose(&self, schema: &SchemaDescriptor, now: NaiveDateTime) -> String {
        let mut prompt = String::new();

        // 1. Timestamp
        prompt.push_str(&date_line(now));
        prompt.push_str("\n\n");

        // 2. Schema
        prompt.push_str(&format!("Target database: {}\n", schema.title));
        prompt.push_str("Fields:\n");
        for field in schema.fields() {
            prompt.push_str(&format!("- {} ({})", field.name, field.field_type));
            if !field.allowed_values.is_empty() {
                prompt.push_str(&format!(" allowed: {}", field.allowed_values.join(", ")));
            }
            if let Some(target) = &field.relation {
                prompt.push_str(&format!(" related to: {}", target.title));
            }
            if let Some(source) = &field.rollup {
                prompt.push_str(&format!(
                    " rollup of {} via {}",
                    source.rollup_field, source.relation_field
                ));
            }
            prompt.push('\n');
        }

        // 3. Reference values
        let with_references: Vec<_> = schema
            .fields()
            .iter()
            .filter(|f| !f.reference_values.is_empty())
            .collect();
        if !with_references.is_empty() {
            prompt.push_str("Existing values for some fields (use one of these if relevant):\n");
            for field in with_references {
                let shown: Vec<&str> = field
                    .reference_values
                    .iter()
                    .take(MAX_REFERENCE_VALUES)
                    .map(String::as_str)
                    .collect();
                prompt.push_str(&format!("- {}: [{}]\n", field.name, shown.join(", ")));
            }
        }
        prompt.push('\n');

        // 4. Operator instructions
        let body = strip_date_line(&self.template).trim();
        if !body.is_empty() {
            prompt.push_str(body);
            prompt.push_str("\n\n");
        }

        // 5. Output contract
        prompt.push_str(OUTPUT_CONTRACT);
        prompt
    }
}

const DEFAULT_TEMPLATE: &str = r#"You turn one email into one to-do item for the database described above.

Rules:
- Pick the single most important action the reader of the email has to take
- Write the title as a short imperative ("Return defective kettle", not "Kettle")
- Never use a generic title such as "Task", "ToDo" or "Untitled"
- Use allowed values exactly as listed; leave a field out rather than invent a value
- Prefer the existing values shown above for people and related items
- Dates are ISO 8601 (YYYY-MM-DD), resolved against the current date
- Leave out fields the email says nothing about"#;

const OUTPUT_CONTRACT: &str = "Output a single JSON object whose keys are field names listed above. \
Use only those field names, omit unknown fields, and return only the JSON object with no markdown.";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mail2do_domain::{FieldSpec, FieldType, RelationTarget, RollupSource};
    use tempfile::tempdir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn schema() -> SchemaDescriptor {
        let mut assignee = FieldSpec::new("Assignee", FieldType::Person);
        assignee.reference_values = (0..15).map(|i| format!("Person {:02}", i)).collect();

        SchemaDescriptor::new(
            "db1",
            "Tasks",
            vec![
                FieldSpec::new("Task name", FieldType::Title),
                FieldSpec::new("Priority", FieldType::Select)
                    .with_allowed_values(["Low", "Medium", "High"]),
                FieldSpec::new("Project", FieldType::Relation).with_relation(RelationTarget {
                    database_id: "db2".to_string(),
                    title: "Projects".to_string(),
                }),
                assignee,
            ],
        )
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = PromptComposer::new("Be concise.").compose(&schema(), now());
        let lines: Vec<&str> = prompt.lines().collect();

        assert_eq!(lines[0], "# Current date: 2026-10-17 09:05");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Target database: Tasks");
        assert_eq!(lines[3], "Fields:");
        assert_eq!(lines[4], "- Task name (title)");
        assert_eq!(lines[5], "- Priority (select) allowed: Low, Medium, High");
        assert_eq!(lines[6], "- Project (relation) related to: Projects");
        assert_eq!(lines[7], "- Assignee (person)");
        assert!(prompt.contains("Be concise."));
        assert!(prompt.ends_with(OUTPUT_CONTRACT));
    }

    #[test]
    fn test_rollup_source_listed() {
        let mut fields = schema().fields().to_vec();
        fields.push(
            FieldSpec::new("Project area", FieldType::ReadOnly("rollup".to_string())).with_rollup(
                RollupSource {
                    relation_field: "Project".to_string(),
                    rollup_field: "Area".to_string(),
                },
            ),
        );
        let schema = SchemaDescriptor::new("db1", "Tasks", fields);

        let prompt = PromptComposer::new("").compose(&schema, now());
        assert!(prompt.contains("- Project area (read_only:rollup) rollup of Area via Project\n"));
    }

    #[test]
    fn test_reference_values_limited_to_10() {
        let prompt = PromptComposer::new("").compose(&schema(), now());

        assert!(prompt.contains("Existing values for some fields"));
        assert!(prompt.contains("Person 00"));
        assert!(prompt.contains("Person 09"));
        assert!(!prompt.contains("Person 10"));
    }

    #[test]
    fn test_stale_date_line_replaced() {
        let template = "# Current date: 2020-01-01 00:00\nBe concise.";
        let prompt = PromptComposer::new(template).compose(&schema(), now());

        assert!(!prompt.contains("2020-01-01"));
        assert_eq!(prompt.matches(DATE_LINE_PREFIX).count(), 1);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PromptComposer::default_template();
        assert_eq!(
            composer.compose(&schema(), now()),
            composer.compose(&schema(), now())
        );
    }

    #[test]
    fn test_strip_date_line_variants() {
        assert_eq!(strip_date_line("#Current date: x\nrest"), "rest");
        assert_eq!(strip_date_line("#  Current date: x"), "");
        assert_eq!(strip_date_line("Intro\n# Current date: x"), "Intro\n# Current date: x");
    }

    #[test]
    fn test_missing_template_uses_default() {
        let dir = tempdir().unwrap();
        let composer = PromptComposer::load(&dir.path().join("nope.txt")).unwrap();
        assert_eq!(composer, PromptComposer::default_template());
    }

    #[test]
    fn test_stamp_date_updates_or_inserts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prompt.txt");

        fs::write(&path, "Be concise.\n").unwrap();
        stamp_date(&path, now()).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Current date: 2026-10-17 09:05\nBe concise.\n"
        );

        let later = now() + chrono::Duration::hours(1);
        stamp_date(&path, later).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Current date: 2026-10-17 10:05\nBe concise.\n"
        );
    }

    #[test]
    fn test_stamp_date_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.txt");
        stamp_date(&path, now()).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Current date: 2026-10-17 09:05\n"
        );
    }
}
