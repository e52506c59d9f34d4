//! Schema module - the destination database's fields as runtime data

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Internal type tag for a destination field.
///
/// Every type the store recognises maps to exactly one tag. Computed store
/// types map to [`FieldType::ReadOnly`]; anything else the loader has never
/// seen maps to [`FieldType::Opaque`] so extraction degrades to plain text
/// instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// The record's title (exactly one per database)
    Title,
    /// Free text
    Text,
    /// Numeric value
    Number,
    /// One value from a fixed option set
    Select,
    /// Several values from a fixed option set
    MultiSelect,
    /// Workflow status from a fixed option set
    Status,
    /// Date or date-time (ISO 8601 start value)
    Date,
    /// One or more workspace users
    Person,
    /// Links to pages of another database
    Relation,
    /// Boolean
    Checkbox,
    /// URL
    Url,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Store-computed field that cannot be written (formula, rollup, ...)
    ReadOnly(String),
    /// Store type without an internal mapping, treated as text
    Opaque(String),
}

const READ_ONLY_KINDS: &[&str] = &[
    "formula",
    "rollup",
    "created_time",
    "created_by",
    "last_edited_time",
    "last_edited_by",
    "unique_id",
    "files",
    "button",
    "verification",
];

impl FieldType {
    /// Map a store type name to its tag. Never fails.
    pub fn from_store_type(kind: &str) -> Self {
        match kind {
            "title" => FieldType::Title,
            "rich_text" | "text" => FieldType::Text,
            "number" => FieldType::Number,
            "select" => FieldType::Select,
            "multi_select" => FieldType::MultiSelect,
            "status" => FieldType::Status,
            "date" => FieldType::Date,
            "people" | "person" => FieldType::Person,
            "relation" => FieldType::Relation,
            "checkbox" => FieldType::Checkbox,
            "url" => FieldType::Url,
            "email" => FieldType::Email,
            "phone_number" | "phone" => FieldType::Phone,
            other if READ_ONLY_KINDS.contains(&other) => FieldType::ReadOnly(other.to_string()),
            other => {
                let inner = other
                    .strip_prefix("read_only:")
                    .map(|k| FieldType::ReadOnly(k.to_string()));
                inner.unwrap_or_else(|| {
                    let kind = other.strip_prefix("opaque:").unwrap_or(other);
                    FieldType::Opaque(kind.to_string())
                })
            }
        }
    }

    /// Tag name used in prompts and in the cached descriptor
    pub fn tag(&self) -> String {
        match self {
            FieldType::Title => "title".to_string(),
            FieldType::Text => "text".to_string(),
            FieldType::Number => "number".to_string(),
            FieldType::Select => "select".to_string(),
            FieldType::MultiSelect => "multi_select".to_string(),
            FieldType::Status => "status".to_string(),
            FieldType::Date => "date".to_string(),
            FieldType::Person => "person".to_string(),
            FieldType::Relation => "relation".to_string(),
            FieldType::Checkbox => "checkbox".to_string(),
            FieldType::Url => "url".to_string(),
            FieldType::Email => "email".to_string(),
            FieldType::Phone => "phone".to_string(),
            FieldType::ReadOnly(kind) => format!("read_only:{}", kind),
            FieldType::Opaque(kind) => format!("opaque:{}", kind),
        }
    }

    /// Whether values must come from the field's allowed-value set
    pub fn has_allowed_values(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::MultiSelect | FieldType::Status
        )
    }

    /// Whether the field accepts several values
    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self,
            FieldType::MultiSelect | FieldType::Person | FieldType::Relation
        )
    }

    /// Whether the store accepts writes to this field
    pub fn is_writable(&self) -> bool {
        !matches!(self, FieldType::ReadOnly(_) | FieldType::Opaque(_))
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::from_store_type(&s)
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.tag()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Target of a relation field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTarget {
    /// Related database id
    pub database_id: String,
    /// Related database title (`?` when the database is not readable)
    pub title: String,
}

/// Where a rollup field draws its values from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupSource {
    /// Relation field of this database the rollup follows (`?` if unknown)
    pub relation_field: String,
    /// Field rolled up in the related database (`?` if unknown)
    pub rollup_field: String,
}

/// Description of one destination field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field (property) name
    pub name: String,

    /// Internal type tag
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Allowed values for select, multi-select and status fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,

    /// Related entity for relation fields, and the related database of a rollup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationTarget>,

    /// Source of a rollup field; descriptive only, rollups are never written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollup: Option<RollupSource>,

    /// Values already present in the store, used as prompt hints only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_values: Vec<String>,
}

impl FieldSpec {
    /// Create a field with no allowed values or relation target
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            allowed_values: Vec::new(),
            relation: None,
            rollup: None,
            reference_values: Vec::new(),
        }
    }

    /// Set the allowed-value set
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the relation target
    pub fn with_relation(mut self, target: RelationTarget) -> Self {
        self.relation = Some(target);
        self
    }

    /// Set the rollup source
    pub fn with_rollup(mut self, source: RollupSource) -> Self {
        self.rollup = Some(source);
        self
    }

    /// Whether `value` is in the allowed set (exact match)
    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values.iter().any(|v| v == value)
    }
}

/// Normalised description of the destination database.
///
/// Fields keep the order the store reported them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Destination database id
    pub database_id: String,

    /// Destination database title
    pub title: String,

    fields: Vec<FieldSpec>,
}

impl SchemaDescriptor {
    /// Create a descriptor; field names are assumed unique
    pub fn new(
        database_id: impl Into<String>,
        title: impl Into<String>,
        fields: Vec<FieldSpec>,
    ) -> Self {
        Self {
            database_id: database_id.into(),
            title: title.into(),
            fields,
        }
    }

    /// Look up a field by exact name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Mutable lookup, used when attaching reference values
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldSpec> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Whether a field with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// All fields in store order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Name of the title field, if the store reported one
    pub fn title_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field_type == FieldType::Title)
            .map(|f| f.name.as_str())
    }

    /// Whether any field holds people (the uploader then needs a user directory)
    pub fn has_person_fields(&self) -> bool {
        self.fields.iter().any(|f| f.field_type == FieldType::Person)
    }

    /// Set of field names, for quick membership checks in bulk
    pub fn field_names(&self) -> BTreeSet<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "db1",
            "Tasks",
            vec![
                FieldSpec::new("Task name", FieldType::Title),
                FieldSpec::new("Priority", FieldType::Select)
                    .with_allowed_values(["Low", "Medium", "High"]),
                FieldSpec::new("Assignee", FieldType::Person),
            ],
        )
    }

    #[test]
    fn test_store_type_mapping() {
        assert_eq!(FieldType::from_store_type("rich_text"), FieldType::Text);
        assert_eq!(FieldType::from_store_type("people"), FieldType::Person);
        assert_eq!(
            FieldType::from_store_type("rollup"),
            FieldType::ReadOnly("rollup".to_string())
        );
        assert_eq!(
            FieldType::from_store_type("hologram"),
            FieldType::Opaque("hologram".to_string())
        );
    }

    #[test]
    fn test_tag_round_trip_for_every_kind() {
        let kinds = [
            "title", "rich_text", "number", "select", "multi_select", "status", "date",
            "people", "relation", "checkbox", "url", "email", "phone_number", "formula",
            "mystery",
        ];
        for kind in kinds {
            let t = FieldType::from_store_type(kind);
            assert_eq!(FieldType::from_store_type(&t.tag()), t, "kind {}", kind);
        }
    }

    #[test]
    fn test_title_field_lookup() {
        assert_eq!(sample().title_field(), Some("Task name"));
    }

    #[test]
    fn test_allowed_values_are_exact() {
        let schema = sample();
        let priority = schema.field("Priority").unwrap();
        assert!(priority.allows("High"));
        assert!(!priority.allows("high"));
        assert!(!priority.allows("Urgent"));
    }

    #[test]
    fn test_descriptor_json_round_trip_keeps_order() {
        let schema = sample();
        let json = serde_json::to_string(&schema).unwrap();
        let parsed: SchemaDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
        let names: Vec<_> = parsed.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Task name", "Priority", "Assignee"]);
    }

    #[test]
    fn test_person_fields_detected() {
        assert!(sample().has_person_fields());
    }
}
