//! Candidate tasks - schema-conformant records extracted from one email

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Key under which the source email uid travels in serialised tasks
pub const SOURCE_UID_KEY: &str = "_mail2do_uid";

/// Generic field-typed value union.
///
/// Values come from model JSON, so the shape is loose; the schema decides
/// how a value is interpreted at validation and upload time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// Text
    Text(String),
    /// List of values (multi-select, people, relations)
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value carries nothing worth writing
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(FieldValue::is_empty),
            _ => false,
        }
    }

    /// First scalar of a list, or the value itself
    pub fn first(&self) -> &FieldValue {
        match self {
            FieldValue::List(items) => items.first().unwrap_or(&FieldValue::Null),
            other => other,
        }
    }

    /// The value as a list of scalars
    pub fn items(&self) -> Vec<&FieldValue> {
        match self {
            FieldValue::List(items) => items.iter().collect(),
            FieldValue::Null => Vec::new(),
            other => vec![other],
        }
    }

    /// Render a scalar as text (numbers without a trailing `.0`)
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Null | FieldValue::List(_) => None,
        }
    }
}

impl TryFrom<Value> for FieldValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(b)),
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .ok_or_else(|| format!("number {} is not representable", n)),
            Value::String(s) => Ok(FieldValue::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(FieldValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            // Models sometimes echo the store's own shapes: {"start": ...} for
            // dates, {"name": ...} for options.
            Value::Object(map) => {
                for key in ["start", "name"] {
                    if let Some(Value::String(s)) = map.get(key) {
                        return Ok(FieldValue::Text(s.clone()));
                    }
                }
                Err(format!("unsupported object value: {}", Value::Object(map)))
            }
        }
    }
}

impl From<&FieldValue> for Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(Value::from).collect()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::from(self))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldValue::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// A candidate task: field name → value, produced by extraction, pre-upload.
///
/// Carries no identity of its own; uniqueness is evaluated at upload time
/// against the schema's title field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateTask {
    /// Uid of the email this task was extracted from
    #[serde(
        rename = "_mail2do_uid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_uid: Option<String>,

    /// Field values keyed by schema field name, in the order the model gave them
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldValue>,
}

impl CandidateTask {
    /// Create an empty candidate for the given email
    pub fn new(source_uid: impl Into<String>) -> Self {
        Self {
            source_uid: Some(source_uid.into()),
            fields: IndexMap::new(),
        }
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style [`CandidateTask::set`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove a field, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The task's title as held in `title_field` (empty when absent)
    pub fn title(&self, title_field: &str) -> String {
        self.fields
            .get(title_field)
            .and_then(|v| v.first().to_text())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_object_values_with_start_or_name_become_text() {
        let v = FieldValue::try_from(json!({"start": "2026-10-17"})).unwrap();
        assert_eq!(v, FieldValue::Text("2026-10-17".to_string()));
        let v = FieldValue::try_from(json!({"name": "High"})).unwrap();
        assert_eq!(v, FieldValue::Text("High".to_string()));
        assert!(FieldValue::try_from(json!({"other": 1})).is_err());
    }

    #[test]
    fn test_emptiness() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::Text("  ".to_string()).is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_title_reads_first_list_entry() {
        let task = CandidateTask::new("u1").with(
            "Task name",
            FieldValue::List(vec!["First".into(), "Second".into()]),
        );
        assert_eq!(task.title("Task name"), "First");
        assert_eq!(task.title("Missing"), "");
    }

    #[test]
    fn test_serialised_task_is_flat_with_uid_tag() {
        let task = CandidateTask::new("u7").with("Task name", "Call plumber");
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value, json!({"_mail2do_uid": "u7", "Task name": "Call plumber"}));

        let parsed: CandidateTask = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut task = CandidateTask::new("u1")
            .with("Task name", "Pay rent")
            .with("Priority", "High")
            .with("Date Added", "2026-10-17");
        task.remove("Priority");
        task.set("Assignee", "Alice");

        let names: Vec<_> = task.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Task name", "Date Added", "Assignee"]);

        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"_mail2do_uid":"u1","Task name":"Pay rent","Date Added":"2026-10-17","Assignee":"Alice"}"#
        );
    }

    #[test]
    fn test_integral_numbers_render_without_fraction() {
        assert_eq!(FieldValue::Number(3.0).to_text().unwrap(), "3");
        assert_eq!(FieldValue::Number(2.5).to_text().unwrap(), "2.5");
    }

    proptest! {
        #[test]
        fn prop_text_values_survive_json(s in ".*") {
            let v = FieldValue::Text(s.clone());
            let back = FieldValue::try_from(Value::from(&v)).unwrap();
            prop_assert_eq!(back, FieldValue::Text(s));
        }

        #[test]
        fn prop_integer_lists_convert(xs in proptest::collection::vec(-1_000_000i64..1_000_000, 0..8)) {
            let v = FieldValue::try_from(json!(xs)).unwrap();
            prop_assert_eq!(v.items().len(), xs.len());
        }
    }
}
