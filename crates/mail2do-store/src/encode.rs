//! Notion property encodings for page creation

use mail2do_domain::{PageRecord, PropertyValue};
use serde_json::{json, Map, Value};

/// Notion rejects rich-text runs longer than this many characters
pub const MAX_TEXT_CHARS: usize = 2000;

fn rich_text(content: &str) -> Value {
    let content: String = content.chars().take(MAX_TEXT_CHARS).collect();
    json!([{ "type": "text", "text": { "content": content } }])
}

/// Encode one property value in Notion's page-property format
pub fn encode_property(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Title(s) => json!({ "title": rich_text(s) }),
        PropertyValue::Text(s) => json!({ "rich_text": rich_text(s) }),
        PropertyValue::Number(n) => json!({ "number": n }),
        PropertyValue::Select(name) => json!({ "select": { "name": name } }),
        PropertyValue::MultiSelect(names) => json!({
            "multi_select": names.iter().map(|n| json!({ "name": n })).collect::<Vec<_>>()
        }),
        PropertyValue::Status(name) => json!({ "status": { "name": name } }),
        PropertyValue::Date(start) => json!({ "date": { "start": start } }),
        PropertyValue::People(ids) => json!({
            "people": ids.iter().map(|id| json!({ "object": "user", "id": id })).collect::<Vec<_>>()
        }),
        PropertyValue::Relation(ids) => json!({
            "relation": ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>()
        }),
        PropertyValue::Checkbox(b) => json!({ "checkbox": b }),
        PropertyValue::Url(s) => json!({ "url": s }),
        PropertyValue::Email(s) => json!({ "email": s }),
        PropertyValue::Phone(s) => json!({ "phone_number": s }),
    }
}

/// Encode every property of a record, keyed by field name
pub fn encode_properties(record: &PageRecord) -> Map<String, Value> {
    record
        .properties
        .iter()
        .map(|(name, value)| (name.clone(), encode_property(value)))
        .collect()
}

/// Full `POST /pages` body for a record in `database_id`
pub fn page_body(database_id: &str, record: &PageRecord) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": encode_properties(record),
    })
}
