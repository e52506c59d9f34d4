//! Candidate task to page record mapping
//!
//! Only fields present in the descriptor are considered, in schema order.
//! Empty values are omitted, as are values that do not make sense for the
//! field's type.

use crate::PeopleDirectory;
use mail2do_domain::{
    CandidateTask, FieldSpec, FieldType, FieldValue, PageRecord, PropertyValue, SchemaDescriptor,
};
use tracing::{debug, warn};

/// Build the write payload for one candidate
pub fn build_record(
    task: &CandidateTask,
    schema: &SchemaDescriptor,
    people: &PeopleDirectory,
) -> PageRecord {
    let mut record = PageRecord::new();

    for (name, _) in &task.fields {
        if !schema.contains(name) {
            debug!("Field {:?} is not in the schema; not written", name);
        }
    }

    for spec in schema.fields() {
        let Some(value) = task.get(&spec.name) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if let Some(property) = encode_value(spec, value, people) {
            record.push(spec.name.clone(), property);
        }
    }

    record
}

fn encode_value(
    spec: &FieldSpec,
    value: &FieldValue,
    people: &PeopleDirectory,
) -> Option<PropertyValue> {
    match &spec.field_type {
        FieldType::Title => first_text(value).map(PropertyValue::Title),
        FieldType::Text => first_text(value).map(PropertyValue::Text),
        FieldType::Url => first_text(value).map(PropertyValue::Url),
        FieldType::Email => first_text(value).map(PropertyValue::Email),
        FieldType::Phone => first_text(value).map(PropertyValue::Phone),
        FieldType::Date => first_text(value).map(PropertyValue::Date),
        FieldType::Select => first_text(value).map(PropertyValue::Select),
        FieldType::Status => first_text(value).map(PropertyValue::Status),
        FieldType::Number => number(value.first()).map(PropertyValue::Number),
        FieldType::Checkbox => checkbox(value.first()).map(PropertyValue::Checkbox),
        FieldType::MultiSelect => non_empty(texts(value)).map(PropertyValue::MultiSelect),
        FieldType::Relation => non_empty(texts(value)).map(PropertyValue::Relation),
        FieldType::Person => {
            let names = texts(value);
            let ids: Vec<String> = names
                .iter()
                .filter_map(|n| {
                    let id = people.resolve(n);
                    if id.is_none() {
                        warn!("No workspace user named {:?}; dropped from {:?}", n, spec.name);
                    }
                    id.map(str::to_string)
                })
                .collect();
            non_empty(ids).map(PropertyValue::People)
        }
        FieldType::ReadOnly(_) | FieldType::Opaque(_) => None,
    }
}

fn first_text(value: &FieldValue) -> Option<String> {
    value.first().to_text().filter(|s| !s.trim().is_empty())
}

fn texts(value: &FieldValue) -> Vec<String> {
    value
        .items()
        .into_iter()
        .filter_map(FieldValue::to_text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn checkbox(value: &FieldValue) -> Option<bool> {
    match value {
        FieldValue::Bool(b) => Some(*b),
        FieldValue::Text(s) => s.trim().to_lowercase().parse().ok(),
        _ => None,
    }
}
