//! Store-facing write payloads

use serde::{Deserialize, Serialize};

/// A typed property value, ready for the store.
///
/// Person and relation values are store-native identifiers, never names.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Title text
    Title(String),
    /// Rich text
    Text(String),
    /// Number
    Number(f64),
    /// Single option name
    Select(String),
    /// Several option names
    MultiSelect(Vec<String>),
    /// Status option name
    Status(String),
    /// ISO 8601 start date
    Date(String),
    /// User ids
    People(Vec<String>),
    /// Related page ids
    Relation(Vec<String>),
    /// Boolean
    Checkbox(bool),
    /// URL
    Url(String),
    /// Email address
    Email(String),
    /// Phone number
    Phone(String),
}

/// The record handed to the store's page-creation call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageRecord {
    /// Properties in schema order
    pub properties: Vec<(String, PropertyValue)>,
}

impl PageRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property
    pub fn push(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.push((name.into(), value));
    }

    /// Look up a property by name
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Whether no property survived encoding
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }
}

/// A workspace user as listed by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUser {
    /// Store-native user id
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
}
