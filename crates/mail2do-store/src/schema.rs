//! Schema Descriptor Loader
//!
//! Turns the store's raw database description into a [`SchemaDescriptor`].
//! [`descriptor_from_database`] is the pure normalisation step;
//! [`SchemaLoader`] adds the network side: related-database traversal and
//! reference values drawn from existing rows.

use crate::notion::DEFAULT_MAX_REFERENCE_ROWS;
use crate::StoreError;
use mail2do_domain::{FieldSpec, FieldType, RelationTarget, RollupSource, SchemaDescriptor};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Title used when a database has none
pub const UNTITLED: &str = "(Untitled)";

/// Title used for a related database the integration cannot read
pub const UNKNOWN_RELATED_TITLE: &str = "?";

const QUERY_PAGE_SIZE: usize = 100;

/// Read access to raw database descriptions and rows
pub trait DatabaseSource {
    /// `GET /databases/{id}`
    fn fetch_database(&self, database_id: &str) -> Result<Value, StoreError>;

    /// `POST /databases/{id}/query`
    fn query_database(&self, database_id: &str, body: &Value) -> Result<Value, StoreError>;
}

/// Database id with hyphens removed, so dashed and undashed forms compare equal
pub fn canonical_id(raw: &str) -> String {
    raw.replace('-', "")
}

fn plain_text(runs: Option<&Value>) -> String {
    runs.and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|r| r.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// Title of a raw database description, `(Untitled)` when empty
pub fn database_title(db: &Value) -> String {
    let title = plain_text(db.get("title"));
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Normalise a raw database description.
///
/// `related` maps canonical database ids to their raw descriptions; relation
/// targets missing from it get the title `?`. Rollups are traced through
/// their relation field into the related description when it is present.
///
/// # Errors
///
/// Returns [`StoreError::InvalidData`] if the description has no `id` or no
/// `properties` object.
pub fn descriptor_from_database(
    db: &Value,
    related: &HashMap<String, Value>,
) -> Result<SchemaDescriptor, StoreError> {
    let id = db
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidData("Database description has no id".to_string()))?;
    let properties = db
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            StoreError::InvalidData(format!("Database {} has no properties object", id))
        })?;

    let fields = properties
        .iter()
        .map(|(name, prop)| {
            let kind = prop.get("type").and_then(Value::as_str).unwrap_or("unknown");
            let field_type = FieldType::from_store_type(kind);
            let mut spec = FieldSpec::new(name.clone(), field_type.clone());

            if field_type.has_allowed_values() {
                let options = prop
                    .get(kind)
                    .and_then(|p| p.get("options"))
                    .and_then(Value::as_array)
                    .map(|opts| {
                        opts.iter()
                            .filter_map(|o| o.get("name").and_then(Value::as_str))
                            .map(str::to_string)
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                spec = spec.with_allowed_values(options);
            }

            if field_type == FieldType::Relation {
                if let Some(target) = relation_target(prop) {
                    spec = spec.with_relation(related_target(target, related));
                }
            }

            if kind == "rollup" {
                if let Some(rollup) = prop.get("rollup") {
                    spec = with_rollup_source(spec, rollup, properties, related);
                }
            }

            spec
        })
        .collect();

    Ok(SchemaDescriptor::new(id, database_title(db), fields))
}

fn relation_target(prop: &Value) -> Option<&str> {
    prop.get("relation")?.get("database_id")?.as_str()
}

fn related_target(database_id: &str, related: &HashMap<String, Value>) -> RelationTarget {
    let title = related
        .get(&canonical_id(database_id))
        .map(database_title)
        .unwrap_or_else(|| UNKNOWN_RELATED_TITLE.to_string());
    RelationTarget {
        database_id: database_id.to_string(),
        title,
    }
}

/// Name of the property whose id is `id` (ids compared without hyphens)
fn property_name(properties: &Map<String, Value>, id: &str) -> Option<String> {
    if id.is_empty() {
        return None;
    }
    let id = canonical_id(id);
    properties
        .iter()
        .find(|(_, p)| {
            p.get("id")
                .and_then(Value::as_str)
                .is_some_and(|pid| canonical_id(pid) == id)
        })
        .map(|(name, _)| name.clone())
}

fn with_rollup_source(
    spec: FieldSpec,
    rollup: &Value,
    properties: &Map<String, Value>,
    related: &HashMap<String, Value>,
) -> FieldSpec {
    let id_of = |key: &str| rollup.get(key).and_then(Value::as_str).unwrap_or_default();

    let relation_field = property_name(properties, id_of("relation_property_id"))
        .or_else(|| {
            rollup
                .get("relation_property_name")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
    let target = relation_field
        .as_deref()
        .and_then(|name| properties.get(name))
        .and_then(relation_target);
    let target_properties = target
        .and_then(|t| related.get(&canonical_id(t)))
        .and_then(|db| db.get("properties"))
        .and_then(Value::as_object);
    let rollup_field = target_properties
        .and_then(|props| property_name(props, id_of("rollup_property_id")))
        .or_else(|| {
            rollup
                .get("rollup_property_name")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

    let mut spec = spec.with_rollup(RollupSource {
        relation_field: relation_field.unwrap_or_else(|| UNKNOWN_RELATED_TITLE.to_string()),
        rollup_field: rollup_field.unwrap_or_else(|| UNKNOWN_RELATED_TITLE.to_string()),
    });
    if let Some(target) = target {
        spec = spec.with_relation(related_target(target, related));
    }
    spec
}

fn relation_targets(db: &Value) -> Vec<String> {
    db.get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .values()
                .filter(|p| p.get("type").and_then(Value::as_str) == Some("relation"))
                .filter_map(|p| p.get("relation")?.get("database_id")?.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Loads a [`SchemaDescriptor`] through a [`DatabaseSource`]
pub struct SchemaLoader<'a, S: DatabaseSource> {
    source: &'a S,
    max_reference_rows: usize,
    reference_values: bool,
}

impl<'a, S: DatabaseSource> SchemaLoader<'a, S> {
    /// Create a loader that also collects reference values
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            max_reference_rows: DEFAULT_MAX_REFERENCE_ROWS,
            reference_values: true,
        }
    }

    /// Cap the number of rows scanned for reference values
    pub fn with_max_reference_rows(mut self, rows: usize) -> Self {
        self.max_reference_rows = rows;
        self
    }

    /// Skip reading existing rows
    pub fn without_reference_values(mut self) -> Self {
        self.reference_values = false;
        self
    }

    /// Load the descriptor of `database_id`
    ///
    /// # Errors
    ///
    /// Fails only if the main database cannot be fetched or normalised.
    /// Unreadable related databases are logged and their titles become `?`.
    pub fn load(&self, database_id: &str) -> Result<SchemaDescriptor, StoreError> {
        let main = self.source.fetch_database(database_id)?;

        let mut pool: HashMap<String, Value> = HashMap::new();
        let mut missing: BTreeSet<String> = BTreeSet::new();
        let mut queued: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        queued.insert(canonical_id(database_id));
        for target in relation_targets(&main) {
            if queued.insert(canonical_id(&target)) {
                queue.push_back(target);
            }
        }

        while let Some(id) = queue.pop_front() {
            match self.source.fetch_database(&id) {
                Ok(db) => {
                    for target in relation_targets(&db) {
                        if queued.insert(canonical_id(&target)) {
                            queue.push_back(target);
                        }
                    }
                    pool.insert(canonical_id(&id), db);
                }
                Err(e) => {
                    debug!("Related database {} unreadable: {}", id, e);
                    missing.insert(id);
                }
            }
        }

        for id in &missing {
            warn!(
                "access to database {} is required; add it as a connection",
                id
            );
        }

        let mut descriptor = descriptor_from_database(&main, &pool)?;
        info!(
            "Loaded schema of {:?} ({} fields, {} related databases)",
            descriptor.title,
            descriptor.fields().len(),
            pool.len()
        );

        if self.reference_values {
            self.attach_reference_values(&mut descriptor);
        }

        Ok(descriptor)
    }

    fn attach_reference_values(&self, descriptor: &mut SchemaDescriptor) {
        let mut values: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut cursor: Option<String> = None;
        let mut rows = 0usize;

        loop {
            let mut body = json!({ "page_size": QUERY_PAGE_SIZE });
            if let Some(c) = &cursor {
                body["start_cursor"] = json!(c);
            }

            let reply = match self.source.query_database(&descriptor.database_id, &body) {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Could not read existing rows for reference values: {}", e);
                    break;
                }
            };

            let results = reply
                .get("results")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            rows += results.len();
            for row in results {
                collect_row_values(row, &mut values);
            }

            let has_more = reply.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            let next = reply.get("next_cursor").and_then(Value::as_str);
            match next {
                Some(next) if has_more && rows < self.max_reference_rows => {
                    cursor = Some(next.to_string())
                }
                _ => break,
            }
        }

        debug!("Scanned {} rows for reference values", rows);
        for (name, set) in values {
            if let Some(field) = descriptor.field_mut(&name) {
                field.reference_values = set.into_iter().collect();
            }
        }
    }
}

fn collect_row_values(row: &Value, values: &mut BTreeMap<String, BTreeSet<String>>) {
    let Some(properties) = row.get("properties").and_then(Value::as_object) else {
        return;
    };

    for (name, cell) in properties {
        let found: Vec<String> = match cell.get("type").and_then(Value::as_str) {
            Some("title") => {
                let text = plain_text(cell.get("title"));
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text]
                }
            }
            Some("people") => cell
                .get("people")
                .and_then(Value::as_array)
                .map(|people| {
                    people
                        .iter()
                        .filter_map(|p| p.get("name").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            Some("relation") => cell
                .get("relation")
                .and_then(Value::as_array)
                .map(|links| {
                    links
                        .iter()
                        .filter_map(|l| l.get("id").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        if !found.is_empty() {
            values.entry(name.clone()).or_default().extend(found);
        }
    }
}
