//! Schema conformance checks for candidate tasks

use crate::{GatekeeperError, ValidationConfig, ValuePolicy};
use mail2do_domain::{CandidateTask, FieldSpec, FieldType, FieldValue, SchemaDescriptor};
use std::fmt;
use strsim::jaro_winkler;
use tracing::debug;

/// Result of candidate validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the candidate passed validation
    pub status: ValidationStatus,

    /// Rejection reasons (if any)
    pub reasons: Vec<RejectionReason>,

    /// Option values replaced under the coerce policy
    pub coercions: Vec<Coercion>,
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Candidate accepted
    Accepted,

    /// Candidate rejected
    Rejected,
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Field name not present in the schema
    UnknownField(String),

    /// Option value outside the field's allowed set
    ValueNotAllowed {
        /// Field name
        field: String,
        /// Offending value
        value: String,
    },

    /// Value shape does not fit the field type
    TypeMismatch {
        /// Field name
        field: String,
        /// What the field takes
        expected: String,
        /// What the candidate held
        found: String,
    },

    /// Value supplied for a store-computed field
    ReadOnlyField(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnknownField(name) => write!(f, "unknown field '{}'", name),
            RejectionReason::ValueNotAllowed { field, value } => {
                write!(f, "'{}' is not an allowed value of '{}'", value, field)
            }
            RejectionReason::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "'{}' expects {}, got {}", field, expected, found),
            RejectionReason::ReadOnlyField(name) => write!(f, "'{}' is read-only", name),
        }
    }
}

/// An option value replaced by its closest allowed value
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
    /// Field name
    pub field: String,
    /// Value from the candidate
    pub from: String,
    /// Allowed value written instead
    pub to: String,
}

/// Checks candidates against the destination schema
pub struct SchemaGate {
    config: ValidationConfig,
}

impl SchemaGate {
    /// Create a new gate with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a gate with default configuration (reject invalid options)
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Validate a candidate without changing it
    pub fn check(&self, task: &CandidateTask, schema: &SchemaDescriptor) -> ValidationResult {
        let mut reasons = Vec::new();
        let mut coercions = Vec::new();

        for (name, value) in &task.fields {
            let Some(spec) = schema.field(name) else {
                reasons.push(RejectionReason::UnknownField(name.clone()));
                continue;
            };

            if let Err(reason) = self.check_field(spec, value, &mut coercions) {
                reasons.push(reason);
            }
        }

        let status = if reasons.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::Rejected
        };

        ValidationResult {
            status,
            reasons,
            coercions,
        }
    }

    /// Validate a candidate and apply any coercions
    ///
    /// # Errors
    ///
    /// Returns [`GatekeeperError::SchemaViolation`] listing every rejection
    /// reason when the candidate does not conform.
    pub fn conform(
        &self,
        mut task: CandidateTask,
        schema: &SchemaDescriptor,
    ) -> Result<CandidateTask, GatekeeperError> {
        let result = self.check(&task, schema);
        if result.status == ValidationStatus::Rejected {
            let reasons: Vec<String> = result.reasons.iter().map(ToString::to_string).collect();
            return Err(GatekeeperError::SchemaViolation(reasons.join("; ")));
        }

        for coercion in result.coercions {
            debug!(
                "Coerced '{}' value '{}' to '{}'",
                coercion.field, coercion.from, coercion.to
            );
            if let Some(value) = task.fields.get_mut(&coercion.field) {
                replace_text(value, &coercion.from, &coercion.to);
            }
        }

        Ok(task)
    }

    fn check_field(
        &self,
        spec: &FieldSpec,
        value: &FieldValue,
        coercions: &mut Vec<Coercion>,
    ) -> Result<(), RejectionReason> {
        let mismatch = |expected: &str, found: String| RejectionReason::TypeMismatch {
            field: spec.name.clone(),
            expected: expected.to_string(),
            found,
        };

        if let FieldType::ReadOnly(_) = spec.field_type {
            if !value.is_empty() {
                return Err(RejectionReason::ReadOnlyField(spec.name.clone()));
            }
        }
        if value.is_empty() {
            return Ok(());
        }

        let items = value.items();
        if items.iter().any(|v| matches!(v, FieldValue::List(_))) {
            return Err(mismatch("flat values", "a nested list".to_string()));
        }
        if !spec.field_type.is_multi_valued() && items.len() > 1 {
            return Err(mismatch(
                "a single value",
                format!("a list of {}", items.len()),
            ));
        }

        match &spec.field_type {
            FieldType::Number => match value.first() {
                FieldValue::Number(_) => Ok(()),
                FieldValue::Text(s) if s.trim().parse::<f64>().is_ok() => Ok(()),
                other => Err(mismatch("a number", other.to_string())),
            },
            FieldType::Checkbox => match value.first() {
                FieldValue::Bool(_) => Ok(()),
                other => Err(mismatch("a boolean", other.to_string())),
            },
            FieldType::Select | FieldType::Status | FieldType::MultiSelect => {
                for item in items {
                    let text = item.to_text().unwrap_or_default();
                    if spec.allows(&text) {
                        continue;
                    }
                    match self.closest_allowed(spec, &text) {
                        Some(to) => coercions.push(Coercion {
                            field: spec.name.clone(),
                            from: text,
                            to,
                        }),
                        None => {
                            return Err(RejectionReason::ValueNotAllowed {
                                field: spec.name.clone(),
                                value: text,
                            })
                        }
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Closest allowed value under the coerce policy, if it clears the threshold
    fn closest_allowed(&self, spec: &FieldSpec, value: &str) -> Option<String> {
        if self.config.value_policy != ValuePolicy::Coerce {
            return None;
        }

        let needle = value.trim().to_lowercase();
        spec.allowed_values
            .iter()
            .map(|allowed| (allowed, jaro_winkler(&needle, &allowed.to_lowercase())))
            .filter(|(_, score)| *score >= self.config.coerce_threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(allowed, _)| allowed.clone())
    }
}

fn replace_text(value: &mut FieldValue, from: &str, to: &str) {
    match value {
        FieldValue::List(items) => {
            for item in items {
                replace_text(item, from, to);
            }
        }
        other => {
            if other.to_text().as_deref() == Some(from) {
                *other = FieldValue::Text(to.to_string());
            }
        }
    }
}
