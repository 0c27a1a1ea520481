//! Input and output contracts for script operations.
//!
//! Inputs are checked against [`InputRules`] through the [`Contract`] trait.
//! Outputs arrive from the model as untyped JSON and are checked against an
//! [`OutputSchema`] before they are deserialized, so a caller never sees a
//! partially populated result.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// A single violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Request input failed its contract. Lists every violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid input: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

/// Model output did not conform to the declared output schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Output of '{operation}' does not match its schema: {}", join_violations(.violations))]
pub struct SchemaMismatchError {
    pub operation: String,
    pub violations: Vec<FieldViolation>,
}

/// Limits applied to request inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputRules {
    /// Minimum prompt length in characters
    pub min_prompt_length: usize,
    /// Maximum length of any single input field in characters
    pub max_input_length: usize,
}

impl Default for InputRules {
    fn default() -> Self {
        Self {
            min_prompt_length: 10,
            max_input_length: 10000,
        }
    }
}

impl InputRules {
    /// Violations for a free-form text field that must reach `min` characters.
    pub fn check_text(&self, field: &str, value: &str, min: usize) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        let len = value.chars().count();

        if value.trim().is_empty() {
            violations.push(FieldViolation::new(field, "must not be empty"));
        } else if len < min {
            violations.push(FieldViolation::new(
                field,
                format!("must be at least {} characters long", min),
            ));
        }

        if len > self.max_input_length {
            violations.push(FieldViolation::new(
                field,
                format!("exceeds maximum length of {} characters", self.max_input_length),
            ));
        }

        violations
    }
}

/// Structural validation for request values
pub trait Contract: Sized {
    /// Every constraint this value violates; empty when valid
    fn violations(&self, rules: &InputRules) -> Vec<FieldViolation>;

    /// Return the value unchanged if it satisfies its contract
    fn validate(self, rules: &InputRules) -> Result<Self, ValidationError> {
        let violations = self.violations(rules);
        if violations.is_empty() {
            Ok(self)
        } else {
            debug!("Input rejected with {} violation(s)", violations.len());
            Err(ValidationError { violations })
        }
    }
}

/// A required string field of an output schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Shape of an operation's structured output. Every field is a required string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchema {
    fields: &'static [FieldSpec],
}

impl OutputSchema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// JSON Schema descriptor sent to the model alongside the instruction
    pub fn descriptor(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    json!({ "type": "string", "description": f.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Every way `value` fails to match this schema
    pub fn violations(&self, value: &Value) -> Vec<FieldViolation> {
        let Some(object) = value.as_object() else {
            return vec![FieldViolation::new(
                "$",
                format!("expected an object, got {}", json_type(value)),
            )];
        };

        self.fields
            .iter()
            .filter_map(|f| match object.get(f.name) {
                None | Some(Value::Null) => Some(FieldViolation::new(f.name, "is required")),
                Some(Value::String(_)) => None,
                Some(other) => Some(FieldViolation::new(
                    f.name,
                    format!("expected a string, got {}", json_type(other)),
                )),
            })
            .collect()
    }

    /// Check `value` against the schema and deserialize it
    pub fn conform<T: DeserializeOwned>(
        &self,
        operation: &str,
        value: Value,
    ) -> Result<T, SchemaMismatchError> {
        let violations = self.violations(&value);
        if !violations.is_empty() {
            return Err(SchemaMismatchError {
                operation: operation.to_string(),
                violations,
            });
        }

        serde_json::from_value(value).map_err(|e| SchemaMismatchError {
            operation: operation.to_string(),
            violations: vec![FieldViolation::new("$", e.to_string())],
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
