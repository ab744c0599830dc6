//! Static, versioned field schemas for metadata block payloads.
//!
//! A schema only constrains the fields it declares. Extra keys are allowed so
//! older readers keep working when a newer writer adds fields.

use crate::block::BlockData;
use crate::error::{ErkError, Result};
use crate::registry::BlockKind;
use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Bool,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Bool => "bool",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Any,
    NonEmpty,
    /// ISO-8601 date-time, e.g. `2024-01-01T00:00:00Z`. The offset may be
    /// omitted.
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub format: Format,
}

impl FieldSpec {
    pub const fn new(name: &'static str, ty: FieldType, format: Format) -> Self {
        Self { name, ty, format }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub kind: BlockKind,
    pub version: u32,
    pub required: &'static [FieldSpec],
}

impl Schema {
    /// Check every required field and collect all violations.
    pub fn check(&self, data: &BlockData) -> Vec<FieldError> {
        self.required
            .iter()
            .filter_map(|spec| check_field(spec, data.get(spec.name)))
            .collect()
    }
}

fn check_field(spec: &FieldSpec, value: Option<&Value>) -> Option<FieldError> {
    let value = match value {
        None | Some(Value::Null) => return Some(FieldError::new(spec.name, "is required")),
        Some(v) => v,
    };

    let type_ok = match spec.ty {
        FieldType::String => value.is_string(),
        FieldType::Integer => value.is_i64() || value.is_u64(),
        FieldType::Bool => value.is_bool(),
    };
    if !type_ok {
        return Some(FieldError::new(
            spec.name,
            format!("expected {}, found {}", spec.ty.as_str(), describe(value)),
        ));
    }

    let Some(s) = value.as_str() else {
        return None;
    };
    match spec.format {
        Format::Any => None,
        Format::NonEmpty if s.trim().is_empty() => {
            Some(FieldError::new(spec.name, "must not be empty"))
        }
        Format::NonEmpty => None,
        Format::Timestamp if is_timestamp(s) => None,
        Format::Timestamp => Some(FieldError::new(
            spec.name,
            format!("'{s}' is not an ISO-8601 timestamp"),
        )),
    }
}

/// RFC 3339, or the same date-time with no offset.
pub fn is_timestamp(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "map",
        Value::Tagged(_) => "tagged value",
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A block that decoded but did not satisfy its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid {kind} block: {}", join_errors(.errors))]
pub struct ValidationFailure {
    pub kind: String,
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Validate `data` against the schema registered for `kind`.
pub fn validate(kind: &str, data: &BlockData) -> Result<()> {
    let kind: BlockKind = kind
        .parse()
        .map_err(|_| ErkError::UnknownBlockKind(kind.to_string()))?;
    let errors = kind.schema().check(data);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure {
            kind: kind.to_string(),
            errors,
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
