//! Product metadata model.
//!
//! Metadata is a free-form mapping of string keys to [`MetadataValue`]s,
//! passed through the engine unmodified. A minimal required-field schema
//! ([`MetadataSchema`]) is checked at upsert time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CalyxError, Result};

/// The closed set of value variants allowed in product metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    List(Vec<MetadataValue>),
    Object(HashMap<String, MetadataValue>),
}

impl MetadataValue {
    /// Returns the string value if this is a String variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Int64 variant.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetadataValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value if this is a Float64 variant.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            MetadataValue::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a Bool variant.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list if this is a List variant.
    pub fn as_list(&self) -> Option<&[MetadataValue]> {
        match self {
            MetadataValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the nested mapping if this is an Object variant.
    pub fn as_object(&self) -> Option<&HashMap<String, MetadataValue>> {
        match self {
            MetadataValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The kind of this value, for schema checks.
    pub fn kind(&self) -> MetadataKind {
        match self {
            MetadataValue::Null => MetadataKind::Null,
            MetadataValue::Bool(_) => MetadataKind::Bool,
            MetadataValue::Int64(_) => MetadataKind::Int64,
            MetadataValue::Float64(_) => MetadataKind::Float64,
            MetadataValue::String(_) => MetadataKind::String,
            MetadataValue::List(_) => MetadataKind::List,
            MetadataValue::Object(_) => MetadataKind::Object,
        }
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::String(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int64(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        MetadataValue::Int64(v as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float64(v)
    }
}

impl From<f32> for MetadataValue {
    fn from(v: f32) -> Self {
        MetadataValue::Float64(v as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(v: Vec<MetadataValue>) -> Self {
        MetadataValue::List(v)
    }
}

/// Product metadata: arbitrary structured attributes keyed by name.
pub type Metadata = HashMap<String, MetadataValue>;

/// The value kind expected by a schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    Null,
    Bool,
    Int64,
    Float64,
    String,
    List,
    Object,
    /// Any non-null value satisfies the requirement.
    Any,
}

/// Minimal required-field schema checked against upsert metadata.
///
/// The default schema has no requirements and accepts any metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSchema {
    required: Vec<(String, MetadataKind)>,
}

impl MetadataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a field to be present with the given kind.
    pub fn require(mut self, name: impl Into<String>, kind: MetadataKind) -> Self {
        self.required.push((name.into(), kind));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Validate metadata against the schema. Every missing or mistyped
    /// field is named in the resulting error.
    pub fn validate(&self, metadata: &Metadata) -> Result<()> {
        let mut problems = Vec::new();
        for (name, kind) in &self.required {
            match metadata.get(name) {
                None => problems.push(format!("missing required field '{name}'")),
                Some(MetadataValue::Null) => {
                    problems.push(format!("required field '{name}' is null"));
                }
                Some(value) => {
                    if *kind != MetadataKind::Any && value.kind() != *kind {
                        problems.push(format!(
                            "field '{name}' has kind {:?}, expected {:?}",
                            value.kind(),
                            kind
                        ));
                    }
                }
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CalyxError::validation(problems.join("; ")))
        }
    }
}
