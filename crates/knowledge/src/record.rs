//! Records stored in a vector index and their metadata.

use serde::{Deserialize, Serialize};
use sift_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar metadata value.
///
/// Metadata is deliberately flat: nested arrays and objects are rejected when
/// a persisted file is loaded, so filters only ever compare scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl MetadataValue {
    /// Borrow the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used for comparisons between integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Loose equality: `3` matches `3.0`, everything else compares by variant.
    pub fn matches(&self, other: &MetadataValue) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Parse a CLI-style literal: `true`/`false`, `null`, integers, floats,
    /// anything else is a string.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            "null" => return Self::Null,
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Integer(i);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::String(raw.to_string()),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl TryFrom<serde_json::Value> for MetadataValue {
    type Error = AppError;

    fn try_from(value: serde_json::Value) -> AppResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    AppError::InvalidArgument(format!("unrepresentable number {}", n))
                }),
            },
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(_) => Err(AppError::InvalidArgument(
                "arrays are not allowed in metadata".to_string(),
            )),
            Value::Object(_) => Err(AppError::InvalidArgument(
                "nested objects are not allowed in metadata".to_string(),
            )),
        }
    }
}

/// Record metadata: a flat, ordered map of scalar values.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Convert a JSON object into [`Metadata`], rejecting non-scalar values.
pub fn metadata_from_json(
    object: serde_json::Map<String, serde_json::Value>,
) -> AppResult<Metadata> {
    object
        .into_iter()
        .map(|(key, value)| match MetadataValue::try_from(value) {
            Ok(v) => Ok((key, v)),
            Err(e) => Err(AppError::InvalidArgument(format!("key '{}': {}", key, e))),
        })
        .collect()
}

/// A single entry in a vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier within one index
    pub id: String,

    /// Text the embedding was computed from
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,

    /// Scalar metadata used for filtering and presentation
    #[serde(default)]
    pub metadata: Metadata,
}

impl Record {
    /// Create a record with empty metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Embedding length.
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}
