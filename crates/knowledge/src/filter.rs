//! Metadata filters applied before scoring.
//!
//! A filter is a conjunction of conditions over a record's scalar metadata.
//! An empty filter matches everything.

use crate::record::{Metadata, MetadataValue};
use serde::{Deserialize, Serialize};
use sift_core::{AppError, AppResult};

/// A single condition on one metadata key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Key present and equal to the value
    Eq { key: String, value: MetadataValue },
    /// Key absent, or present with a different value
    NotEq { key: String, value: MetadataValue },
    /// Key present and equal to one of the values
    OneOf {
        key: String,
        values: Vec<MetadataValue>,
    },
    /// Key present (any value, including null)
    Exists { key: String },
}

impl Condition {
    fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Self::Eq { key, value } => metadata.get(key).is_some_and(|v| v.matches(value)),
            Self::NotEq { key, value } => !metadata.get(key).is_some_and(|v| v.matches(value)),
            Self::OneOf { key, values } => metadata
                .get(key)
                .is_some_and(|v| values.iter().any(|candidate| v.matches(candidate))),
            Self::Exists { key } => metadata.contains_key(key),
        }
    }
}

/// Conjunction of metadata conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl MetadataFilter {
    /// Create a filter that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key == value`.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions.push(Condition::Eq {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Require `key != value` (records without the key pass).
    pub fn not_eq(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions.push(Condition::NotEq {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Require `key` to equal one of `values`.
    pub fn one_of<V>(mut self, key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<MetadataValue>,
    {
        self.conditions.push(Condition::OneOf {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Require `key` to be present.
    pub fn exists(mut self, key: impl Into<String>) -> Self {
        self.conditions.push(Condition::Exists { key: key.into() });
        self
    }

    /// Whether any condition is set.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the filter against a record's metadata.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions.iter().all(|c| c.matches(metadata))
    }

    /// Parse command-line conditions.
    ///
    /// Accepted forms: `key=value`, `key!=value`, `key=a|b|c` (one of) and a
    /// bare `key` (exists). Values are typed with
    /// [`MetadataValue::parse_literal`].
    pub fn parse_conditions<S: AsRef<str>>(raw: &[S]) -> AppResult<Self> {
        let mut filter = Self::new();

        for item in raw {
            let item = item.as_ref().trim();

            if let Some((key, value)) = item.split_once("!=") {
                filter = filter.not_eq(parse_key(key, item)?, MetadataValue::parse_literal(value));
            } else if let Some((key, value)) = item.split_once('=') {
                let key = parse_key(key, item)?;
                if value.contains('|') {
                    filter = filter.one_of(key, value.split('|').map(MetadataValue::parse_literal));
                } else {
                    filter = filter.eq(key, MetadataValue::parse_literal(value));
                }
            } else {
                filter = filter.exists(parse_key(item, item)?);
            }
        }

        Ok(filter)
    }
}

fn parse_key(key: &str, condition: &str) -> AppResult<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::InvalidArgument(format!(
            "Filter condition '{}' has no key",
            condition
        )));
    }
    Ok(key.to_string())
}
