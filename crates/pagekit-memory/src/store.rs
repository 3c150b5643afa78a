//! Row snapshots handing out query builders.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{MemoryError, MemoryResult, MemorySource, TRACING_TARGET_SOURCE};

/// A JSON object used as a row.
pub type JsonRow = Map<String, Value>;

/// Immutable snapshot of rows, shared by every query built from it.
#[derive(Debug)]
pub struct MemoryStore<T> {
    rows: Arc<Vec<T>>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> MemoryStore<T> {
    /// Creates a store over the given rows.
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    /// Returns a fresh query over all rows.
    pub fn query(&self) -> MemorySource<T> {
        MemorySource::new(Arc::clone(&self.rows))
    }

    /// Returns the number of rows in the store.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> FromIterator<T> for MemoryStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl MemoryStore<JsonRow> {
    /// Creates a store from a JSON array of objects.
    pub fn from_json(value: Value) -> MemoryResult<Self> {
        let Value::Array(items) = value else {
            return Err(MemoryError::InvalidRows(
                "expected a JSON array of objects".into(),
            ));
        };

        let rows = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(row) => Ok(row),
                _ => Err(MemoryError::InvalidRows(format!(
                    "element {index} is not an object"
                ))),
            })
            .collect::<MemoryResult<Vec<_>>>()?;

        tracing::debug!(
            target: TRACING_TARGET_SOURCE,
            rows = rows.len(),
            "loaded rows from json"
        );

        Ok(Self::new(rows))
    }

    /// Parses a JSON array of objects and creates a store from it.
    pub fn from_json_str(input: &str) -> MemoryResult<Self> {
        Self::from_json(serde_json::from_str(input)?)
    }
}
