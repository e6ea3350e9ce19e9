use crate::core::value;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One schema-less record: column name to scalar value, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a row from `(column, value)` pairs, keeping their order.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Insert or replace a cell. Replacing keeps the column's position.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Column names in key order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell rendered as plain text; absent renders empty.
    pub fn display(&self, column: &str) -> String {
        value::display_opt(self.get(column))
    }

    /// First column from an ordered synonym list that holds a non-null value.
    pub fn first_present<'a>(&self, synonyms: &'a [String]) -> Option<(&'a str, &Value)> {
        synonyms.iter().find_map(|name| {
            self.get(name)
                .filter(|v| !v.is_null())
                .map(|v| (name.as_str(), v))
        })
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
