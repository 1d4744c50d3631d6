// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat dotted-path records
//!
//! A [`FlatRecord`] is the wire/tabular representation of one entity: a
//! mapping from dotted attribute path to value. Iteration order is fixed so
//! output is deterministic and diffable: the reserved type key first, then
//! the identifier keys, then everything else alphabetically.

use crate::types::{Value, IDENTIFIER_PATH, TYPE_KEY};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from dotted attribute path to value, with canonical key order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatRecord {
    entries: BTreeMap<String, Value>,
}

impl FlatRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair; returns the previous value for that key
    ///
    /// Keys are unique; callers that must not overwrite check
    /// [`contains_key`](Self::contains_key) first.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Get the value stored under a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The reserved type identifier, if present
    pub fn type_uri(&self) -> Option<&str> {
        self.entries.get(TYPE_KEY).and_then(Value::as_text)
    }

    /// The entity identifier at the well-known path, if present and non-null
    pub fn identifier(&self) -> Option<&str> {
        self.entries.get(IDENTIFIER_PATH).and_then(Value::as_text)
    }

    /// Iterate entries in canonical order: type key, identifier keys,
    /// then remaining keys alphabetically
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let id_prefix = identifier_prefix();
        let type_entry = self
            .entries
            .get_key_value(TYPE_KEY)
            .into_iter()
            .map(|(k, v)| (k.as_str(), v));
        let id_entries = self
            .entries
            .iter()
            .filter(move |(k, _)| k.as_str() != TYPE_KEY && k.starts_with(id_prefix))
            .map(|(k, v)| (k.as_str(), v));
        let rest = self
            .entries
            .iter()
            .filter(move |(k, _)| k.as_str() != TYPE_KEY && !k.starts_with(id_prefix))
            .map(|(k, v)| (k.as_str(), v));
        type_entry.chain(id_entries).chain(rest)
    }

    /// Keys in canonical order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }
}

// The first segment of the identifier path groups all identity fields.
fn identifier_prefix() -> &'static str {
    match IDENTIFIER_PATH.split_once('.') {
        Some((head, _)) => head,
        None => IDENTIFIER_PATH,
    }
}

impl FromIterator<(String, Value)> for FlatRecord {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FlatRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, Value>::deserialize(deserializer).map(|entries| Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_order() {
        let mut record = FlatRecord::new();
        record.insert("naam", Value::Text("LM-1".into()));
        record.insert(TYPE_KEY, Value::Text("uri:t".into()));
        record.insert("assetId.toegekendDoor", Value::Text("agent".into()));
        record.insert(IDENTIFIER_PATH, Value::Text("1".into()));
        record.insert("breedte", Value::Float(2.0));
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(
            keys,
            vec![
                TYPE_KEY,
                IDENTIFIER_PATH,
                "assetId.toegekendDoor",
                "breedte",
                "naam",
            ]
        );
    }

    #[test]
    fn test_type_uri_and_identifier() {
        let mut record = FlatRecord::new();
        assert_eq!(record.type_uri(), None);
        record.insert(TYPE_KEY, Value::Text("uri:t".into()));
        record.insert(IDENTIFIER_PATH, Value::Text("A-1".into()));
        assert_eq!(record.type_uri(), Some("uri:t"));
        assert_eq!(record.identifier(), Some("A-1"));
    }

    #[test]
    fn test_serialize_in_canonical_order() {
        let mut record = FlatRecord::new();
        record.insert("naam", Value::Text("x".into()));
        record.insert(TYPE_KEY, Value::Text("uri:t".into()));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"typeURI":"uri:t","naam":"x"}"#);
    }
}
