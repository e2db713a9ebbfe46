//! Host-owned template context.
//!
//! The host generator owns the map and may already have filled it with
//! unrelated keys; the builder only ever writes its own output keys.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::record::Record;

/// Key-value store handed to the templating layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Stores a record list under `key`.
    pub fn set_records(&mut self, key: &str, records: &[Record]) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(records)?;
        self.insert(key, value);
        Ok(())
    }

    /// Reads back the record list stored under `key`.
    pub fn records(&self, key: &str) -> Option<Result<Vec<Record>, serde_json::Error>> {
        self.get(key)
            .map(|value| serde_json::from_value(value.clone()))
    }

    /// The whole context as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_overwrites() {
        let mut ctx = Context::new();
        ctx.insert("publications", json!([1]));
        ctx.insert("publications", json!([1, 2]));

        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get("publications"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_records_round_trip() {
        // Given: A context holding one record
        let record = Record {
            key: "k".to_string(),
            year: None,
            text: "Text.".to_string(),
            bibtex: "@misc{k\n}\n".to_string(),
            doi: String::new(),
            url: String::new(),
            pdf: None,
            slides: None,
            poster: None,
        };
        let mut ctx = Context::new();
        ctx.set_records("posters", std::slice::from_ref(&record)).unwrap();

        // When: We read it back
        let records = ctx.records("posters").unwrap().unwrap();

        // Then: The record is unchanged
        assert_eq!(records, vec![record]);
        assert!(ctx.records("publications").is_none());
    }

    #[test]
    fn test_to_json_pretty_is_flat_map() {
        let mut ctx = Context::new();
        ctx.insert("SITENAME", json!("Site"));

        let json = ctx.to_json_pretty().unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, json!({"SITENAME": "Site"}));
    }
}
