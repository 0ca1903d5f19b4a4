//! CMS query descriptors.
//!
//! A [`Query`] maps CMS parameter names to JSON values. Keys are kept sorted
//! so a descriptor always serializes to the same bytes and can be used as a
//! cache key. `null` means "unset" and is never sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, Value>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether `key` carries a non-null value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).map(|value| !value.is_null()).unwrap_or(false)
    }

    /// Shallow merge; entries of `overrides` win, including explicit nulls.
    pub fn merge(mut self, overrides: &Query) -> Self {
        for (key, value) in &overrides.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten into transport parameters.
    ///
    /// Nulls are skipped, nested objects use bracket notation
    /// (`filter_query[component][in]=page`) and arrays are comma-joined.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (key, value) in &self.0 {
            flatten_into(&mut params, key.clone(), value);
        }
        params
    }
}

fn flatten_into(params: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (child, nested) in map {
                flatten_into(params, format!("{}[{}]", key, child), nested);
            }
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            if !joined.is_empty() {
                params.push((key, joined));
            }
        }
        scalar => {
            if let Some(text) = scalar_to_string(scalar) {
                params.push((key, text));
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Query(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, Value>> for Query {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Query(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overrides_win() {
        let base = Query::new().with("per_page", 100).with("version", "published");
        let overrides = Query::new().with("version", "draft").with("sort_by", "position:asc");

        let merged = base.merge(&overrides);
        assert_eq!(merged.get_str("version"), Some("draft"));
        assert_eq!(merged.get("per_page"), Some(&json!(100)));
        assert_eq!(merged.get_str("sort_by"), Some("position:asc"));
    }

    #[test]
    fn test_merge_explicit_null_unsets() {
        let merged = Query::new()
            .with("cv", "12345")
            .merge(&Query::new().with("cv", Value::Null));
        assert!(!merged.is_set("cv"));
    }

    #[test]
    fn test_to_params_skips_nulls_and_sorts_keys() {
        let query = Query::new()
            .with("version", "published")
            .with("id", Value::Null)
            .with("page", 2)
            .with("is_startpage", false);

        assert_eq!(
            query.to_params(),
            vec![
                ("is_startpage".to_string(), "false".to_string()),
                ("page".to_string(), "2".to_string()),
                ("version".to_string(), "published".to_string()),
            ]
        );
    }

    #[test]
    fn test_to_params_flattens_nested_objects() {
        let query = Query::new().with(
            "filter_query",
            json!({"component": {"in": "article"}, "author": {"is": "jane"}}),
        );

        let params = query.to_params();
        assert!(params.contains(&("filter_query[component][in]".to_string(), "article".to_string())));
        assert!(params.contains(&("filter_query[author][is]".to_string(), "jane".to_string())));
    }

    #[test]
    fn test_to_params_joins_arrays() {
        let query = Query::new().with("by_uuids", json!(["a-1", "b-2"]));
        assert_eq!(query.to_params(), vec![("by_uuids".to_string(), "a-1,b-2".to_string())]);
    }

    #[test]
    fn test_to_params_drops_empty_objects() {
        let query = Query::new().with("meta", json!({}));
        assert!(query.to_params().is_empty());
    }

    #[test]
    fn test_serialization_is_stable() {
        let a = Query::new().with("starts_with", "en/blog").with("per_page", 100);
        let b = Query::new().with("per_page", 100).with("starts_with", "en/blog");
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            r#"{"per_page":100,"starts_with":"en/blog"}"#
        );
    }

    #[test]
    fn test_from_iterator() {
        let query: Query = vec![("path", "en/about"), ("version", "draft")].into_iter().collect();
        assert_eq!(query.len(), 2);
        assert_eq!(query.get_str("path"), Some("en/about"));
    }
}
