/*!
# JSON-like Values

Defines the tagged union that every search in this crate runs over, along with
an insertion-ordered [`Map`] so that object keys are visited in the order the
document listed them.

Values are built once from a parsed document and never mutated afterwards:

```
use xtream_probe::value::Value;
let value = Value::try_from(r#"{"b": 1, "a": [true, null]}"#).expect("valid json");
let keys: Vec<&str> = value.as_object().unwrap().keys().collect();
assert_eq!(keys, vec!["b", "a"]);
```
*/
use indexmap::IndexMap;
use serde::Serialize;

/// A JSON-like document node.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Represents a JSON null value
    Null,
    /// Represents a JSON Boolean value
    Bool(bool),
    /// Represents a JSON number, kept in its original precision
    Number(serde_json::Number),
    /// Represents a JSON string value
    String(String),
    /// Represents a JSON array containing values of any type
    Array(Vec<Value>),
    /// Represents a JSON object with unique, ordered string keys
    Object(Map),
}

impl Value {
    /// Compute the depth of the document. Scalars have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Object(map) => 1 + map.values().map(Self::depth).max().unwrap_or(0),
            Self::Array(arr) => 1 + arr.iter().map(Self::depth).max().unwrap_or(0),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => 1,
        }
    }

    /// Returns the inner map if this value is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the inner elements if this value is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(arr) => Some(arr.as_slice()),
            _ => None,
        }
    }

    /// Returns the inner string if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Looks up `key` if this value is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Renders an identifier-like scalar (string or integer) as text, the way
    /// panel APIs interchangeably return ids.
    #[must_use]
    pub fn as_id(&self) -> Option<String> {
        match self {
            Self::String(s) if !s.is_empty() => Some(s.clone()),
            Self::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        }
    }

    /// Convert to pretty-printed JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to compact JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(values) => {
                Self::Array(values.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(obj) => {
                let mut map = Map::with_capacity(obj.len());
                for (k, v) in obj {
                    map.insert(k, Self::from(v));
                }
                Self::Object(map)
            }
        }
    }
}

// `TryFrom` since the input text may be malformed
impl TryFrom<&str> for Value {
    type Error = serde_json::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let parsed: serde_json::Value = serde_json::from_str(value)?;
        Ok(parsed.into())
    }
}

/// An object map whose iteration order is the insertion order of its keys.
///
/// Equality ignores order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Map(IndexMap<String, Value>);

impl Map {
    /// Construct an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Insert the given key-value pair. Re-inserting an existing key replaces
    /// its value but keeps its original position.
    pub fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }

    /// Retrieve the value of a given key, if it exists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, val)| (key.as_str(), val))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over values in key insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn preserves_document_key_order() {
        let value = Value::try_from(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut map = Map::new();
        map.insert("a".into(), Value::Null);
        map.insert("b".into(), Value::Null);
        map.insert("a".into(), Value::Bool(true));
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("a", &Value::Bool(true)), ("b", &Value::Null)]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn equality_ignores_key_order() {
        let left = Value::try_from(r#"{"a": 1, "b": [2]}"#).unwrap();
        let right = Value::try_from(r#"{"b": [2], "a": 1}"#).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn serializes_in_order() {
        let text = r#"{"y":[1,2.5,"x"],"b":{"n":null,"t":false}}"#;
        let value = Value::try_from(text).unwrap();
        assert_eq!(value.to_json().unwrap(), text);
    }

    #[test]
    fn depth_of_nested() {
        let value = Value::try_from(r#"{"a": [{"b": 1}], "c": 2}"#).unwrap();
        assert_eq!(value.depth(), 4);
        assert_eq!(Value::Null.depth(), 1);
        assert_eq!(Value::Array(vec![]).depth(), 1);
    }

    #[test]
    fn ids_from_strings_and_integers() {
        assert_eq!(Value::String("135".into()).as_id().as_deref(), Some("135"));
        assert_eq!(Value::try_from("17599").unwrap().as_id().as_deref(), Some("17599"));
        assert_eq!(Value::String(String::new()).as_id(), None);
        assert_eq!(Value::try_from("1.5").unwrap().as_id(), None);
        assert_eq!(Value::Null.as_id(), None);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(Value::try_from("{\"a\":").is_err());
    }
}
