//! JSON value tree produced by the converter

use indexmap::map::{Entry, IntoIter, Iter, Keys};
use indexmap::IndexMap;
use std::fmt;
use std::ops::Index;

/// A JSON value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Array),
    /// Key-value pairs in insertion order
    Object(Object),
}

impl Value {
    /// True for `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string slice if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array if this is an `Array`
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the object if this is an `Object`
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Looks up `key` when this value is an object
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Name of the JSON type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Compact JSON text
    pub fn to_json_string(&self) -> String {
        crate::json::to_string(self)
    }

    /// Indented JSON text (two spaces per level)
    pub fn to_json_pretty(&self) -> String {
        crate::json::to_string_pretty(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::Array(Array(values))
    }
}

/// An order-preserving JSON object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object(pub(crate) IndexMap<String, Value>);

impl Object {
    /// Creates an empty object
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the object has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts a key-value pair, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// True when `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Index<&str> for Object {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, key: &str) -> &Self::Output {
        &self.0[key]
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(mut self) -> Self::IntoIter {
        std::mem::take(&mut self.0).into_iter()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

/// Builds an object where a repeated key gathers its values into an array.
///
/// The first occurrence fixes the key's position; later occurrences append in
/// arrival order. A key seen once keeps its bare value.
#[derive(Debug, Default)]
pub(crate) struct GroupedObject {
    entries: IndexMap<String, Vec<Value>>,
}

impl GroupedObject {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, key: String, value: Value) {
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => slot.get_mut().push(value),
            Entry::Vacant(slot) => {
                slot.insert(vec![value]);
            }
        }
    }

    pub(crate) fn finish(self) -> Object {
        self.entries
            .into_iter()
            .map(|(key, mut values)| {
                let value = if values.len() == 1 {
                    values.pop().unwrap_or_default()
                } else {
                    Value::Array(Array(values))
                };
                (key, value)
            })
            .collect()
    }
}

/// A JSON array
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array(pub(crate) Vec<Value>);

impl Array {
    /// Creates an empty array
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the array has no items
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Item at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Appends an item
    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    /// Items in order
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl Index<usize> for Array {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(Vec::from_iter(iter))
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        if !self.0.is_empty() {
            drop_nested(std::mem::take(&mut self.0));
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        if !self.0.is_empty() {
            drop_nested(self.0.drain(..).map(|(_, value)| value).collect());
        }
    }
}

/// Drop a value tree without recursing once per nesting level
fn drop_nested(mut pending: Vec<Value>) {
    while let Some(mut value) = pending.pop() {
        match &mut value {
            Value::Array(arr) => pending.append(&mut arr.0),
            Value::Object(obj) => pending.extend(obj.0.drain(..).map(|(_, value)| value)),
            _ => {}
        }
    }
}

#[cfg(feature = "serde")]
mod ser {
    use super::{Array, Object, Value};
    use serde::ser::{SerializeMap, SerializeSeq, Serializer};
    use serde::Serialize;

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Null => serializer.serialize_unit(),
                Self::Bool(b) => serializer.serialize_bool(*b),
                Self::Number(n) => serializer.serialize_f64(*n),
                Self::String(s) => serializer.serialize_str(s),
                Self::Array(arr) => arr.serialize(serializer),
                Self::Object(obj) => obj.serialize(serializer),
            }
        }
    }

    impl Serialize for Array {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for item in self {
                seq.serialize_element(item)?;
            }
            seq.end()
        }
    }

    impl Serialize for Object {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::Null.as_str(), None);
        assert!(Value::from(Array::new()).as_array().is_some());
        assert!(Value::from(Object::new()).as_object().is_some());
        assert_eq!(Value::Number(1.0).type_name(), "number");
    }

    #[test]
    fn test_object_order_preservation() {
        let mut obj = Object::new();
        obj.insert("first", 1i32);
        obj.insert("second", 2i32);
        obj.insert("third", 3i32);

        let keys: Vec<_> = obj.keys().collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
        assert_eq!(obj["second"], Value::Number(2.0));
    }

    #[test]
    fn test_grouped_object_single_key_stays_bare() {
        let mut grouped = GroupedObject::new();
        grouped.push("a".to_string(), Value::from("1"));
        let obj = grouped.finish();
        assert_eq!(obj.get("a"), Some(&Value::from("1")));
    }

    #[test]
    fn test_grouped_object_repeated_key_becomes_array() {
        let mut grouped = GroupedObject::new();
        grouped.push("x".to_string(), Value::from("1"));
        grouped.push("y".to_string(), Value::Null);
        grouped.push("x".to_string(), Value::from("2"));
        let obj = grouped.finish();

        let keys: Vec<_> = obj.keys().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(
            obj["x"],
            Value::from(vec![Value::from("1"), Value::from("2")])
        );
    }

    #[test]
    fn test_grouped_array_value_is_not_flattened() {
        let mut grouped = GroupedObject::new();
        grouped.push("x".to_string(), Value::from(vec![Value::Null]));
        let obj = grouped.finish();
        assert_eq!(obj["x"], Value::from(vec![Value::Null]));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_matches_json_writer() {
        let mut inner = Object::new();
        inner.insert("@id", "1");
        inner.insert("#text", "a \"quoted\" value");
        let mut obj = Object::new();
        obj.insert("a", inner);
        obj.insert("b", vec![Value::Null, Value::Bool(false)]);
        let value = Value::from(obj);

        assert_eq!(
            serde_json::to_string(&value).ok(),
            Some(value.to_json_string())
        );
    }

    #[test]
    fn test_deeply_nested_value_drops() {
        let mut value = Value::from("leaf");
        for i in 0..100_000 {
            value = if i % 2 == 0 {
                Value::from(vec![value])
            } else {
                Value::from(Object::from_iter([("n".to_string(), value)]))
            };
        }
        assert_eq!(value.type_name(), "object");
        drop(value);
    }

    #[test]
    fn test_object_into_iter() {
        let mut obj = Object::new();
        obj.insert("a", 1i32);
        obj.insert("b", vec![Value::Null]);
        let entries: Vec<_> = obj.into_iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("a".to_string(), Value::Number(1.0)));
    }

    #[test]
    fn test_value_get() {
        let mut obj = Object::new();
        obj.insert("name", "Alice");
        let value = Value::from(obj);
        assert_eq!(value.get("name"), Some(&Value::from("Alice")));
        assert_eq!(value.get("age"), None);
        assert_eq!(Value::Null.get("name"), None);
    }
}
