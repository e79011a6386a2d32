//! Record model: the values the engine stores and indexes.
//!
//! A [`Record`] is either a primitive (text, number, boolean, null) or a
//! container (ordered array, ordered field map). Field order is preserved
//! exactly as inserted so traversal is deterministic.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::fmt;

/// A stored value: primitive leaf or nested container.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Array(Vec<Record>),
    Object(Vec<(String, Record)>),
}

impl Record {
    /// Build an object from `(key, value)` pairs, keeping their order.
    pub fn object<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Record>,
        I: IntoIterator<Item = (K, V)>,
    {
        Record::Object(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Build an array from values.
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<Record>,
        I: IntoIterator<Item = V>,
    {
        Record::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Record::Null => "null",
            Record::Bool(_) => "boolean",
            Record::Number(_) => "number",
            Record::Text(_) => "text",
            Record::Array(_) => "array",
            Record::Object(_) => "object",
        }
    }

    /// True for text, number and boolean values: the leaves that get indexed.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Record::Bool(_) | Record::Number(_) | Record::Text(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Record::Array(_) | Record::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Record::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a field of an object by name.
    pub fn get(&self, key: &str) -> Option<&Record> {
        match self {
            Record::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Canonical searchable text of a primitive leaf, case-folded on request.
    ///
    /// Numbers and booleans use their canonical display form (`42`, `1.5`,
    /// `true`). Containers and null have no leaf text.
    pub fn leaf_text(&self, case_insensitive: bool) -> Option<String> {
        match self {
            Record::Text(s) => Some(normalize(s, case_insensitive).into_owned()),
            Record::Number(n) => Some(normalize(&n.to_string(), case_insensitive).into_owned()),
            Record::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Apply the configured case folding.
pub fn normalize(text: &str, case_insensitive: bool) -> Cow<'_, str> {
    if case_insensitive && text.chars().any(char::is_uppercase) {
        Cow::Owned(text.to_lowercase())
    } else {
        Cow::Borrowed(text)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Text(s) => f.write_str(s),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Record::Null,
            Value::Bool(b) => Record::Bool(b),
            Value::Number(n) => Record::Number(n),
            Value::String(s) => Record::Text(s),
            Value::Array(items) => Record::Array(items.into_iter().map(Record::from).collect()),
            Value::Object(map) => {
                Record::Object(map.into_iter().map(|(k, v)| (k, Record::from(v))).collect())
            }
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        match record {
            Record::Null => Value::Null,
            Record::Bool(b) => Value::Bool(b),
            Record::Number(n) => Value::Number(n),
            Record::Text(s) => Value::String(s),
            Record::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Record::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Record {
    fn from(s: &str) -> Self {
        Record::Text(s.to_string())
    }
}

impl From<String> for Record {
    fn from(s: String) -> Self {
        Record::Text(s)
    }
}

impl From<bool> for Record {
    fn from(b: bool) -> Self {
        Record::Bool(b)
    }
}

impl From<i64> for Record {
    fn from(n: i64) -> Self {
        Record::Number(n.into())
    }
}

impl From<i32> for Record {
    fn from(n: i32) -> Self {
        Record::Number(n.into())
    }
}

impl From<u64> for Record {
    fn from(n: u64) -> Self {
        Record::Number(n.into())
    }
}

impl From<f64> for Record {
    /// Non-finite floats have no JSON number form and become null.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Record::Number).unwrap_or(Record::Null)
    }
}

impl From<Vec<Record>> for Record {
    fn from(items: Vec<Record>) -> Self {
        Record::Array(items)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Record::Null => serializer.serialize_unit(),
            Record::Bool(b) => serializer.serialize_bool(*b),
            Record::Number(n) => n.serialize(serializer),
            Record::Text(s) => serializer.serialize_str(s),
            Record::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Record::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Builds records straight from the input so repeated object keys survive;
/// going through `serde_json::Map` would keep only the last of them.
struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Record, E> {
        Ok(Record::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Record, E> {
        Ok(Record::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Record, D::Error> {
        Record::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Record, E> {
        Ok(Record::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Record, E> {
        Ok(Record::from(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Record, E> {
        Ok(Record::from(n))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Record, E> {
        Ok(Record::from(n))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Record, E> {
        Ok(Record::Text(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Record, E> {
        Ok(Record::Text(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Record, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Record::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = access.next_entry::<String, Record>()? {
            fields.push((key, value));
        }
        Ok(Record::Object(fields))
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordVisitor)
    }
}

/// A search query: text, number or boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTerm {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl SearchTerm {
    /// Query text after stringification and case folding.
    pub fn normalized(&self, case_insensitive: bool) -> String {
        match self {
            SearchTerm::Text(s) => normalize(s, case_insensitive).into_owned(),
            SearchTerm::Number(n) => normalize(&n.to_string(), case_insensitive).into_owned(),
            SearchTerm::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for SearchTerm {
    fn from(s: &str) -> Self {
        SearchTerm::Text(s.to_string())
    }
}

impl From<String> for SearchTerm {
    fn from(s: String) -> Self {
        SearchTerm::Text(s)
    }
}

impl From<&String> for SearchTerm {
    fn from(s: &String) -> Self {
        SearchTerm::Text(s.clone())
    }
}

impl From<bool> for SearchTerm {
    fn from(b: bool) -> Self {
        SearchTerm::Bool(b)
    }
}

impl From<i64> for SearchTerm {
    fn from(n: i64) -> Self {
        SearchTerm::Number(n.into())
    }
}

impl From<i32> for SearchTerm {
    fn from(n: i32) -> Self {
        SearchTerm::Number(n.into())
    }
}

impl From<u64> for SearchTerm {
    fn from(n: u64) -> Self {
        SearchTerm::Number(n.into())
    }
}

impl From<f64> for SearchTerm {
    fn from(n: f64) -> Self {
        match Number::from_f64(n) {
            Some(num) => SearchTerm::Number(num),
            None => SearchTerm::Text(n.to_string()),
        }
    }
}
