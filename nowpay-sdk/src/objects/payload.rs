//! The untyped IPN document.

use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::{Map, Value};

/// A parsed IPN body: a JSON object with unique top-level keys.
///
/// Nested values keep the order they arrived in. Business code should
/// treat this as an opaque document and project it onto a typed view with
/// [`deserialize_into`](Self::deserialize_into) when it needs fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

/// Errors produced while parsing a raw body into a [`Payload`].
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The body is not well-formed JSON.
    #[error("malformed payload: {0}")]
    Malformed(serde_json::Error),
    /// The body is JSON, but not an object with unique keys.
    #[error("invalid payload: {0}")]
    Invalid(serde_json::Error),
}

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::Invalid(err),
            Category::Io | Category::Syntax | Category::Eof => Self::Malformed(err),
        }
    }
}

impl Payload {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Convenience accessor for string fields such as `payment_status`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Project the document onto a typed view.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Payload {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PayloadError::Invalid(de::Error::invalid_type(
                unexpected(&other),
                &"a JSON object",
            ))),
        }
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PayloadVisitor)
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = Payload;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Payload, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            // serde_json would silently keep the last value; two different
            // signers could disagree on which one was signed.
            if map.contains_key(&key) {
                return Err(de::Error::custom(format_args!("duplicate key `{key}`")));
            }
            let value: Value = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Payload(map))
    }
}
