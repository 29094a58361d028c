//! Generic wrapper for JSON service responses.
//!
//! Both remote services answer with loosely structured JSON documents. An
//! [`Entity`] holds such a document as a typed tree: nested objects become
//! child entities, lists keep their order, and scalars are stored unchanged.
//! Lookups that the caller depends on go through the `require*` accessors,
//! which fail with a named field instead of silently returning nothing.

mod field;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

pub use field::Field;

use crate::error::PublishError;

/// A JSON object converted into named fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Entity {
    fields: BTreeMap<String, Field>,
}

impl Entity {
    /// Creates an entity with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw JSON text. The top-level value must be an object.
    pub fn from_json_str(text: &str) -> Result<Self, PublishError> {
        let value: Value = serde_json::from_str(text).map_err(PublishError::EntityParse)?;
        Self::from_value(value)
    }

    /// Wraps an already parsed response body. The value must be an object.
    pub fn from_value(value: Value) -> Result<Self, PublishError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(PublishError::NotAnObject {
                found: value_kind(&other),
            }),
        }
    }

    /// Wraps an explicit mapping.
    pub fn from_map(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(key, value)| (key, Field::from(value)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Returns the field or a [`PublishError::MissingField`].
    pub fn require(&self, key: &str) -> Result<&Field, PublishError> {
        self.fields.get(key).ok_or_else(|| PublishError::MissingField {
            field: key.to_string(),
        })
    }

    pub fn require_str(&self, key: &str) -> Result<&str, PublishError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| type_error(key, "a string"))
    }

    pub fn require_entity(&self, key: &str) -> Result<&Entity, PublishError> {
        self.require(key)?
            .as_entity()
            .ok_or_else(|| type_error(key, "an object"))
    }

    pub fn require_list(&self, key: &str) -> Result<&[Field], PublishError> {
        self.require(key)?
            .as_list()
            .ok_or_else(|| type_error(key, "a list"))
    }

    /// Returns a string field, treating absence and other types alike.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Field::as_str)
    }

    /// Inserts or replaces a field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Field>) -> Option<Field> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serializes every stored field, recursing into nested entities.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, field)| (key.clone(), Value::from(field)))
                .collect(),
        )
    }
}

impl FromIterator<(String, Field)> for Entity {
    fn from_iter<I: IntoIterator<Item = (String, Field)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_pretty() {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Collects the possible construction sources for an [`Entity`].
///
/// Exactly one source is normally supplied. When several are, the raw text
/// wins over a parsed response, which wins over an explicit mapping, which
/// wins over individual fields.
#[derive(Debug, Default)]
pub struct EntityBuilder {
    text: Option<String>,
    response: Option<Value>,
    props: Option<Map<String, Value>>,
    fields: Vec<(String, Field)>,
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn response(mut self, body: Value) -> Self {
        self.response = Some(body);
        self
    }

    pub fn props(mut self, props: Map<String, Value>) -> Self {
        self.props = Some(props);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Field>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Entity, PublishError> {
        if let Some(text) = self.text {
            Entity::from_json_str(&text)
        } else if let Some(body) = self.response {
            Entity::from_value(body)
        } else if let Some(props) = self.props {
            Ok(Entity::from_map(props))
        } else {
            Ok(self.fields.into_iter().collect())
        }
    }
}

fn type_error(key: &str, expected: &'static str) -> PublishError {
    PublishError::FieldType {
        field: key.to_string(),
        expected,
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
