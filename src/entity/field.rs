//! Field values stored inside an [`Entity`](super::Entity).

use serde::Serialize;
use serde_json::{Number, Value};

use super::Entity;

/// A single value held by an entity.
///
/// Objects never appear as raw JSON: every nested object, including objects
/// inside lists, is converted into a child [`Entity`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<Field>),
    Entity(Entity),
}

impl Field {
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Field::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Field::Number(number) => number.as_i64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Field::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Renders scalars as plain text (strings unquoted); containers as JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            Field::Text(text) => text.clone(),
            other => Value::from(other).to_string(),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Field::Null,
            Value::Bool(value) => Field::Bool(value),
            Value::Number(number) => Field::Number(number),
            Value::String(text) => Field::Text(text),
            Value::Array(items) => Field::List(items.into_iter().map(Field::from).collect()),
            Value::Object(map) => Field::Entity(Entity::from_map(map)),
        }
    }
}

impl From<&Field> for Value {
    fn from(field: &Field) -> Self {
        match field {
            Field::Null => Value::Null,
            Field::Bool(value) => Value::Bool(*value),
            Field::Number(number) => Value::Number(number.clone()),
            Field::Text(text) => Value::String(text.clone()),
            Field::List(items) => Value::Array(items.iter().map(Value::from).collect()),
            Field::Entity(entity) => entity.to_value(),
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Field::Bool(value)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Number(value.into())
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Field::Number(value.into())
    }
}

impl From<f64> for Field {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Field::Null, Field::Number)
    }
}

impl From<Entity> for Field {
    fn from(value: Entity) -> Self {
        Field::Entity(value)
    }
}

impl From<Vec<Field>> for Field {
    fn from(value: Vec<Field>) -> Self {
        Field::List(value)
    }
}
