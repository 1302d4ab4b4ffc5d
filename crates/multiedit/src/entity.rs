//! Entities: identified records whose fields the engine folds and patches.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Entity identifier as it arrives from a backend: a JSON integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl EntityId {
    /// Reads an id from its JSON value. Floats and non-scalar values are
    /// not identifiers.
    pub fn from_value(value: &Value) -> Option<EntityId> {
        match value {
            Value::Number(n) => n.as_i64().map(EntityId::Int),
            Value::String(s) => Some(EntityId::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            EntityId::Int(n) => Value::Number((*n).into()),
            EntityId::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(n) => write!(f, "{n}"),
            EntityId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> EntityId {
        EntityId::Int(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> EntityId {
        EntityId::Str(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> EntityId {
        EntityId::Str(s)
    }
}

/// A persisted record: its identifier plus the editable fields. The id field
/// is lifted out of `fields` so folds and patches never touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub fields: Map<String, Value>,
}

impl Entity {
    pub fn new(id: EntityId, fields: Map<String, Value>) -> Entity {
        Entity { id, fields }
    }

    /// Extracts an entity from a raw JSON record, taking the identifier from
    /// `id_field` and keeping the remaining keys as editable fields.
    pub fn from_value(value: &Value, id_field: &str) -> Result<Entity, EntityError> {
        let Some(record) = value.as_object() else {
            return Err(EntityError::NotAnObject);
        };
        let raw = record.get(id_field).ok_or_else(|| EntityError::MissingId {
            field: id_field.to_string(),
        })?;
        let id = EntityId::from_value(raw).ok_or_else(|| EntityError::InvalidId {
            field: id_field.to_string(),
            found: value_kind(raw).to_string(),
        })?;
        let mut fields = record.clone();
        fields.remove(id_field);
        Ok(Entity { id, fields })
    }

    /// The raw JSON record, with the identifier written back under
    /// `id_field` ahead of the other fields.
    pub fn to_value(&self, id_field: &str) -> Value {
        let mut out = Map::new();
        out.insert(id_field.to_string(), self.id.to_value());
        for (key, value) in &self.fields {
            out.insert(key.clone(), value.clone());
        }
        Value::Object(out)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("entity must be a JSON object")]
    NotAnObject,
    #[error("missing id field {field:?}")]
    MissingId { field: String },
    #[error("id field {field:?} must be an integer or string, got {found}")]
    InvalidId { field: String, found: String },
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
