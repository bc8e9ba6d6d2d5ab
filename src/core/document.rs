//! Untyped documents as held by the backend

use crate::core::error::{Result, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field map of a stored document
pub type Fields = serde_json::Map<String, Value>;

/// A stored document: backend-assigned id plus its field map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Shallow merge of a partial field map
    ///
    /// `null` values are stored as `null`, they do not remove the field.
    pub fn merge(&mut self, patch: Fields) {
        for (key, value) in patch {
            self.fields.insert(key, value);
        }
    }

    /// Decode into a typed record, injecting the document id as `id`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Encode a record or patch into a field map
///
/// Any `id` key is dropped: ids belong to the backend.
pub fn encode<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(ValidationError::Serialization {
            message: format!("expected an object, got {}", other),
        }
        .into()),
    }
}
