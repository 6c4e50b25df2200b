//! Document and patch value types
//!
//! A `Document` is the loosely-typed `{ id, ...fields }` bag the store
//! deals in. Typed records live in `domain_records`; conversion happens
//! exactly once at this boundary.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A raw store document: an id plus a bag of fields
///
/// The `id` is kept outside the field map; `to_value` re-injects it for
/// deserialization into typed records that carry their own id field.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    /// Creates a document from an id and raw fields
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Serializes a typed record into a document
    ///
    /// The record's own `id` field, if serialized, is lifted out of the
    /// field map so the document keeps the canonical `{ id, ...fields }`
    /// shape.
    pub fn from_record<T: Serialize>(id: impl Into<String>, record: &T) -> Result<Self, StoreError> {
        let value = serde_json::to_value(record)?;
        let mut data = match value {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::RejectedWrite(format!(
                    "record must serialize to an object, got {}",
                    other
                )))
            }
        };
        data.remove("id");
        Ok(Self::new(id, data))
    }

    /// Deserializes this document into a typed record
    pub fn to_record<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(data))?)
    }

    /// Returns a field value, if present
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// A partial update to a document
///
/// Fields set to `Value::Null` are removed from the document when the
/// patch is applied, mirroring the delete-on-null semantics of the
/// backing store. Free-form payloads (payment details) must be passed
/// through [`Patch::strip_nulls`] first so absent values are dropped
/// instead of erasing fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch(Map<String, Value>);

impl Patch {
    /// Creates an empty patch
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets a field to a value
    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    /// Marks a field for removal
    pub fn unset(self, field: impl Into<String>) -> Self {
        self.set(field, Value::Null)
    }

    /// Serializes a value and sets it, failing if it is not representable
    pub fn set_record<T: Serialize>(
        self,
        field: impl Into<String>,
        record: &T,
    ) -> Result<Self, StoreError> {
        let value = serde_json::to_value(record)?;
        Ok(self.set(field, value))
    }

    /// Removes null entries so they cannot erase existing fields
    pub fn strip_nulls(mut self) -> Self {
        self.0.retain(|_, v| !v.is_null());
        self
    }

    /// Returns true if the patch carries no changes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Applies this patch to a raw field map
    pub fn apply_to(&self, data: &mut Map<String, Value>) {
        for (field, value) in &self.0 {
            if value.is_null() {
                data.remove(field);
            } else {
                data.insert(field.clone(), value.clone());
            }
        }
    }
}

/// Removes null values from a free-form JSON map
///
/// The backing store rejects undefined values in nested payloads, so
/// payment details and similar caller-supplied maps are cleaned before
/// they are embedded in a document.
pub fn strip_nulls_deep(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls_deep(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls_deep).collect()),
        other => other,
    }
}
