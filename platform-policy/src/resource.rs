//! The resource being evaluated: an identity plus named attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::ResourceId;

/// Field names checked, in order, for the resource identity.
pub const IDENTITY_FIELDS: [&str; 2] = ["_id", "id"];

/// Attribute values of one resource instance.
///
/// The resource repository supplies this; the engine only reads it.
///
/// # Example
///
/// ```
/// use platform_policy::resource::FieldMap;
/// use serde_json::json;
///
/// let invoice = FieldMap::from_value(json!({
///     "_id": "65a1b2c3d4e5f60718293a4b",
///     "status": "draft",
///     "total": 120.5,
/// }));
/// assert_eq!(invoice.identity_str(), Some("65a1b2c3d4e5f60718293a4b"));
/// assert!(invoice.identity().is_some());
/// assert_eq!(invoice.get("status"), Some(&json!("draft")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: Map<String, Value>,
}

impl FieldMap {
    /// Create an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. Anything other than an object gives an
    /// empty map.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Set the identity field (`_id`).
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with("_id", Value::String(id.into()))
    }

    /// Set an attribute.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Get an attribute.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Raw identity string, from `_id` or else `id`. A non-string `_id`
    /// falls through to `id`.
    pub fn identity_str(&self) -> Option<&str> {
        IDENTITY_FIELDS
            .iter()
            .find_map(|name| self.fields.get(*name).and_then(Value::as_str))
    }

    /// Parsed identity. `None` when missing or not a valid identifier.
    pub fn identity(&self) -> Option<ResourceId> {
        self.identity_str().and_then(|s| ResourceId::parse(s).ok())
    }

    /// Number of attributes, identity included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for FieldMap {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Value> for FieldMap {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
