//! Validated field map type for store documents.
//!
//! This module provides [`FieldMap`], a type that guarantees the value is a
//! valid document payload (a JSON object mapping field names to values).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::{Error, InvalidInputError};

/// Sentinel key marking a field as a server-assigned timestamp.
const SERVER_TIMESTAMP_KEY: &str = "$serverTimestamp";

/// A validated document field map.
///
/// This type guarantees that the value is a JSON object. The invariant is
/// enforced at construction and deserialization time, making it impossible
/// to create an invalid `FieldMap`.
///
/// A field may carry the server-timestamp sentinel
/// `{"$serverTimestamp": true}`; the store replaces it with a
/// server-assigned timestamp when the write is applied.
///
/// # Example
///
/// ```
/// use plaudit_core::FieldMap;
/// use serde_json::json;
///
/// let fields = FieldMap::new(json!({
///     "name": "Ada",
///     "comments": [],
/// })).unwrap();
///
/// assert_eq!(fields.get("name").unwrap(), "Ada");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap(Value);

impl FieldMap {
    /// Create a new `FieldMap` from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn new(value: Value) -> Result<Self, Error> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Create an empty field map.
    pub fn empty() -> Self {
        Self(json!({}))
    }

    /// Insert or replace a field, consuming and returning the map.
    ///
    /// # Example
    ///
    /// ```
    /// use plaudit_core::FieldMap;
    /// use serde_json::json;
    ///
    /// let fields = FieldMap::empty().with_field("name", json!("Ada"));
    /// assert_eq!(fields.get("name").unwrap(), "Ada");
    /// ```
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        // Safe: validated at construction
        self.0
            .as_object_mut()
            .unwrap()
            .insert(key.to_string(), value);
        self
    }

    /// Insert the server-timestamp sentinel under the given key.
    ///
    /// The store resolves the sentinel to a server-assigned timestamp at
    /// write time.
    pub fn with_server_timestamp(self, key: &str) -> Self {
        self.with_field(key, json!({ SERVER_TIMESTAMP_KEY: true }))
    }

    /// Check whether a value is the server-timestamp sentinel.
    pub fn is_server_timestamp(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|obj| obj.len() == 1 && obj.get(SERVER_TIMESTAMP_KEY).is_some())
    }

    /// Get a field from the map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterate over the field names in the map.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        // Safe: validated at construction
        self.0.as_object().unwrap().keys().map(String::as_str)
    }

    /// Get a reference to the inner JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume and return the inner JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    fn validate(value: &Value) -> Result<(), Error> {
        if !value.is_object() {
            return Err(Error::InvalidInput(InvalidInputError::FieldMap {
                reason: "field map must be a JSON object".to_string(),
            }));
        }

        Ok(())
    }
}

impl Serialize for FieldMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        FieldMap::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_field_map() {
        let fields = FieldMap::new(json!({
            "name": "Ada",
            "comments": ["first"],
        }))
        .unwrap();

        assert_eq!(fields.get("name").unwrap(), "Ada");
        assert_eq!(fields.get("comments").unwrap(), &json!(["first"]));
    }

    #[test]
    fn not_object_fails() {
        assert!(FieldMap::new(json!([1, 2, 3])).is_err());
        assert!(FieldMap::new(json!(null)).is_err());
        assert!(FieldMap::new(json!("string")).is_err());
    }

    #[test]
    fn with_field_replaces() {
        let fields = FieldMap::empty()
            .with_field("name", json!("Ada"))
            .with_field("name", json!("Grace"));
        assert_eq!(fields.get("name").unwrap(), "Grace");
    }

    #[test]
    fn server_timestamp_sentinel() {
        let fields = FieldMap::empty().with_server_timestamp("createdAt");
        assert!(FieldMap::is_server_timestamp(fields.get("createdAt").unwrap()));
        assert!(!FieldMap::is_server_timestamp(&json!("2024-01-01T00:00:00Z")));
        assert!(!FieldMap::is_server_timestamp(&json!({"other": true})));
    }

    #[test]
    fn deserialize_valid() {
        let fields: FieldMap = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(fields.get("name").unwrap(), "Ada");
    }

    #[test]
    fn deserialize_invalid_fails() {
        let result: Result<FieldMap, _> = serde_json::from_str("[1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn serialize_roundtrip() {
        let original = json!({"name": "Ada", "comments": []});
        let fields = FieldMap::new(original.clone()).unwrap();
        let serialized = serde_json::to_value(&fields).unwrap();
        assert_eq!(serialized, original);
    }
}
