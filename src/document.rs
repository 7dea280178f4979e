//! Minimal document payload carried by indexing work.
//!
//! Documents here are schema-less collections of named field values, the
//! shape in which the mapping layer hands entities to the write path. Field
//! analysis, schema inference, and storage layout all belong to the
//! underlying search engine and are out of scope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text content.
    Text(String),

    /// 64-bit signed integer.
    Integer(i64),

    /// 64-bit floating point number.
    Float(f64),

    /// Boolean value.
    Boolean(bool),

    /// Explicit null.
    Null,
}

/// A schema-less collection of named field values.
///
/// Field names are kept sorted so that rendering and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Document::default()
    }

    /// Returns a new builder for `Document`.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Add a field to the document, replacing any previous value.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if the document has a field with the given name.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over the fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The number of fields in the document.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize the document to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builder for [`Document`].
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    fields: BTreeMap<String, FieldValue>,
}

impl DocumentBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        DocumentBuilder::default()
    }

    /// Add a text field.
    pub fn add_text<S: Into<String>, V: Into<String>>(mut self, name: S, value: V) -> Self {
        self.fields.insert(name.into(), FieldValue::Text(value.into()));
        self
    }

    /// Add an integer field.
    pub fn add_integer<S: Into<String>>(mut self, name: S, value: i64) -> Self {
        self.fields.insert(name.into(), FieldValue::Integer(value));
        self
    }

    /// Add a float field.
    pub fn add_float<S: Into<String>>(mut self, name: S, value: f64) -> Self {
        self.fields.insert(name.into(), FieldValue::Float(value));
        self
    }

    /// Add a boolean field.
    pub fn add_boolean<S: Into<String>>(mut self, name: S, value: bool) -> Self {
        self.fields.insert(name.into(), FieldValue::Boolean(value));
        self
    }

    /// Build the `Document`.
    pub fn build(self) -> Document {
        Document {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let doc = Document::builder()
            .add_text("title", "Rust Programming Guide")
            .add_integer("year", 2024)
            .add_float("price", 39.99)
            .add_boolean("in_stock", true)
            .build();

        assert_eq!(doc.len(), 4);
        assert!(doc.has_field("title"));
        assert_eq!(doc.fields().count(), 4);
        assert_eq!(
            doc.field("year"),
            Some(&FieldValue::Integer(2024))
        );
    }

    #[test]
    fn test_add_field_replaces() {
        let mut doc = Document::new();
        doc.add_field("title", FieldValue::Text("old".to_string()));
        doc.add_field("title", FieldValue::Text("new".to_string()));

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.field("title"), Some(&FieldValue::Text("new".to_string())));
    }

    #[test]
    fn test_to_json_is_deterministic() {
        let doc = Document::builder()
            .add_text("b", "two")
            .add_text("a", "one")
            .build();

        let json = doc.to_json().unwrap();
        // Fields render in name order regardless of insertion order.
        assert!(json.find("\"a\"").unwrap() < json.find("\"b\"").unwrap());
        assert_eq!(json, doc.to_json().unwrap());
    }
}
