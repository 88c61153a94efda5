//! # JSON Schema Documents
//!
//! [`Schema`] is a JSON Schema document held as a `serde_json::Value`. It is
//! the validator type produced by [`JsonSchemaEngine`] and the type callers
//! hand to data slices. Documents only become executable once compiled by
//! the `jsonschema` crate (see [`crate::validate::SliceValidator`]).
//!
//! ## Lowering
//!
//! | Combinator | Document |
//! |------------|----------|
//! | string | `{"type": "string"}` |
//! | object | `{"type": "object", "properties": {..}, "required": [..]}` |
//! | array | `{"type": "array", "items": ..}` |
//! | all_of | `{"allOf": [..]}` |
//! | never | `{"not": {}}` |
//!
//! Objects leave `additionalProperties` unset. Intersections of object
//! shapes rely on this: each branch checks its own fields and ignores the
//! fields contributed by its siblings.
//!
//! `never` is spelled `{"not": {}}` rather than `false` because boolean
//! schemas do not exist in Draft 4.

use std::fmt;

use serde_json::{json, Map, Value};
use slice_core::NonEmpty;

use crate::engine::ValidationEngine;

/// A JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema(Value);

impl Schema {
    /// Accepts only strings.
    pub fn string() -> Self {
        Self(json!({ "type": "string" }))
    }

    /// Accepts any JSON number.
    pub fn number() -> Self {
        Self(json!({ "type": "number" }))
    }

    /// Accepts integral JSON numbers.
    pub fn integer() -> Self {
        Self(json!({ "type": "integer" }))
    }

    pub fn boolean() -> Self {
        Self(json!({ "type": "boolean" }))
    }

    pub fn null() -> Self {
        Self(json!({ "type": "null" }))
    }

    /// Accepts every value.
    pub fn any() -> Self {
        Self(json!({}))
    }

    /// Accepts no value.
    pub fn never() -> Self {
        Self(json!({ "not": {} }))
    }

    /// An object shape requiring every listed field.
    ///
    /// A key listed twice keeps the last validator and is required once.
    pub fn object<K>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self
    where
        K: Into<String>,
    {
        let mut properties = Map::new();
        let mut required: Vec<Value> = Vec::new();
        for (key, schema) in fields {
            let key = key.into();
            let entry = Value::String(key.clone());
            if !required.contains(&entry) {
                required.push(entry);
            }
            properties.insert(key, schema.0);
        }

        let mut doc = Map::new();
        doc.insert("type".to_string(), json!("object"));
        doc.insert("properties".to_string(), Value::Object(properties));
        // Draft 4 rejects an empty `required` array.
        if !required.is_empty() {
            doc.insert("required".to_string(), Value::Array(required));
        }
        Self(Value::Object(doc))
    }

    /// A sequence whose every element satisfies `element`.
    pub fn array(element: Schema) -> Self {
        Self(json!({ "type": "array", "items": element.0 }))
    }

    /// Conjunction of `schemas`, in order.
    pub fn all_of(schemas: NonEmpty<Schema>) -> Self {
        let branches: Vec<Value> = schemas.into_iter().map(Schema::into_value).collect();
        Self(json!({ "allOf": branches }))
    }

    /// Wrap an existing JSON Schema document.
    ///
    /// The document is not checked here. An invalid document surfaces as a
    /// build error when the enclosing slice is compiled.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Schema> for Value {
    fn from(schema: Schema) -> Self {
        schema.0
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine lowering every combinator to a JSON Schema document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl ValidationEngine for JsonSchemaEngine {
    type Validator = Schema;

    fn string(&self) -> Schema {
        Schema::string()
    }

    fn object(&self, fields: Vec<(String, Schema)>) -> Schema {
        Schema::object(fields)
    }

    fn array(&self, element: Schema) -> Schema {
        Schema::array(element)
    }

    fn all_of(&self, validators: NonEmpty<Schema>) -> Schema {
        Schema::all_of(validators)
    }

    fn never(&self) -> Schema {
        Schema::never()
    }
}
