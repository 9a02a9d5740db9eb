#![deny(missing_docs)]

//! # OpenAPI Normalization
//!
//! Helpers that normalize OpenAPI documents into a more uniform shape before
//! deserializing them into the schema shim. These functions only rewrite fields
//! that are known compatibility gaps.

use serde_json::{json, Map, Value};

/// Keywords whose value is a single subschema.
const SINGLE_SCHEMA_KEYS: &[&str] = &[
    "schema",
    "not",
    "contains",
    "propertyNames",
    "if",
    "then",
    "else",
    "unevaluatedItems",
    "unevaluatedProperties",
];

/// Keywords whose value is a list of subschemas.
const SCHEMA_LIST_KEYS: &[&str] = &["allOf", "oneOf", "anyOf", "prefixItems"];

/// Keywords whose value is a map of subschemas.
const SCHEMA_MAP_KEYS: &[&str] = &[
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
];

/// Normalizes boolean schemas (`true` / `false`) into object schemas.
///
/// OpenAPI 3.1+ permits boolean schemas anywhere a Schema Object is accepted.
/// The schema shim keeps booleans only for `items` and `additionalProperties`,
/// where they carry their own meaning, so every other position is rewritten:
///
/// - `true` becomes `{}` (accepts any instance)
/// - `false` becomes `{"not": {}}` (accepts nothing)
pub(crate) fn normalize_boolean_schemas(value: &mut Value) {
    if let Some(schemas) = value
        .get_mut("components")
        .and_then(|c| c.get_mut("schemas"))
        .and_then(Value::as_object_mut)
    {
        for schema in schemas.values_mut() {
            rewrite_boolean(schema);
        }
    }

    normalize_schema_fields(value);
}

fn normalize_schema_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            rewrite_schema_positions(map);
            for child in map.values_mut() {
                normalize_schema_fields(child);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                normalize_schema_fields(child);
            }
        }
        _ => {}
    }
}

fn rewrite_schema_positions(map: &mut Map<String, Value>) {
    for key in SINGLE_SCHEMA_KEYS {
        if let Some(v) = map.get_mut(*key) {
            rewrite_boolean(v);
        }
    }
    for key in SCHEMA_LIST_KEYS {
        if let Some(Value::Array(items)) = map.get_mut(*key) {
            items.iter_mut().for_each(rewrite_boolean);
        }
    }
    for key in SCHEMA_MAP_KEYS {
        if let Some(Value::Object(entries)) = map.get_mut(*key) {
            entries.values_mut().for_each(rewrite_boolean);
        }
    }
}

fn rewrite_boolean(value: &mut Value) {
    match value {
        Value::Bool(true) => *value = json!({}),
        Value::Bool(false) => *value = json!({ "not": {} }),
        _ => {}
    }
}
