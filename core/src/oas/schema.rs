#![deny(missing_docs)]

//! # Schema Shim
//!
//! A deserialization layer for Schema Objects covering both OpenAPI 3.0 and 3.1 shapes.
//!
//! The shape is intentionally loose: `type` may be a string or an array, `items` and
//! `additionalProperties` may be booleans, and `exclusiveMinimum` may be a boolean (3.0)
//! or a number (3.1). Boolean schemas in other positions are rewritten to objects by
//! `normalization` before this struct ever sees them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// The `type` keyword, which OAS 3.1 allows to be an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaTypeSet {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

impl SchemaTypeSet {
    /// Returns the raw type names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            SchemaTypeSet::Single(s) => vec![s.as_str()],
            SchemaTypeSet::Multiple(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// A keyword that may hold either a boolean or a nested schema
/// (`items`, `additionalProperties`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolOrSchema {
    /// `true` / `false`.
    Bool(bool),
    /// A nested Schema Object.
    Schema(Box<Schema>),
}

impl BoolOrSchema {
    /// Returns the nested schema, if this is not a boolean.
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            BoolOrSchema::Schema(s) => Some(s),
            BoolOrSchema::Bool(_) => None,
        }
    }

    /// Whether this is the literal `false`.
    pub fn is_false(&self) -> bool {
        matches!(self, BoolOrSchema::Bool(false))
    }
}

/// `exclusiveMinimum` / `exclusiveMaximum`: a flag in 3.0, a bound in 3.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// OAS 3.0 style: modifies `minimum` / `maximum`.
    Flag(bool),
    /// OAS 3.1 style: the bound itself.
    Value(Number),
}

/// The Discriminator Object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    /// Name of the property carrying the discriminating value.
    #[serde(rename = "propertyName")]
    pub property_name: String,
    /// Value -> schema reference (or bare component name).
    #[serde(default)]
    pub mapping: IndexMap<String, String>,
}

/// A Schema Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// `$ref`.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// `type`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaTypeSet>,
    /// `format`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `contentEncoding` (3.1).
    #[serde(rename = "contentEncoding", default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// `contentMediaType` (3.1).
    #[serde(rename = "contentMediaType", default, skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
    /// `nullable` (3.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// `title`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `deprecated`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// `readOnly`.
    #[serde(rename = "readOnly", default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// `writeOnly`.
    #[serde(rename = "writeOnly", default, skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    /// `default`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// `enum`.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// `const`.
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    /// `properties`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// `required`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// `additionalProperties`.
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<BoolOrSchema>,
    /// `minProperties`.
    #[serde(rename = "minProperties", default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    /// `maxProperties`.
    #[serde(rename = "maxProperties", default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,

    /// `items`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<BoolOrSchema>,
    /// `prefixItems` (3.1 tuples).
    #[serde(rename = "prefixItems", default, skip_serializing_if = "Vec::is_empty")]
    pub prefix_items: Vec<Schema>,
    /// `minItems`.
    #[serde(rename = "minItems", default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// `maxItems`.
    #[serde(rename = "maxItems", default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// `uniqueItems`.
    #[serde(rename = "uniqueItems", default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    /// `minLength`.
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// `maxLength`.
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// `pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// `minimum`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// `maximum`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// `exclusiveMinimum`.
    #[serde(
        rename = "exclusiveMinimum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exclusive_minimum: Option<ExclusiveBound>,
    /// `exclusiveMaximum`.
    #[serde(
        rename = "exclusiveMaximum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exclusive_maximum: Option<ExclusiveBound>,
    /// `multipleOf`.
    #[serde(rename = "multipleOf", default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    /// `allOf`.
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    /// `oneOf`.
    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    /// `anyOf`.
    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    /// `not`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,
    /// `discriminator`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    /// Every other keyword, including `x-` extensions.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Schema {
    /// Creates a schema holding only a `$ref`.
    pub fn reference(target: impl Into<String>) -> Self {
        Schema {
            reference: Some(target.into()),
            ..Default::default()
        }
    }

    /// Creates a schema with a single `type`.
    pub fn typed(type_name: impl Into<String>) -> Self {
        Schema {
            schema_type: Some(SchemaTypeSet::Single(type_name.into())),
            ..Default::default()
        }
    }

    /// Looks up an `x-` extension by its full key (e.g. `x-nullable`).
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Whether the schema carries any composition keyword.
    pub fn is_composition(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }

    /// Whether this schema only states `type: "null"`.
    pub fn is_null_only(&self) -> bool {
        match &self.schema_type {
            Some(set) => {
                let names = set.names();
                !names.is_empty() && names.iter().all(|n| *n == "null")
            }
            None => {
                matches!(&self.enum_values, Some(values) if values.len() == 1 && values[0].is_null())
                    || matches!(&self.const_value, Some(Value::Null))
            }
        }
    }

    /// Whether this schema is a bare `nullable: true` marker with no other structure,
    /// as used in `allOf: [{$ref}, {nullable: true}]`.
    pub fn is_nullable_marker(&self) -> bool {
        let marked = self.nullable == Some(true)
            || self.extension("x-nullable").and_then(Value::as_bool) == Some(true);
        marked
            && self.reference.is_none()
            && self.schema_type.is_none()
            && self.properties.is_empty()
            && !self.is_composition()
            && self.items.is_none()
            && self.enum_values.is_none()
    }

    /// Whether the schema carries structure that only makes sense beside `$ref` as a
    /// composition (and is therefore ignored as a `$ref` sibling).
    pub fn has_structural_keywords(&self) -> bool {
        !self.properties.is_empty()
            || self.additional_properties.is_some()
            || self.items.is_some()
            || !self.prefix_items.is_empty()
            || self.is_composition()
            || self.enum_values.is_some()
            || self.discriminator.is_some()
            || self
                .schema_type
                .as_ref()
                .is_some_and(|set| set.names().iter().any(|n| *n != "null"))
    }
}
