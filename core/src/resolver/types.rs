#![deny(missing_docs)]

//! # Resolved Types
//!
//! The language-neutral result of resolving a schema: what the value *is*, whether it may
//! be null, and which validation constraints travel with it.

use serde::Serialize;
use serde_json::{Number, Value};

/// A JSON Schema primitive type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `null`
    Null,
}

impl JsonType {
    /// Parses a `type` keyword value. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(JsonType::String),
            "integer" => Some(JsonType::Integer),
            "number" => Some(JsonType::Number),
            "boolean" => Some(JsonType::Boolean),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            "null" => Some(JsonType::Null),
            _ => None,
        }
    }

    /// The JSON type of a literal value (integral numbers are `Integer`).
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }
}

/// A scalar target type picked from `type` + `format` + `contentEncoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Primitive {
    /// Signed 8-bit integer.
    Int8,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Fixed-point decimal.
    Decimal,
    /// Boolean.
    Boolean,
    /// Text.
    String,
    /// Calendar date (`format: date`).
    Date,
    /// Timestamp with offset (`format: date-time`).
    DateTime,
    /// Time of day (`format: time`).
    Time,
    /// ISO-8601 duration (`format: duration`).
    Duration,
    /// UUID.
    Uuid,
    /// Absolute URI.
    Uri,
    /// Base64 encoded bytes, carried inline in JSON.
    Bytes,
    /// Raw binary payload (streams, uploads).
    Binary,
}

/// The shape of a resolved type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRef {
    /// A scalar.
    Primitive {
        /// Which scalar.
        primitive: Primitive,
    },
    /// A generated named type (record, enum, union, tuple).
    Named {
        /// Target type name.
        name: String,
    },
    /// A homogeneous list.
    Array {
        /// Item type.
        item: Box<ResolvedType>,
        /// `uniqueItems: true` rendered as a set.
        unique: bool,
    },
    /// A string-keyed dictionary.
    Map {
        /// Value type.
        value: Box<ResolvedType>,
    },
    /// A positional tuple (`prefixItems`).
    Tuple {
        /// Positional item types.
        items: Vec<ResolvedType>,
        /// Type of items after the prefix, when the tuple is open.
        rest: Option<Box<ResolvedType>>,
    },
    /// An inline union without a generated name.
    Union {
        /// Member types.
        members: Vec<ResolvedType>,
    },
    /// Anything (untyped JSON).
    Any,
}

impl TypeRef {
    /// Shorthand for [`TypeRef::Primitive`].
    pub fn primitive(primitive: Primitive) -> Self {
        TypeRef::Primitive { primitive }
    }

    /// Shorthand for [`TypeRef::Named`].
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named { name: name.into() }
    }

    /// The generated type name, if this refers to one.
    pub fn named_type(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name } => Some(name),
            _ => None,
        }
    }
}

/// A numeric bound (`minimum` / `maximum`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bound {
    /// The limit.
    pub value: Number,
    /// Whether the limit itself is excluded.
    pub exclusive: bool,
}

/// Validation constraints carried alongside a type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Validation {
    /// `minLength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// `maxLength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// `pattern`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Bound>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Bound>,
    /// `multipleOf`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    /// `minItems`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// `maxItems`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// `uniqueItems`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    /// `minProperties`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    /// `maxProperties`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    /// Raw `format` (e.g. `email`), kept for validators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `const`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

impl Validation {
    /// Whether no constraint is set.
    pub fn is_empty(&self) -> bool {
        *self == Validation::default()
    }

    /// Overlays `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(mut self, other: &Validation) -> Validation {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field.clone(); })*
            };
        }
        overlay!(
            min_length,
            max_length,
            pattern,
            minimum,
            maximum,
            multiple_of,
            min_items,
            max_items,
            min_properties,
            max_properties,
            format,
            const_value
        );
        self.unique_items |= other.unique_items;
        self
    }
}

/// The full type decision for one schema position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedType {
    /// Shape of the value.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Whether `null` is an accepted value.
    pub nullable: bool,
    /// Constraints.
    #[serde(skip_serializing_if = "Validation::is_empty")]
    pub validation: Validation,
    /// Description (possibly overridden by `$ref` siblings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Deprecation flag.
    pub deprecated: bool,
    /// `readOnly`.
    pub read_only: bool,
    /// `writeOnly`.
    pub write_only: bool,
    /// `default`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ResolvedType {
    /// A non-null type with no metadata.
    pub fn of(ty: TypeRef) -> Self {
        ResolvedType {
            ty,
            nullable: false,
            validation: Validation::default(),
            description: None,
            deprecated: false,
            read_only: false,
            write_only: false,
            default: None,
        }
    }

    /// Shorthand for a bare primitive.
    pub fn primitive(primitive: Primitive) -> Self {
        Self::of(TypeRef::primitive(primitive))
    }

    /// Shorthand for a bare named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::of(TypeRef::named(name))
    }

    /// Shorthand for untyped JSON.
    pub fn any() -> Self {
        Self::of(TypeRef::Any)
    }

    /// Returns the same type marked nullable.
    pub fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
