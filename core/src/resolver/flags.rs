#![deny(missing_docs)]

//! # Type Flags
//!
//! Reads a schema's type flags (`type`, `nullable`, `x-nullable`, `enum`, `const`) into a
//! normalized form, and maps a primitive JSON type plus `format` / `contentEncoding` /
//! `contentMediaType` to a [`Primitive`].

use crate::oas::schema::Schema;
use crate::resolver::types::{JsonType, Primitive};
use serde_json::Value;

/// The normalized type flags of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeFlags {
    /// Non-null types in declaration order, de-duplicated. Empty means untyped.
    pub types: Vec<JsonType>,
    /// Whether `null` is accepted.
    pub includes_null: bool,
    /// Whether `types` was inferred rather than declared.
    pub inferred: bool,
}

impl TypeFlags {
    /// Reads the flags of `schema`.
    ///
    /// Nullability comes from any of: `"null"` in a type array, `nullable: true` (3.0),
    /// `x-nullable: true`, or `null` among the `enum` values. When `type` is absent the
    /// type is inferred from structural keywords, then from `enum` / `const` literals.
    pub fn of(schema: &Schema) -> Self {
        let mut flags = TypeFlags::default();

        if let Some(set) = &schema.schema_type {
            for name in set.names() {
                match JsonType::parse(name) {
                    Some(JsonType::Null) => flags.includes_null = true,
                    Some(t) => flags.push(t),
                    None => tracing::warn!(type_name = name, "ignoring unknown schema type"),
                }
            }
        }

        if schema.nullable == Some(true)
            || schema.extension("x-nullable").and_then(Value::as_bool) == Some(true)
        {
            flags.includes_null = true;
        }

        if let Some(values) = &schema.enum_values {
            if values.iter().any(Value::is_null) {
                flags.includes_null = true;
            }
        }

        if schema.schema_type.is_none() {
            flags.inferred = true;
            if !schema.properties.is_empty() || schema.additional_properties.is_some() {
                flags.push(JsonType::Object);
            } else if schema.items.is_some() || !schema.prefix_items.is_empty() {
                flags.push(JsonType::Array);
            } else if let Some(values) = &schema.enum_values {
                for value in values.iter().filter(|v| !v.is_null()) {
                    flags.push(JsonType::of_value(value));
                }
                // Mixed integral and fractional literals widen to number.
                if flags.types.contains(&JsonType::Number) {
                    flags.types.retain(|t| *t != JsonType::Integer);
                }
            } else if let Some(value) = &schema.const_value {
                match JsonType::of_value(value) {
                    JsonType::Null => flags.includes_null = true,
                    literal => flags.push(literal),
                }
            }
        }

        flags
    }

    fn push(&mut self, t: JsonType) {
        if !self.types.contains(&t) {
            self.types.push(t);
        }
    }

    /// The single non-null type, if exactly one is present.
    pub fn single(&self) -> Option<JsonType> {
        match self.types.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

/// Maps a primitive JSON type to a target primitive.
///
/// Returns `None` for `array`, `object` and `null`, which are not scalars.
pub fn resolve_primitive(
    json_type: JsonType,
    format: Option<&str>,
    content_encoding: Option<&str>,
    content_media_type: Option<&str>,
) -> Option<Primitive> {
    let primitive = match json_type {
        JsonType::Integer => match format {
            Some("int8") => Primitive::Int8,
            Some("uint8") => Primitive::UInt8,
            Some("int16") => Primitive::Int16,
            Some("int64") => Primitive::Int64,
            Some("uint32") => Primitive::UInt32,
            Some("uint64") => Primitive::UInt64,
            _ => Primitive::Int32,
        },
        JsonType::Number => match format {
            Some("float") => Primitive::Float,
            Some("decimal") => Primitive::Decimal,
            Some("int32") => Primitive::Int32,
            Some("int64") => Primitive::Int64,
            _ => Primitive::Double,
        },
        JsonType::Boolean => Primitive::Boolean,
        JsonType::String => resolve_string(format, content_encoding, content_media_type),
        JsonType::Array | JsonType::Object | JsonType::Null => return None,
    };
    Some(primitive)
}

fn resolve_string(
    format: Option<&str>,
    content_encoding: Option<&str>,
    content_media_type: Option<&str>,
) -> Primitive {
    if let Some(encoding) = content_encoding {
        if matches!(encoding.to_ascii_lowercase().as_str(), "base64" | "base64url") {
            return Primitive::Bytes;
        }
    }

    match format {
        Some("byte") => return Primitive::Bytes,
        Some("binary") => return Primitive::Binary,
        _ => {}
    }

    if content_encoding.is_none() && content_media_type.is_some_and(is_binary_media_type) {
        return Primitive::Binary;
    }

    match format {
        Some("date-time") => Primitive::DateTime,
        Some("date") => Primitive::Date,
        Some("time") => Primitive::Time,
        Some("duration") => Primitive::Duration,
        Some("uuid") | Some("guid") => Primitive::Uuid,
        Some("uri") | Some("url") => Primitive::Uri,
        Some("decimal") => Primitive::Decimal,
        _ => Primitive::String,
    }
}

/// Whether a media type denotes non-textual content.
pub(crate) fn is_binary_media_type(media: &str) -> bool {
    let media = media.split(';').next().unwrap_or(media).trim();
    media == "application/octet-stream"
        || media == "application/pdf"
        || media.starts_with("image/")
        || media.starts_with("audio/")
        || media.starts_with("video/")
}
