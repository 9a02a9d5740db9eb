#![deny(missing_docs)]

//! # Component Classification
//!
//! Decides what a component schema becomes: a generated named type (record, enum, tuple,
//! union) or an alias whose references are inlined at every use site.

use crate::oas::schema::Schema;
use crate::oas::OpenApiDocument;
use crate::resolver::flags::TypeFlags;
use crate::resolver::types::JsonType;
use serde::Serialize;
use serde_json::Value;

/// What a component schema is generated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    /// An object with properties, or an `allOf` composite.
    Record,
    /// A string or integer enumeration.
    Enum,
    /// A `prefixItems` tuple.
    Tuple,
    /// A `oneOf` / `anyOf` with two or more non-null members.
    Union,
    /// An object declaring a `discriminator`: the base of an `allOf` hierarchy.
    Hierarchy,
    /// No named representation: references are replaced by the target's resolution.
    Alias,
}

impl ComponentKind {
    /// Whether references to this component resolve to its name.
    pub fn is_named(&self) -> bool {
        !matches!(self, ComponentKind::Alias)
    }

    /// Whether the component is generated as a class with properties.
    pub fn is_record_like(&self) -> bool {
        matches!(self, ComponentKind::Record | ComponentKind::Hierarchy)
    }
}

/// Classifies a schema as it would be generated at the component level.
pub fn classify(schema: &Schema) -> ComponentKind {
    if schema.reference.is_some() {
        return ComponentKind::Alias;
    }
    if !schema.prefix_items.is_empty() {
        return ComponentKind::Tuple;
    }

    let union_members = union_members(schema);
    if !union_members.is_empty() {
        let non_null = union_members.iter().filter(|m| !m.is_null_only()).count();
        return if non_null >= 2 || schema.discriminator.is_some() && non_null >= 1 {
            ComponentKind::Union
        } else {
            ComponentKind::Alias
        };
    }

    if !schema.all_of.is_empty() {
        let non_null = schema
            .all_of
            .iter()
            .filter(|m| !m.is_null_only() && !m.is_nullable_marker())
            .count();
        return if non_null == 1 && schema.properties.is_empty() && schema.discriminator.is_none() {
            ComponentKind::Alias
        } else if schema.discriminator.is_some() {
            ComponentKind::Hierarchy
        } else {
            ComponentKind::Record
        };
    }

    let flags = TypeFlags::of(schema);

    if let Some(values) = &schema.enum_values {
        let has_values = !is_null_enum(values);
        match flags.single() {
            Some(JsonType::String) | Some(JsonType::Integer) if has_values => {
                return ComponentKind::Enum
            }
            Some(other) if has_values => {
                tracing::warn!(json_type = ?other, "enum of this type has no named form; inlining");
                return ComponentKind::Alias;
            }
            _ => {}
        }
    }

    if flags.single() == Some(JsonType::Object) || schema.discriminator.is_some() {
        if schema.discriminator.is_some() {
            return ComponentKind::Hierarchy;
        }
        if !schema.properties.is_empty() {
            return ComponentKind::Record;
        }
    }

    ComponentKind::Alias
}

/// Classifies a component, promoting a bare `allOf: [$ref]` to a record when the target
/// is a discriminated base (a derived type that adds no properties).
pub fn classify_component(schema: &Schema, doc: &OpenApiDocument) -> ComponentKind {
    let kind = classify(schema);
    if kind != ComponentKind::Alias || schema.all_of.is_empty() {
        return kind;
    }
    let derives = schema
        .all_of
        .iter()
        .filter_map(|member| member.reference.as_deref())
        .filter_map(|reference| doc.resolve_schema_ref(reference).ok())
        .any(|(_, target)| target.discriminator.is_some());
    if derives {
        ComponentKind::Record
    } else {
        kind
    }
}

/// The `oneOf` members, else the `anyOf` members.
pub fn union_members(schema: &Schema) -> &[Schema] {
    if !schema.one_of.is_empty() {
        &schema.one_of
    } else {
        &schema.any_of
    }
}

/// Whether a union schema lists a null-only member.
pub fn union_has_null_member(schema: &Schema) -> bool {
    union_members(schema).iter().any(Schema::is_null_only)
}

/// Whether an enum value list carries only `null`.
fn is_null_enum(values: &[Value]) -> bool {
    values.iter().all(Value::is_null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(yaml: &str) -> ComponentKind {
        classify(&serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_records() {
        assert_eq!(
            kind("type: object\nproperties:\n  id: {type: integer}"),
            ComponentKind::Record
        );
        assert_eq!(
            kind("properties:\n  id: {type: integer}"),
            ComponentKind::Record
        );
        assert_eq!(
            kind("type: object\ndiscriminator: {propertyName: kind}"),
            ComponentKind::Hierarchy
        );
        assert_eq!(
            kind("allOf:\n  - $ref: '#/components/schemas/A'\n  - type: object\n    properties:\n      x: {type: string}"),
            ComponentKind::Record
        );
    }

    #[test]
    fn test_aliases() {
        assert_eq!(kind("type: string\nformat: uuid"), ComponentKind::Alias);
        assert_eq!(kind("type: array\nitems: {type: string}"), ComponentKind::Alias);
        assert_eq!(
            kind("type: object\nadditionalProperties: {type: integer}"),
            ComponentKind::Alias
        );
        assert_eq!(kind("$ref: '#/components/schemas/A'"), ComponentKind::Alias);
        assert_eq!(
            kind("allOf:\n  - $ref: '#/components/schemas/A'\nnullable: true"),
            ComponentKind::Alias
        );
        assert_eq!(
            kind("anyOf:\n  - $ref: '#/components/schemas/A'\n  - type: 'null'"),
            ComponentKind::Alias
        );
        assert_eq!(kind("type: boolean\nenum: [true]"), ComponentKind::Alias);
    }

    #[test]
    fn test_enums_unions_tuples() {
        assert_eq!(kind("type: string\nenum: [a, b]"), ComponentKind::Enum);
        assert_eq!(kind("enum: [1, 2, 3]"), ComponentKind::Enum);
        assert_eq!(
            kind("oneOf:\n  - $ref: '#/components/schemas/A'\n  - $ref: '#/components/schemas/B'"),
            ComponentKind::Union
        );
        assert_eq!(
            kind("type: array\nprefixItems:\n  - type: number\n  - type: number"),
            ComponentKind::Tuple
        );
    }

    #[test]
    fn test_bare_derived_type_is_record() {
        let doc = OpenApiDocument::parse(
            "openapi: 3.0.0\ninfo: {title: T, version: '1'}\npaths: {}\ncomponents:\n  schemas:\n    Base:\n      type: object\n      discriminator: {propertyName: kind}\n    Leaf:\n      allOf:\n        - $ref: '#/components/schemas/Base'\n    Wrapper:\n      allOf:\n        - $ref: '#/components/schemas/Leaf'\n",
        )
        .unwrap();
        let leaf = doc.schema("Leaf").unwrap();
        assert_eq!(classify(leaf), ComponentKind::Alias);
        assert_eq!(classify_component(leaf, &doc), ComponentKind::Record);
        let wrapper = doc.schema("Wrapper").unwrap();
        assert_eq!(classify_component(wrapper, &doc), ComponentKind::Alias);
    }

    #[test]
    fn test_union_null_member() {
        let schema: Schema = serde_yaml::from_str(
            "oneOf:\n  - $ref: '#/components/schemas/A'\n  - $ref: '#/components/schemas/B'\n  - type: 'null'",
        )
        .unwrap();
        assert_eq!(classify(&schema), ComponentKind::Union);
        assert!(union_has_null_member(&schema));
    }
}
