//! # Union Extraction
//!
//! `oneOf` / `anyOf` components and hierarchy bases become union models describing the
//! set of concrete types a value may take.

use crate::composition::{Composition, Variant};
use crate::error::AppResult;
use crate::oas::schema::Schema;
use crate::resolver::{ResolvedType, TypeResolver};
use serde::Serialize;

/// How the union was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnionKind {
    /// `oneOf`.
    OneOf,
    /// `anyOf`.
    AnyOf,
    /// Derived types of a discriminated base (`allOf` hierarchy).
    Inheritance,
}

/// Discriminator of a union.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscriminatorModel {
    /// JSON property carrying the value.
    pub property: String,
    /// `(value, type)` pairs.
    pub variants: Vec<Variant>,
}

/// A generated polymorphic type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionModel {
    /// Target type name.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Declaration form.
    pub kind: UnionKind,
    /// Discriminator, when declared.
    pub discriminator: Option<DiscriminatorModel>,
    /// Member types.
    pub members: Vec<ResolvedType>,
    /// Rendered as an abstract base.
    pub is_abstract: bool,
    /// Whether a `null` member was stripped.
    pub nullable: bool,
}

/// Builds the union `name` from a `oneOf` / `anyOf` schema.
pub fn extract_union(
    resolver: &TypeResolver<'_>,
    name: &str,
    schema: &Schema,
) -> AppResult<UnionModel> {
    let composition = Composition::new(resolver);
    let shape = composition.union_shape(name, schema)?;

    let members = crate::composition::kind::union_members(schema)
        .iter()
        .enumerate()
        .filter(|(_, member)| !member.is_null_only())
        .map(|(i, member)| resolver.resolve(member, Some(&format!("{}Option{}", name, i + 1))))
        .collect::<AppResult<Vec<_>>>()?;

    let discriminator = shape.discriminator.map(|property| DiscriminatorModel {
        property,
        variants: shape.variants,
    });

    tracing::debug!(union = name, members = members.len(), "extracted union");
    Ok(UnionModel {
        name: name.to_string(),
        description: schema.description.clone(),
        kind: if shape.exclusive {
            UnionKind::OneOf
        } else {
            UnionKind::AnyOf
        },
        is_abstract: discriminator.is_some(),
        discriminator,
        members,
        nullable: shape.nullable,
    })
}

/// Describes the hierarchy rooted at the discriminated base component `raw`.
pub fn extract_hierarchy(
    resolver: &TypeResolver<'_>,
    name: &str,
    raw: &str,
    schema: &Schema,
) -> UnionModel {
    let composition = Composition::new(resolver);
    let variants = composition.hierarchy_variants(raw);
    let members = variants
        .iter()
        .map(|v| ResolvedType::named(v.type_name.clone()))
        .collect();
    UnionModel {
        name: name.to_string(),
        description: schema.description.clone(),
        kind: UnionKind::Inheritance,
        is_abstract: !variants.is_empty(),
        discriminator: schema.discriminator.as_ref().map(|d| DiscriminatorModel {
            property: d.property_name.clone(),
            variants,
        }),
        members,
        nullable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::oas::OpenApiDocument;
    use crate::resolver::{Primitive, TypeRef};
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
openapi: 3.1.0
info: {title: Pay, version: '1'}
paths: {}
components:
  schemas:
    Card:
      type: object
      properties:
        method: {type: string}
        number: {type: string}
    Transfer:
      type: object
      properties:
        method: {type: string}
        iban: {type: string}
    Payment:
      oneOf:
        - $ref: '#/components/schemas/Card'
        - $ref: '#/components/schemas/Transfer'
      discriminator:
        propertyName: method
        mapping:
          card: '#/components/schemas/Card'
          sepa: '#/components/schemas/Transfer'
    Id:
      anyOf:
        - type: string
        - type: integer
        - type: 'null'
    Vehicle:
      type: object
      discriminator: {propertyName: type}
      properties:
        type: {type: string}
    Car:
      allOf:
        - $ref: '#/components/schemas/Vehicle'
"#;

    fn with<T>(f: impl FnOnce(&OpenApiDocument, &TypeResolver) -> T) -> T {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        f(&doc, &resolver)
    }

    #[test]
    fn test_discriminated_one_of() {
        with(|doc, r| {
            let model = extract_union(r, "Payment", doc.schema("Payment").unwrap()).unwrap();
            assert_eq!(model.kind, UnionKind::OneOf);
            assert!(model.is_abstract);
            let discriminator = model.discriminator.unwrap();
            assert_eq!(discriminator.property, "method");
            let values: Vec<&str> = discriminator.variants.iter().map(|v| v.value.as_str()).collect();
            assert_eq!(values, vec!["card", "sepa"]);
            assert_eq!(model.members[1].ty, TypeRef::named("Transfer"));
        });
    }

    #[test]
    fn test_plain_any_of() {
        with(|doc, r| {
            let model = extract_union(r, "Id", doc.schema("Id").unwrap()).unwrap();
            assert_eq!(model.kind, UnionKind::AnyOf);
            assert!(model.nullable);
            assert!(!model.is_abstract);
            assert_eq!(model.discriminator, None);
            assert_eq!(
                model.members,
                vec![
                    ResolvedType::primitive(Primitive::String),
                    ResolvedType::primitive(Primitive::Int32)
                ]
            );
        });
    }

    #[test]
    fn test_hierarchy() {
        with(|doc, r| {
            let model = extract_hierarchy(r, "Vehicle", "Vehicle", doc.schema("Vehicle").unwrap());
            assert_eq!(model.kind, UnionKind::Inheritance);
            assert!(model.is_abstract);
            assert_eq!(model.members, vec![ResolvedType::named("Car")]);
        });
    }
}
