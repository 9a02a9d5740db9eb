//! # Record Extraction
//!
//! Builds class-like models from object schemas, `allOf` composites and hierarchy bases.

use crate::composition::{Composition, Variant};
use crate::error::{AppError, AppResult};
use crate::naming::{to_property_name, unique_name};
use crate::oas::schema::{BoolOrSchema, Schema};
use crate::resolver::{ResolvedType, TypeResolver};
use serde::Serialize;
use serde_json::Value;

/// A generated class / interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordModel {
    /// Target type name.
    pub name: String,
    /// Component name in the document, `None` for synthesized records.
    pub source_name: Option<String>,
    /// Schema description.
    pub description: Option<String>,
    /// Base record type name.
    pub base: Option<String>,
    /// Whether the record is a hierarchy base with at least one derived type.
    pub is_abstract: bool,
    /// `deprecated: true`.
    pub deprecated: bool,
    /// Own properties (inherited ones live on the base).
    pub properties: Vec<PropertyModel>,
    /// Value type of extra keys, when `additionalProperties` allows them.
    pub additional_properties: Option<ResolvedType>,
    /// Polymorphism metadata.
    pub discriminator: Option<RecordDiscriminator>,
}

/// Discriminator details of a base or derived record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDiscriminator {
    /// JSON property carrying the discriminator.
    pub property: String,
    /// This record's value (derived records).
    pub value: Option<String>,
    /// Every derived type with its value (base records).
    pub mapping: Vec<Variant>,
}

/// One property of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyModel {
    /// PascalCase member identifier.
    pub name: String,
    /// Name on the wire.
    pub json_name: String,
    /// Resolved type.
    pub ty: ResolvedType,
    /// Listed in `required`.
    pub required: bool,
    /// `readOnly`.
    pub read_only: bool,
    /// `writeOnly`.
    pub write_only: bool,
    /// `deprecated`.
    pub deprecated: bool,
    /// Description.
    pub description: Option<String>,
    /// `default`.
    pub default: Option<Value>,
    /// Whether this property is the discriminator.
    pub is_discriminator: bool,
    /// Not required and without a default.
    pub optional: bool,
}

/// Builds the record `name` from `schema`. `raw` is the component name, if any.
pub fn extract_record(
    resolver: &TypeResolver<'_>,
    name: &str,
    raw: Option<&str>,
    schema: &Schema,
) -> AppResult<RecordModel> {
    let composition = Composition::new(resolver);
    let flat = composition.flatten(raw, schema)?;
    let base = flat
        .base
        .as_deref()
        .and_then(|b| resolver.component_type_name(b))
        .map(str::to_string);

    let discriminator = match (raw, &schema.discriminator) {
        (Some(raw), Some(d)) => Some(RecordDiscriminator {
            property: d.property_name.clone(),
            value: None,
            mapping: composition.hierarchy_variants(raw),
        }),
        (Some(raw), None) => {
            inherited_discriminator(&composition, flat.base.clone(), Some(raw), name)?
        }
        (None, Some(d)) => Some(RecordDiscriminator {
            property: d.property_name.clone(),
            value: None,
            mapping: Vec::new(),
        }),
        (None, None) => inherited_discriminator(&composition, flat.base.clone(), None, name)?,
    };
    let is_abstract = discriminator
        .as_ref()
        .is_some_and(|d| d.value.is_none() && !d.mapping.is_empty());

    let mut properties: Vec<PropertyModel> = Vec::with_capacity(flat.properties.len());
    for (json_name, property_schema) in &flat.properties {
        let member = unique_name(&to_property_name(json_name), |candidate| {
            candidate == name || properties.iter().any(|p| p.name == candidate)
        });
        let hint = format!("{}{}", name, to_property_name(json_name).trim_start_matches('_'));
        let ty = resolver.resolve(property_schema, Some(&hint))?;
        let required = flat.required.iter().any(|r| r == json_name);
        properties.push(PropertyModel {
            name: member,
            json_name: json_name.clone(),
            required,
            read_only: ty.read_only,
            write_only: ty.write_only,
            deprecated: ty.deprecated,
            description: ty.description.clone(),
            default: ty.default.clone(),
            is_discriminator: discriminator
                .as_ref()
                .is_some_and(|d| d.property == *json_name),
            optional: !required && ty.default.is_none(),
            ty,
        });
    }

    let additional_properties = match &flat.additional_properties {
        Some(BoolOrSchema::Schema(value)) => {
            Some(resolver.resolve(value, Some(&format!("{}Value", name)))?)
        }
        Some(BoolOrSchema::Bool(true)) => Some(ResolvedType::any()),
        Some(BoolOrSchema::Bool(false)) | None => None,
    };

    tracing::debug!(record = name, properties = properties.len(), "extracted record");
    Ok(RecordModel {
        name: name.to_string(),
        source_name: raw.map(str::to_string),
        description: schema.description.clone(),
        base,
        is_abstract,
        deprecated: schema.deprecated.unwrap_or(false),
        properties,
        additional_properties,
        discriminator,
    })
}

/// The discriminator of the nearest ancestor that declares one, with this record's value.
fn inherited_discriminator(
    composition: &Composition<'_, '_>,
    mut base: Option<String>,
    raw: Option<&str>,
    name: &str,
) -> AppResult<Option<RecordDiscriminator>> {
    let mut seen: Vec<String> = Vec::new();
    while let Some(current) = base {
        if seen.contains(&current) {
            return Err(AppError::CircularReference(format!(
                "inheritance cycle through '{}'",
                current
            )));
        }
        let declared = composition
            .schema_of(&current)
            .and_then(|s| s.discriminator.as_ref())
            .map(|d| d.property_name.clone());
        if let Some(property) = declared {
            // Synthesized records have no mapping key; their type name is the value.
            let value = match raw {
                Some(raw) => composition.discriminator_value(&current, raw),
                None => name.to_string(),
            };
            return Ok(Some(RecordDiscriminator {
                property,
                value: Some(value),
                mapping: Vec::new(),
            }));
        }
        base = composition.base_of(&current)?;
        seen.push(current);
    }
    Ok(None)
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
info: {title: Shop, version: '1'}
paths: {}
components:
  schemas:
    Item:
      type: object
      description: A catalogue item
      required: [kind, sku]
      properties:
        kind: {type: string}
        sku: {type: string, readOnly: true}
        price: {type: number, format: decimal, default: 0}
        tags:
          type: array
          items: {type: string}
        dimensions:
          type: object
          properties:
            width: {type: number}
      additionalProperties: {type: string}
      discriminator:
        propertyName: kind
    Book:
      allOf:
        - $ref: '#/components/schemas/Item'
        - type: object
          properties:
            isbn: {type: string}
            class: {type: string}
            Class: {type: integer}
    Shelf:
      type: object
      properties:
        featured:
          allOf:
            - $ref: '#/components/schemas/Item'
            - type: object
              properties:
                rank: {type: integer}
"#;

    fn extract(raw: &str) -> (RecordModel, Vec<String>) {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        let schema = doc.schema(raw).unwrap();
        let name = resolver.component_type_name(raw).unwrap().to_string();
        let record = extract_record(&resolver, &name, Some(raw), schema).unwrap();
        let pending = resolver.take_pending().into_iter().map(|s| s.name).collect();
        (record, pending)
    }

    #[test]
    fn test_base_record() {
        let (item, pending) = extract("Item");
        assert_eq!(item.name, "Item");
        assert!(item.is_abstract);
        assert_eq!(item.description.as_deref(), Some("A catalogue item"));
        let discriminator = item.discriminator.as_ref().unwrap();
        assert_eq!(discriminator.property, "kind");
        assert_eq!(
            discriminator.mapping,
            vec![Variant { value: "Book".into(), type_name: "Book".into() }]
        );

        let kind = &item.properties[0];
        assert!(kind.is_discriminator && kind.required && !kind.optional);

        let sku = &item.properties[1];
        assert!(sku.read_only);

        let price = &item.properties[2];
        assert_eq!(price.ty.ty, TypeRef::primitive(Primitive::Decimal));
        assert!(!price.required);
        assert!(!price.optional);

        assert!(item.properties[3].optional);
        assert_eq!(item.properties[4].ty.ty, TypeRef::named("ItemDimensions"));
        assert_eq!(pending, vec!["ItemDimensions"]);
        assert_eq!(
            item.additional_properties.map(|t| t.ty),
            Some(TypeRef::primitive(Primitive::String))
        );
    }

    #[test]
    fn test_derived_record_lists_own_properties() {
        let (book, _) = extract("Book");
        assert_eq!(book.base.as_deref(), Some("Item"));
        assert!(!book.is_abstract);
        let names: Vec<&str> = book.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Isbn", "Class", "Class2"]);
        let discriminator = book.discriminator.unwrap();
        assert_eq!(discriminator.property, "kind");
        assert_eq!(discriminator.value.as_deref(), Some("Book"));
    }

    #[test]
    fn test_synthesized_derived_record_takes_its_name_as_value() {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        let shelf = doc.schema("Shelf").unwrap();
        extract_record(&resolver, "Shelf", Some("Shelf"), shelf).unwrap();

        let pending = resolver.take_pending();
        assert_eq!(pending.len(), 1);
        let featured = &pending[0];
        assert_eq!(featured.name, "ShelfFeatured");
        let record = extract_record(&resolver, &featured.name, None, &featured.schema).unwrap();
        assert_eq!(record.base.as_deref(), Some("Item"));
        let discriminator = record.discriminator.unwrap();
        assert_eq!(discriminator.property, "kind");
        assert_eq!(discriminator.value.as_deref(), Some("ShelfFeatured"));
        assert!(!record.is_abstract);
    }
}
