#![deny(missing_docs)]

//! # Composition and Polymorphism
//!
//! Interprets `allOf`, `oneOf`, `anyOf` and `discriminator`:
//!
//! * `allOf` with a record-like `$ref` is single inheritance; everything else in the
//!   `allOf` is flattened into the derived record.
//! * An object with a `discriminator` is a hierarchy base over the components that
//!   `allOf`-reference it.
//! * `oneOf` / `anyOf` are unions, discriminated when a `discriminator` is present.

pub mod kind;

pub use kind::{classify, classify_component, ComponentKind};

use crate::error::{AppError, AppResult};
use crate::naming::to_type_name;
use crate::oas::ref_utils::{extract_component_name, mapping_target_name, ComponentSection};
use crate::oas::schema::{BoolOrSchema, Schema};
use crate::resolver::TypeResolver;
use indexmap::IndexMap;
use kind::union_members;
use serde::Serialize;

/// A record's own shape after `allOf` flattening.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRecord {
    /// Raw component name of the base record, if the record inherits.
    pub base: Option<String>,
    /// Properties declared by this record, including flattened mixins.
    pub properties: IndexMap<String, Schema>,
    /// Required property names.
    pub required: Vec<String>,
    /// `additionalProperties`, last declaration wins.
    pub additional_properties: Option<BoolOrSchema>,
}

impl FlatRecord {
    fn absorb(&mut self, other: FlatRecord) {
        for (name, schema) in other.properties {
            self.properties.insert(name, schema);
        }
        for name in other.required {
            if !self.required.contains(&name) {
                self.required.push(name);
            }
        }
        if other.additional_properties.is_some() {
            self.additional_properties = other.additional_properties;
        }
    }

    fn own(schema: &Schema) -> Self {
        FlatRecord {
            base: None,
            properties: schema.properties.clone(),
            required: schema.required.clone(),
            additional_properties: schema.additional_properties.clone(),
        }
    }
}

/// One variant of a discriminated union or hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    /// Discriminator value on the wire.
    pub value: String,
    /// Generated type name.
    pub type_name: String,
}

/// The members of a `oneOf` / `anyOf`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionShape {
    /// `oneOf` (exactly one member matches) rather than `anyOf`.
    pub exclusive: bool,
    /// Discriminator property, when declared.
    pub discriminator: Option<String>,
    /// Variants in mapping order, then member order. Empty without a discriminator.
    pub variants: Vec<Variant>,
    /// Whether a `null` member was stripped.
    pub nullable: bool,
}

/// Composition queries over one resolver's document.
pub struct Composition<'r, 'a> {
    resolver: &'r TypeResolver<'a>,
}

impl<'r, 'a> Composition<'r, 'a> {
    /// Wraps a resolver.
    pub fn new(resolver: &'r TypeResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Flattens a record schema. `raw` names the component when the schema is one, so
    /// that inheritance cycles through it are detected.
    pub fn flatten(&self, raw: Option<&str>, schema: &Schema) -> AppResult<FlatRecord> {
        let mut stack: Vec<String> = raw.map(str::to_string).into_iter().collect();
        let flat = self.flatten_inner(schema, &mut stack, true)?;
        if let (Some(raw), Some(_)) = (raw, &flat.base) {
            self.check_base_chain(raw)?;
        }
        Ok(flat)
    }

    fn flatten_inner(
        &self,
        schema: &Schema,
        stack: &mut Vec<String>,
        pick_base: bool,
    ) -> AppResult<FlatRecord> {
        let mut flat = FlatRecord::default();

        for member in &schema.all_of {
            if member.is_null_only() || member.is_nullable_marker() {
                continue;
            }
            let Some(reference) = &member.reference else {
                let inline = self.flatten_inner(member, stack, false)?;
                flat.absorb(inline);
                continue;
            };

            let (target_raw, target) = self.resolver.document().resolve_schema_ref(reference)?;
            let record_like = self
                .resolver
                .component_kind(target_raw)
                .is_some_and(|k| k.is_record_like());
            if pick_base && flat.base.is_none() && record_like {
                flat.base = Some(target_raw.to_string());
                continue;
            }

            if stack.iter().any(|s| s == target_raw) {
                return Err(AppError::CircularReference(format!(
                    "'{}' is composed from itself",
                    target_raw
                )));
            }
            stack.push(target_raw.to_string());
            let mixin = self.flatten_all(target, stack)?;
            stack.pop();
            flat.absorb(mixin);
        }

        flat.absorb(FlatRecord::own(schema));
        Ok(flat)
    }

    /// Every property of `schema` including those reached through its bases.
    fn flatten_all(&self, schema: &Schema, stack: &mut Vec<String>) -> AppResult<FlatRecord> {
        let own = self.flatten_inner(schema, stack, true)?;
        let Some(base_raw) = own.base.clone() else {
            return Ok(own);
        };
        if stack.iter().any(|s| *s == base_raw) {
            return Err(AppError::CircularReference(format!(
                "'{}' inherits from itself",
                base_raw
            )));
        }
        let base_schema = self.schema(&base_raw)?;
        stack.push(base_raw);
        let mut all = self.flatten_all(base_schema, stack)?;
        stack.pop();
        all.base = None;
        all.absorb(FlatRecord { base: None, ..own });
        Ok(all)
    }

    /// All properties of a component, inherited ones first.
    pub fn all_properties(&self, raw: &str) -> AppResult<FlatRecord> {
        let schema = self.schema(raw)?;
        let mut stack = vec![raw.to_string()];
        self.flatten_all(schema, &mut stack)
    }

    /// The direct base of a component, if it inherits.
    pub fn base_of(&self, raw: &str) -> AppResult<Option<String>> {
        let schema = self.schema(raw)?;
        if schema.all_of.is_empty() {
            return Ok(None);
        }
        let mut stack = vec![raw.to_string()];
        Ok(self.flatten_inner(schema, &mut stack, true)?.base)
    }

    fn check_base_chain(&self, raw: &str) -> AppResult<()> {
        let mut seen = vec![raw.to_string()];
        let mut current = raw.to_string();
        while let Some(base) = self.base_of(&current)? {
            if seen.contains(&base) {
                return Err(AppError::CircularReference(format!(
                    "inheritance cycle through '{}'",
                    base
                )));
            }
            seen.push(base.clone());
            current = base;
        }
        Ok(())
    }

    /// Components whose `allOf` references `base_raw` directly, in document order.
    pub fn derived_types(&self, base_raw: &str) -> Vec<String> {
        self.resolver
            .document()
            .shim
            .components
            .schemas
            .iter()
            .filter(|(raw, schema)| {
                raw.as_str() != base_raw
                    && schema.all_of.iter().any(|member| {
                        member
                            .reference
                            .as_deref()
                            .and_then(|r| extract_component_name(r, ComponentSection::Schemas))
                            .is_some_and(|target| target == base_raw)
                    })
            })
            .map(|(raw, _)| raw.clone())
            .collect()
    }

    /// The discriminator value identifying `derived_raw` under `base_raw`: the mapping key
    /// that targets it, else its component name.
    pub fn discriminator_value(&self, base_raw: &str, derived_raw: &str) -> String {
        self.resolver
            .document()
            .schema(base_raw)
            .and_then(|base| base.discriminator.as_ref())
            .and_then(|d| {
                d.mapping
                    .iter()
                    .find(|(_, target)| {
                        mapping_target_name(target).as_deref() == Some(derived_raw)
                    })
                    .map(|(value, _)| value.clone())
            })
            .unwrap_or_else(|| derived_raw.to_string())
    }

    /// Variants of a hierarchy base: every derived type with its discriminator value.
    pub fn hierarchy_variants(&self, base_raw: &str) -> Vec<Variant> {
        self.derived_types(base_raw)
            .into_iter()
            .map(|derived| Variant {
                value: self.discriminator_value(base_raw, &derived),
                type_name: self.type_name(&derived),
            })
            .collect()
    }

    /// Interprets a `oneOf` / `anyOf` schema named `union_name`.
    ///
    /// Inline members of a discriminated union are synthesized as
    /// `{union_name}Option{n}`. Members that resolve to no named type (a bare primitive)
    /// get no variant.
    pub fn union_shape(&self, union_name: &str, schema: &Schema) -> AppResult<UnionShape> {
        let members = union_members(schema);
        let mut shape = UnionShape {
            exclusive: !schema.one_of.is_empty(),
            discriminator: schema.discriminator.as_ref().map(|d| d.property_name.clone()),
            variants: Vec::new(),
            nullable: members.iter().any(Schema::is_null_only),
        };
        let Some(discriminator) = &schema.discriminator else {
            return Ok(shape);
        };

        let mut mapped: Vec<String> = Vec::new();
        for (value, target) in &discriminator.mapping {
            let target_raw = mapping_target_name(target)
                .filter(|raw| self.resolver.component_kind(raw).is_some())
                .ok_or_else(|| AppError::UnresolvedReference(target.clone()))?;
            shape.variants.push(Variant {
                value: value.clone(),
                type_name: self.type_name(&target_raw),
            });
            mapped.push(target_raw);
        }

        for (index, member) in members.iter().enumerate() {
            if member.is_null_only() {
                continue;
            }
            match &member.reference {
                Some(reference) => {
                    let (raw, _) = self.resolver.document().resolve_schema_ref(reference)?;
                    if mapped.iter().any(|m| m == raw) {
                        continue;
                    }
                    mapped.push(raw.to_string());
                    shape.variants.push(Variant {
                        value: raw.to_string(),
                        type_name: self.type_name(raw),
                    });
                }
                None => {
                    let hint = format!("{}Option{}", union_name, index + 1);
                    tracing::warn!(
                        union = union_name,
                        option = %hint,
                        "inline member in discriminated union; mapping cannot target it"
                    );
                    let resolved = self.resolver.resolve(member, Some(&hint))?;
                    let Some(type_name) = resolved.ty.named_type() else {
                        tracing::warn!(
                            union = union_name,
                            option = %hint,
                            "inline member has no generated type; left out of the discriminator"
                        );
                        continue;
                    };
                    shape.variants.push(Variant {
                        value: type_name.to_string(),
                        type_name: type_name.to_string(),
                    });
                }
            }
        }
        Ok(shape)
    }

    /// A component schema by raw name.
    pub fn schema_of(&self, raw: &str) -> Option<&'a Schema> {
        self.resolver.document().schema(raw)
    }

    fn schema(&self, raw: &str) -> AppResult<&'a Schema> {
        self.resolver
            .document()
            .schema(raw)
            .ok_or_else(|| AppError::UnresolvedReference(format!("#/components/schemas/{}", raw)))
    }

    fn type_name(&self, raw: &str) -> String {
        self.resolver
            .component_type_name(raw)
            .map(str::to_string)
            .unwrap_or_else(|| to_type_name(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::oas::OpenApiDocument;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: Zoo, version: '1'}
paths: {}
components:
  schemas:
    Pet:
      type: object
      required: [petType]
      properties:
        petType: {type: string}
        name: {type: string}
      discriminator:
        propertyName: petType
        mapping:
          kitty: '#/components/schemas/Cat'
    Timestamps:
      type: object
      properties:
        created: {type: string, format: date-time}
    Cat:
      allOf:
        - $ref: '#/components/schemas/Pet'
        - $ref: '#/components/schemas/Timestamps'
        - type: object
          required: [lives]
          properties:
            lives: {type: integer}
    Dog:
      allOf:
        - $ref: '#/components/schemas/Pet'
        - properties:
            bark: {type: boolean}
    Animal:
      oneOf:
        - $ref: '#/components/schemas/Cat'
        - $ref: '#/components/schemas/Dog'
        - type: object
          properties:
            hiss: {type: boolean}
      discriminator:
        propertyName: petType
        mapping:
          doggo: Dog
    A:
      allOf:
        - $ref: '#/components/schemas/B'
        - properties:
            a: {type: string}
    B:
      allOf:
        - $ref: '#/components/schemas/A'
        - properties:
            b: {type: string}
"#;

    fn with<T>(f: impl FnOnce(&Composition) -> T) -> T {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        let composition = Composition::new(&resolver);
        f(&composition)
    }

    #[test]
    fn test_flatten_with_base_and_mixin() {
        with(|c| {
            let doc_schema = c.schema("Cat").unwrap().clone();
            let flat = c.flatten(Some("Cat"), &doc_schema).unwrap();
            assert_eq!(flat.base.as_deref(), Some("Pet"));
            let names: Vec<&str> = flat.properties.keys().map(String::as_str).collect();
            assert_eq!(names, vec!["created", "lives"]);
            assert_eq!(flat.required, vec!["lives"]);
        });
    }

    #[test]
    fn test_all_properties_include_inherited() {
        with(|c| {
            let all = c.all_properties("Cat").unwrap();
            let names: Vec<&str> = all.properties.keys().map(String::as_str).collect();
            assert_eq!(names, vec!["petType", "name", "created", "lives"]);
            assert_eq!(all.required, vec!["petType", "lives"]);
        });
    }

    #[test]
    fn test_hierarchy_variants() {
        with(|c| {
            assert_eq!(c.derived_types("Pet"), vec!["Cat", "Dog"]);
            assert_eq!(
                c.hierarchy_variants("Pet"),
                vec![
                    Variant { value: "kitty".into(), type_name: "Cat".into() },
                    Variant { value: "Dog".into(), type_name: "Dog".into() },
                ]
            );
        });
    }

    #[test]
    fn test_discriminated_union_variants() {
        with(|c| {
            let schema = c.schema("Animal").unwrap().clone();
            let shape = c.union_shape("Animal", &schema).unwrap();
            assert!(shape.exclusive);
            assert_eq!(shape.discriminator.as_deref(), Some("petType"));
            assert_eq!(
                shape.variants,
                vec![
                    Variant { value: "doggo".into(), type_name: "Dog".into() },
                    Variant { value: "Cat".into(), type_name: "Cat".into() },
                    Variant { value: "AnimalOption3".into(), type_name: "AnimalOption3".into() },
                ]
            );
        });
    }

    #[test]
    fn test_inheritance_cycle() {
        with(|c| {
            let schema = c.schema("A").unwrap().clone();
            assert!(matches!(
                c.flatten(Some("A"), &schema),
                Err(AppError::CircularReference(_))
            ));
            assert!(matches!(
                c.all_properties("B"),
                Err(AppError::CircularReference(_))
            ));
        });
    }
}
