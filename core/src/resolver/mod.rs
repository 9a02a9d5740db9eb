#![deny(missing_docs)]

//! # Schema Resolver
//!
//! Turns any schema position (component, property, parameter, body) into a
//! [`ResolvedType`]. References to named components resolve to their generated name;
//! alias components are inlined. Inline objects, enums and unions met under a naming hint
//! are registered as synthesized types that the extractors later turn into models.

pub mod flags;
pub mod types;
pub mod validation;

pub use flags::{resolve_primitive, TypeFlags};
pub use types::{Bound, JsonType, Primitive, ResolvedType, TypeRef, Validation};
pub use validation::extract_validation;

use crate::composition::kind::{
    classify_component, union_has_null_member, union_members, ComponentKind,
};
use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult};
use crate::naming::{to_type_name, unique_name};
use crate::oas::schema::{BoolOrSchema, Schema};
use crate::oas::OpenApiDocument;
use indexmap::IndexMap;
use std::cell::RefCell;

/// An inline schema that was given a generated name.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedType {
    /// The generated type name.
    pub name: String,
    /// The inline schema as written.
    pub schema: Schema,
    /// How the schema is generated.
    pub kind: ComponentKind,
}

/// Resolves schemas against one document.
///
/// Component names and kinds are computed once up front. Synthesized types accumulate in
/// interior-mutable state so resolution can stay `&self` while extractors hold borrows of
/// the document.
pub struct TypeResolver<'a> {
    doc: &'a OpenApiDocument,
    config: &'a GeneratorConfig,
    /// Raw component name -> (type name, kind).
    components: IndexMap<String, (String, ComponentKind)>,
    synthesized: RefCell<IndexMap<String, SynthesizedType>>,
    pending: RefCell<Vec<String>>,
    alias_stack: RefCell<Vec<String>>,
}

impl<'a> TypeResolver<'a> {
    /// Classifies every component and assigns unique type names in document order.
    pub fn new(doc: &'a OpenApiDocument, config: &'a GeneratorConfig) -> Self {
        let mut components: IndexMap<String, (String, ComponentKind)> = IndexMap::new();
        for (raw, schema) in &doc.shim.components.schemas {
            let kind = classify_component(schema, doc);
            let base = match to_type_name(raw) {
                name if name.is_empty() => "Schema".to_string(),
                name => name,
            };
            let name = if kind.is_named() {
                unique_name(&base, |candidate| {
                    components
                        .values()
                        .any(|(taken, k)| k.is_named() && taken == candidate)
                })
            } else {
                base
            };
            tracing::debug!(component = %raw, type_name = %name, ?kind, "classified component");
            components.insert(raw.clone(), (name, kind));
        }

        Self {
            doc,
            config,
            components,
            synthesized: RefCell::new(IndexMap::new()),
            pending: RefCell::new(Vec::new()),
            alias_stack: RefCell::new(Vec::new()),
        }
    }

    /// The document being resolved.
    pub fn document(&self) -> &'a OpenApiDocument {
        self.doc
    }

    /// The active configuration.
    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    /// The kind of a component, by raw name.
    pub fn component_kind(&self, raw: &str) -> Option<ComponentKind> {
        self.components.get(raw).map(|(_, kind)| *kind)
    }

    /// The generated type name of a component, by raw name.
    pub fn component_type_name(&self, raw: &str) -> Option<&str> {
        self.components.get(raw).map(|(name, _)| name.as_str())
    }

    /// Every component in document order as `(raw name, type name, kind)`.
    pub fn components(&self) -> impl Iterator<Item = (&str, &str, ComponentKind)> {
        self.components
            .iter()
            .map(|(raw, (name, kind))| (raw.as_str(), name.as_str(), *kind))
    }

    /// Synthesized types not yet handed out by [`Self::take_pending`].
    pub fn take_pending(&self) -> Vec<SynthesizedType> {
        let names: Vec<String> = self.pending.borrow_mut().drain(..).collect();
        let synthesized = self.synthesized.borrow();
        names
            .iter()
            .filter_map(|name| synthesized.get(name).cloned())
            .collect()
    }

    /// Resolves a schema position. `hint` names inline types found there.
    pub fn resolve(&self, schema: &Schema, hint: Option<&str>) -> AppResult<ResolvedType> {
        if let Some(reference) = &schema.reference {
            return self.resolve_reference(reference, schema);
        }

        let flags = TypeFlags::of(schema);
        let mut resolved = self.resolve_shape(schema, &flags, hint)?;
        resolved.nullable |= flags.includes_null;
        apply_metadata(&mut resolved, schema);
        Ok(resolved)
    }

    /// Resolves a `$ref` and applies its sibling overrides.
    fn resolve_reference(&self, reference: &str, siblings: &Schema) -> AppResult<ResolvedType> {
        let (raw, target) = self.doc.resolve_schema_ref(reference)?;
        let (name, kind) = self
            .components
            .get(raw)
            .cloned()
            .ok_or_else(|| AppError::UnresolvedReference(reference.to_string()))?;

        let mut resolved = if kind.is_named() {
            let mut named = ResolvedType::named(name);
            named.nullable = TypeFlags::of(target).includes_null
                || (kind == ComponentKind::Union && union_has_null_member(target));
            named
        } else {
            self.resolve_alias(raw, &name, target)?
        };

        if siblings.has_structural_keywords() {
            tracing::warn!(
                reference,
                "ignoring structural keywords beside $ref; use allOf to compose"
            );
        }
        if TypeFlags::of(siblings).includes_null {
            resolved.nullable = true;
        }
        apply_metadata(&mut resolved, siblings);
        Ok(resolved)
    }

    fn resolve_alias(&self, raw: &str, name: &str, target: &Schema) -> AppResult<ResolvedType> {
        if self.alias_stack.borrow().iter().any(|r| r == raw) {
            return Err(AppError::CircularReference(format!(
                "alias '{}' refers to itself",
                raw
            )));
        }
        self.alias_stack.borrow_mut().push(raw.to_string());
        let resolved = self.resolve(target, Some(name));
        self.alias_stack.borrow_mut().pop();
        resolved
    }

    fn resolve_shape(
        &self,
        schema: &Schema,
        flags: &TypeFlags,
        hint: Option<&str>,
    ) -> AppResult<ResolvedType> {
        if !schema.all_of.is_empty() {
            return self.resolve_all_of(schema, hint);
        }
        if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            return self.resolve_union(schema, hint);
        }
        if !schema.prefix_items.is_empty() {
            return self.resolve_tuple(schema, hint);
        }
        if let Some(values) = &schema.enum_values {
            let literal_count = values.iter().filter(|v| !v.is_null()).count();
            let enumerable = matches!(
                flags.single(),
                Some(JsonType::String) | Some(JsonType::Integer)
            );
            if enumerable && literal_count > 1 {
                if let Some(name) = self.synthesize(hint, schema, ComponentKind::Enum) {
                    return Ok(ResolvedType::named(name));
                }
            }
        }

        match flags.types.as_slice() {
            [] => Ok(ResolvedType::any()),
            [single] => self.resolve_json_type(*single, schema, hint),
            several => {
                let members = several
                    .iter()
                    .map(|t| self.resolve_json_type(*t, schema, None))
                    .collect::<AppResult<Vec<_>>>()?;
                Ok(ResolvedType::of(TypeRef::Union { members }))
            }
        }
    }

    fn resolve_json_type(
        &self,
        json_type: JsonType,
        schema: &Schema,
        hint: Option<&str>,
    ) -> AppResult<ResolvedType> {
        match json_type {
            JsonType::Array => {
                let item = match &schema.items {
                    Some(BoolOrSchema::Schema(items)) => {
                        let item_hint = hint.map(|h| format!("{}Item", h));
                        self.resolve(items, item_hint.as_deref())?
                    }
                    _ => ResolvedType::any(),
                };
                let unique = self.config.unique_items_as_set && schema.unique_items == Some(true);
                Ok(ResolvedType::of(TypeRef::Array {
                    item: Box::new(item),
                    unique,
                }))
            }
            JsonType::Object => {
                if !schema.properties.is_empty() {
                    return Ok(match self.synthesize(hint, schema, ComponentKind::Record) {
                        Some(name) => ResolvedType::named(name),
                        None => map_of(ResolvedType::any()),
                    });
                }
                let value = match &schema.additional_properties {
                    Some(BoolOrSchema::Schema(value)) => {
                        let value_hint = hint.map(|h| format!("{}Value", h));
                        self.resolve(value, value_hint.as_deref())?
                    }
                    _ => ResolvedType::any(),
                };
                Ok(map_of(value))
            }
            scalar => Ok(resolve_primitive(
                scalar,
                schema.format.as_deref(),
                schema.content_encoding.as_deref(),
                schema.content_media_type.as_deref(),
            )
            .map(ResolvedType::primitive)
            .unwrap_or_else(ResolvedType::any)),
        }
    }

    fn resolve_all_of(&self, schema: &Schema, hint: Option<&str>) -> AppResult<ResolvedType> {
        let mut nullable = false;
        let mut members = Vec::new();
        for member in &schema.all_of {
            if member.is_null_only() || member.is_nullable_marker() {
                nullable = true;
            } else {
                members.push(member);
            }
        }

        let mut resolved = match members.as_slice() {
            [] => ResolvedType::any(),
            [only] if schema.properties.is_empty() => self.resolve(only, hint)?,
            _ => match self.synthesize(hint, schema, ComponentKind::Record) {
                Some(name) => ResolvedType::named(name),
                None => ResolvedType::any(),
            },
        };
        resolved.nullable |= nullable;
        Ok(resolved)
    }

    fn resolve_union(&self, schema: &Schema, hint: Option<&str>) -> AppResult<ResolvedType> {
        let all = union_members(schema);
        let nullable = all.iter().any(Schema::is_null_only);
        let members: Vec<&Schema> = all.iter().filter(|m| !m.is_null_only()).collect();

        let mut resolved = match members.as_slice() {
            [] => ResolvedType::any(),
            [only] if schema.discriminator.is_none() => self.resolve(only, hint)?,
            _ => match self.synthesize(hint, schema, ComponentKind::Union) {
                Some(name) => ResolvedType::named(name),
                None => {
                    let members = members
                        .iter()
                        .map(|m| self.resolve(m, None))
                        .collect::<AppResult<Vec<_>>>()?;
                    ResolvedType::of(TypeRef::Union { members })
                }
            },
        };
        resolved.nullable |= nullable;
        Ok(resolved)
    }

    fn resolve_tuple(&self, schema: &Schema, hint: Option<&str>) -> AppResult<ResolvedType> {
        let items = schema
            .prefix_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item_hint = hint.map(|h| format!("{}Item{}", h, i + 1));
                self.resolve(item, item_hint.as_deref())
            })
            .collect::<AppResult<Vec<_>>>()?;
        let rest = self.resolve_tuple_rest(schema, hint)?.map(Box::new);
        Ok(ResolvedType::of(TypeRef::Tuple { items, rest }))
    }

    /// The type of items following `prefixItems`, when the tuple is open.
    pub fn resolve_tuple_rest(
        &self,
        schema: &Schema,
        hint: Option<&str>,
    ) -> AppResult<Option<ResolvedType>> {
        match &schema.items {
            Some(BoolOrSchema::Schema(rest)) => {
                let rest_hint = hint.map(|h| format!("{}Rest", h));
                Ok(Some(self.resolve(rest, rest_hint.as_deref())?))
            }
            Some(BoolOrSchema::Bool(true)) => Ok(Some(ResolvedType::any())),
            Some(BoolOrSchema::Bool(false)) | None => Ok(None),
        }
    }

    /// Registers `schema` under a name derived from `hint`.
    ///
    /// Returns `None` when there is no hint or synthesis is disabled. An identical schema
    /// registered under the same base name reuses that name.
    pub fn synthesize(
        &self,
        hint: Option<&str>,
        schema: &Schema,
        kind: ComponentKind,
    ) -> Option<String> {
        if !self.config.synthesize_inline_types {
            return None;
        }
        let base = to_type_name(hint?);
        if base.is_empty() {
            return None;
        }

        let mut synthesized = self.synthesized.borrow_mut();
        let is_component = |candidate: &str| {
            self.components
                .values()
                .any(|(taken, k)| k.is_named() && taken == candidate)
        };
        let reusable = std::iter::once(base.clone())
            .chain((2..).map(|n| format!("{}{}", base, n)))
            .take_while(|candidate| synthesized.contains_key(candidate) || is_component(candidate))
            .find(|candidate| {
                synthesized
                    .get(candidate)
                    .is_some_and(|existing| existing.schema == *schema)
            });
        if let Some(name) = reusable {
            return Some(name);
        }

        let name = unique_name(&base, |candidate| {
            synthesized.contains_key(candidate) || is_component(candidate)
        });
        tracing::debug!(type_name = %name, ?kind, "synthesized inline type");
        synthesized.insert(
            name.clone(),
            SynthesizedType {
                name: name.clone(),
                schema: schema.clone(),
                kind,
            },
        );
        self.pending.borrow_mut().push(name.clone());
        Some(name)
    }
}

fn map_of(value: ResolvedType) -> ResolvedType {
    ResolvedType::of(TypeRef::Map {
        value: Box::new(value),
    })
}

/// Copies annotation keywords and validation from `schema` onto `resolved`. Values set
/// on `schema` win.
fn apply_metadata(resolved: &mut ResolvedType, schema: &Schema) {
    if schema.description.is_some() {
        resolved.description = schema.description.clone();
    }
    if schema.default.is_some() {
        resolved.default = schema.default.clone();
    }
    if let Some(deprecated) = schema.deprecated {
        resolved.deprecated = deprecated;
    }
    if let Some(read_only) = schema.read_only {
        resolved.read_only = read_only;
    }
    if let Some(write_only) = schema.write_only {
        resolved.write_only = write_only;
    }
    let own = extract_validation(schema);
    if !own.is_empty() {
        resolved.validation = std::mem::take(&mut resolved.validation).merged_with(&own);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Pet:
      type: object
      properties:
        name: {type: string}
    Id:
      type: string
      format: uuid
      description: identifier
    Ids:
      type: array
      items:
        $ref: '#/components/schemas/Id'
    Color:
      type: string
      enum: [red, green]
    Shape:
      oneOf:
        - $ref: '#/components/schemas/Pet'
        - $ref: '#/components/schemas/Color'
        - type: 'null'
    Loop:
      $ref: '#/components/schemas/Loop2'
    Loop2:
      $ref: '#/components/schemas/Loop'
"#;

    fn with_resolver<T>(f: impl FnOnce(&TypeResolver) -> T) -> T {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        f(&resolver)
    }

    fn schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_named_reference() {
        with_resolver(|r| {
            let t = r.resolve(&schema("$ref: '#/components/schemas/Pet'"), None).unwrap();
            assert_eq!(t.ty, TypeRef::named("Pet"));
            assert!(!t.nullable);
        });
    }

    #[test]
    fn test_alias_reference_is_inlined() {
        with_resolver(|r| {
            let t = r.resolve(&schema("$ref: '#/components/schemas/Id'"), None).unwrap();
            assert_eq!(t.ty, TypeRef::primitive(Primitive::Uuid));
            assert_eq!(t.description.as_deref(), Some("identifier"));

            let list = r.resolve(&schema("$ref: '#/components/schemas/Ids'"), None).unwrap();
            match list.ty {
                TypeRef::Array { item, unique } => {
                    assert_eq!(item.ty, TypeRef::primitive(Primitive::Uuid));
                    assert!(!unique);
                }
                other => panic!("expected array, got {:?}", other),
            }
        });
    }

    #[test]
    fn test_reference_sibling_overrides() {
        with_resolver(|r| {
            let t = r
                .resolve(
                    &schema("$ref: '#/components/schemas/Id'\ndescription: owner id\nnullable: true\nmaxLength: 36"),
                    None,
                )
                .unwrap();
            assert!(t.nullable);
            assert_eq!(t.description.as_deref(), Some("owner id"));
            assert_eq!(t.validation.max_length, Some(36));
            assert_eq!(t.validation.format.as_deref(), Some("uuid"));
        });
    }

    #[test]
    fn test_union_component_nullability() {
        with_resolver(|r| {
            let t = r.resolve(&schema("$ref: '#/components/schemas/Shape'"), None).unwrap();
            assert_eq!(t.ty, TypeRef::named("Shape"));
            assert!(t.nullable);
        });
    }

    #[test]
    fn test_unresolved_and_circular() {
        with_resolver(|r| {
            let missing = r.resolve(&schema("$ref: '#/components/schemas/Nope'"), None);
            assert!(matches!(missing, Err(AppError::UnresolvedReference(_))));
            let looping = r.resolve(&schema("$ref: '#/components/schemas/Loop'"), None);
            assert!(matches!(looping, Err(AppError::CircularReference(_))));
        });
    }

    #[test]
    fn test_all_of_nullable_wrapper() {
        with_resolver(|r| {
            let t = r
                .resolve(
                    &schema("allOf:\n  - $ref: '#/components/schemas/Pet'\nnullable: true"),
                    None,
                )
                .unwrap();
            assert_eq!(t.ty, TypeRef::named("Pet"));
            assert!(t.nullable);

            let marker = r
                .resolve(
                    &schema("allOf:\n  - $ref: '#/components/schemas/Pet'\n  - nullable: true"),
                    None,
                )
                .unwrap();
            assert_eq!(marker.ty, TypeRef::named("Pet"));
            assert!(marker.nullable);
        });
    }

    #[test]
    fn test_inline_object_synthesized() {
        with_resolver(|r| {
            let inline = schema("type: object\nproperties:\n  street: {type: string}");
            let first = r.resolve(&inline, Some("OwnerAddress")).unwrap();
            assert_eq!(first.ty, TypeRef::named("OwnerAddress"));
            let again = r.resolve(&inline, Some("OwnerAddress")).unwrap();
            assert_eq!(again.ty, TypeRef::named("OwnerAddress"));

            let different = schema("type: object\nproperties:\n  city: {type: string}");
            let second = r.resolve(&different, Some("OwnerAddress")).unwrap();
            assert_eq!(second.ty, TypeRef::named("OwnerAddress2"));

            let clash = r.resolve(&inline, Some("pet")).unwrap();
            assert_eq!(clash.ty, TypeRef::named("Pet2"));
            let clash_again = r.resolve(&inline, Some("pet")).unwrap();
            assert_eq!(clash_again.ty, TypeRef::named("Pet2"));

            let pending: Vec<String> = r.take_pending().into_iter().map(|s| s.name).collect();
            assert_eq!(pending, vec!["OwnerAddress", "OwnerAddress2", "Pet2"]);
            assert!(r.take_pending().is_empty());

            let anonymous = r.resolve(&inline, None).unwrap();
            assert_eq!(anonymous.ty, map_of(ResolvedType::any()).ty);
        });
    }

    #[test]
    fn test_inline_enum_and_union() {
        with_resolver(|r| {
            let e = r.resolve(&schema("type: string\nenum: [a, b]"), Some("Mode")).unwrap();
            assert_eq!(e.ty, TypeRef::named("Mode"));
            let plain = r.resolve(&schema("type: string\nenum: [a, b]"), None).unwrap();
            assert_eq!(plain.ty, TypeRef::primitive(Primitive::String));

            let u = r
                .resolve(&schema("oneOf:\n  - type: string\n  - type: integer"), None)
                .unwrap();
            assert_eq!(
                u.ty,
                TypeRef::Union {
                    members: vec![
                        ResolvedType::primitive(Primitive::String),
                        ResolvedType::primitive(Primitive::Int32)
                    ]
                }
            );
            let single = r
                .resolve(&schema("anyOf:\n  - type: integer\n  - type: 'null'"), Some("X"))
                .unwrap();
            assert_eq!(single.ty, TypeRef::primitive(Primitive::Int32));
            assert!(single.nullable);
        });
    }

    #[test]
    fn test_arrays_maps_tuples() {
        with_resolver(|r| {
            let set = r
                .resolve(&schema("type: array\nuniqueItems: true\nitems: {type: string}"), None)
                .unwrap();
            assert!(matches!(set.ty, TypeRef::Array { unique: true, .. }));

            let item = r
                .resolve(
                    &schema("type: array\nitems:\n  type: object\n  properties:\n    x: {type: integer}"),
                    Some("Points"),
                )
                .unwrap();
            match item.ty {
                TypeRef::Array { item, .. } => assert_eq!(item.ty, TypeRef::named("PointsItem")),
                other => panic!("expected array, got {:?}", other),
            }

            let map = r
                .resolve(&schema("type: object\nadditionalProperties: {type: integer}"), None)
                .unwrap();
            assert_eq!(map.ty, map_of(ResolvedType::primitive(Primitive::Int32)).ty);

            let tuple = r
                .resolve(
                    &schema("type: array\nprefixItems:\n  - type: number\n  - type: string\nitems: false"),
                    None,
                )
                .unwrap();
            assert_eq!(
                tuple.ty,
                TypeRef::Tuple {
                    items: vec![
                        ResolvedType::primitive(Primitive::Double),
                        ResolvedType::primitive(Primitive::String)
                    ],
                    rest: None
                }
            );
        });
    }

    #[test]
    fn test_multi_type_and_any() {
        with_resolver(|r| {
            let t = r.resolve(&schema("type: [string, integer, 'null']"), None).unwrap();
            assert!(t.nullable);
            assert!(matches!(t.ty, TypeRef::Union { ref members } if members.len() == 2));

            assert_eq!(r.resolve(&schema("{}"), None).unwrap().ty, TypeRef::Any);
            assert_eq!(r.resolve(&schema("not: {}"), None).unwrap().ty, TypeRef::Any);
            let with_default = r.resolve(&schema("default: 3\ndeprecated: true"), None).unwrap();
            assert_eq!(with_default.default, Some(json!(3)));
            assert!(with_default.deprecated);
        });
    }

    #[test]
    fn test_synthesis_disabled() {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig {
            synthesize_inline_types: false,
            ..GeneratorConfig::default()
        };
        let r = TypeResolver::new(&doc, &config);
        let t = r
            .resolve(&schema("type: object\nproperties:\n  a: {type: string}"), Some("Foo"))
            .unwrap();
        assert!(matches!(t.ty, TypeRef::Map { .. }));
        assert!(r.take_pending().is_empty());
    }
}
