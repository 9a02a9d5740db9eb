//! C# type mapper implementation.

use crate::config::GeneratorConfig;
use crate::mapping::{MethodSignature, TypeMapper};
use crate::naming::escape_csharp;
use crate::resolver::{Primitive, ResolvedType, TypeRef};
use std::collections::HashSet;

const JSON_ELEMENT: &str = "JsonElement";

/// C# type mapper implementation.
#[derive(Debug, Clone)]
pub struct CSharpMapper {
    nullable_reference_types: bool,
    optional_as_nullable: bool,
    value_types: HashSet<String>,
}

impl CSharpMapper {
    /// A mapper honouring the nullability options of `config`.
    pub fn new(config: &GeneratorConfig) -> Self {
        CSharpMapper {
            nullable_reference_types: config.nullable_reference_types,
            optional_as_nullable: config.optional_as_nullable,
            value_types: HashSet::new(),
        }
    }

    /// Registers generated names that render as value types (enums).
    pub fn with_value_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_types.extend(names.into_iter().map(Into::into));
        self
    }

    fn is_value_type(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Primitive { primitive } => !matches!(
                primitive,
                Primitive::String | Primitive::Uri | Primitive::Bytes | Primitive::Binary
            ),
            TypeRef::Named { name } => self.value_types.contains(name),
            TypeRef::Tuple { .. } | TypeRef::Union { .. } | TypeRef::Any => true,
            TypeRef::Array { .. } | TypeRef::Map { .. } => false,
        }
    }

    fn base_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive { primitive } => self.map_primitive(*primitive).to_string(),
            TypeRef::Named { name } => name.clone(),
            TypeRef::Array { item, unique: true } => format!("HashSet<{}>", self.map_type(item)),
            TypeRef::Array { item, unique: false } => format!("List<{}>", self.map_type(item)),
            TypeRef::Map { value } => format!("Dictionary<string, {}>", self.map_type(value)),
            TypeRef::Tuple { items, rest: None } if items.len() == 1 => {
                format!("ValueTuple<{}>", self.map_type(&items[0]))
            }
            TypeRef::Tuple { items, rest: None } if !items.is_empty() => {
                let items: Vec<String> = items.iter().map(|i| self.map_type(i)).collect();
                format!("({})", items.join(", "))
            }
            TypeRef::Tuple { .. } | TypeRef::Union { .. } | TypeRef::Any => {
                JSON_ELEMENT.to_string()
            }
        }
    }
}

impl TypeMapper for CSharpMapper {
    fn language(&self) -> &'static str {
        "csharp"
    }

    fn map_primitive(&self, primitive: Primitive) -> &'static str {
        match primitive {
            Primitive::Int8 => "sbyte",
            Primitive::UInt8 => "byte",
            Primitive::Int16 => "short",
            Primitive::Int32 => "int",
            Primitive::Int64 => "long",
            Primitive::UInt32 => "uint",
            Primitive::UInt64 => "ulong",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Decimal => "decimal",
            Primitive::Boolean => "bool",
            Primitive::String => "string",
            Primitive::Date => "DateOnly",
            Primitive::DateTime => "DateTimeOffset",
            Primitive::Time => "TimeOnly",
            Primitive::Duration => "TimeSpan",
            Primitive::Uuid => "Guid",
            Primitive::Uri => "Uri",
            Primitive::Bytes => "byte[]",
            Primitive::Binary => "Stream",
        }
    }

    fn map_type(&self, ty: &ResolvedType) -> String {
        let base = self.base_type(&ty.ty);
        let annotate = ty.nullable && (self.is_value_type(&ty.ty) || self.nullable_reference_types);
        if annotate {
            format!("{}?", base)
        } else {
            base
        }
    }

    fn map_member_type(&self, ty: &ResolvedType, optional: bool) -> String {
        if optional && self.optional_as_nullable && !ty.nullable {
            self.map_type(&ty.clone().into_nullable())
        } else {
            self.map_type(ty)
        }
    }

    fn optional_default(&self, ty: &ResolvedType, rendered: &str) -> Option<String> {
        let nullable_reference = !self.nullable_reference_types && !self.is_value_type(&ty.ty);
        let accepts_null = rendered.ends_with('?') || nullable_reference;
        let value = if accepts_null { "null" } else { "default" };
        Some(value.to_string())
    }

    fn escape_identifier(&self, name: &str) -> String {
        escape_csharp(name)
    }

    fn method_name(&self, operation: &str) -> String {
        format!("{}Async", operation)
    }

    fn async_return_type(&self, inner: Option<&str>) -> String {
        match inner {
            Some(inner) => format!("Task<{}>", inner),
            None => "Task".to_string(),
        }
    }

    fn render_signature(&self, signature: &MethodSignature) -> String {
        let params: Vec<String> = signature
            .parameters
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{} {} = {}", p.ty, p.name, default),
                None => format!("{} {}", p.ty, p.name),
            })
            .collect();
        format!(
            "{} {}({})",
            signature.return_type,
            signature.name,
            params.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapper() -> CSharpMapper {
        CSharpMapper::new(&GeneratorConfig::default())
    }

    fn array(item: ResolvedType, unique: bool) -> ResolvedType {
        ResolvedType::of(TypeRef::Array {
            item: Box::new(item),
            unique,
        })
    }

    #[test]
    fn test_csharp_primitives() {
        let mapper = mapper();
        assert_eq!(mapper.map_primitive(Primitive::Int64), "long");
        assert_eq!(mapper.map_primitive(Primitive::DateTime), "DateTimeOffset");
        assert_eq!(mapper.map_primitive(Primitive::Uuid), "Guid");
        assert_eq!(mapper.map_primitive(Primitive::Bytes), "byte[]");
        assert_eq!(mapper.map_primitive(Primitive::Binary), "Stream");
    }

    #[test]
    fn test_csharp_containers() {
        let mapper = mapper();
        let string = ResolvedType::primitive(Primitive::String);
        assert_eq!(mapper.map_type(&array(string.clone(), false)), "List<string>");
        assert_eq!(mapper.map_type(&array(string.clone(), true)), "HashSet<string>");
        assert_eq!(
            mapper.map_type(&ResolvedType::of(TypeRef::Map {
                value: Box::new(ResolvedType::primitive(Primitive::Int32).into_nullable()),
            })),
            "Dictionary<string, int?>"
        );

        let pair = ResolvedType::of(TypeRef::Tuple {
            items: vec![ResolvedType::primitive(Primitive::Double), string.clone()],
            rest: None,
        });
        assert_eq!(mapper.map_type(&pair), "(double, string)");

        let single = ResolvedType::of(TypeRef::Tuple {
            items: vec![string.clone()],
            rest: None,
        });
        assert_eq!(mapper.map_type(&single), "ValueTuple<string>");

        let open = ResolvedType::of(TypeRef::Tuple {
            items: vec![string.clone()],
            rest: Some(Box::new(string.clone())),
        });
        assert_eq!(mapper.map_type(&open), "JsonElement");
        assert_eq!(mapper.map_type(&ResolvedType::any()), "JsonElement");
    }

    #[test]
    fn test_csharp_nullability() {
        let string = ResolvedType::primitive(Primitive::String).into_nullable();
        let int = ResolvedType::primitive(Primitive::Int32).into_nullable();
        let status = ResolvedType::named("Status").into_nullable();

        let mapper = mapper().with_value_types(["Status"]);
        assert_eq!(mapper.map_type(&string), "string?");
        assert_eq!(mapper.map_type(&int), "int?");
        assert_eq!(mapper.map_type(&status), "Status?");

        let legacy = CSharpMapper::new(&GeneratorConfig {
            nullable_reference_types: false,
            optional_as_nullable: false,
            ..GeneratorConfig::default()
        })
        .with_value_types(["Status"]);
        assert_eq!(legacy.map_type(&string), "string");
        assert_eq!(legacy.map_type(&int), "int?");
        assert_eq!(legacy.map_type(&status), "Status?");
        assert_eq!(legacy.map_type(&ResolvedType::named("Pet").into_nullable()), "Pet");
        assert_eq!(
            legacy.map_member_type(&ResolvedType::primitive(Primitive::Int32), true),
            "int"
        );
        assert_eq!(
            mapper.map_member_type(&ResolvedType::primitive(Primitive::Int32), true),
            "int?"
        );
    }

    #[test]
    fn test_csharp_keywords() {
        let mapper = mapper();
        assert_eq!(mapper.escape_identifier("class"), "@class");
        assert_eq!(mapper.escape_identifier("name"), "name");
        assert_eq!(mapper.method_name("GetPet"), "GetPetAsync");
    }
}
