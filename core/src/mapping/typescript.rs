//! TypeScript type mapper implementation.

use crate::mapping::{MethodSignature, TypeMapper};
use crate::naming::escape_typescript;
use crate::resolver::{Primitive, ResolvedType, TypeRef};
use heck::ToLowerCamelCase;

/// TypeScript type mapper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptMapper;

impl TypeScriptMapper {
    fn base_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive { primitive } => self.map_primitive(*primitive).to_string(),
            TypeRef::Named { name } => name.clone(),
            TypeRef::Array { item, .. } => {
                let item = self.map_type(item);
                if item.contains(" | ") {
                    format!("({})[]", item)
                } else {
                    format!("{}[]", item)
                }
            }
            TypeRef::Map { value } => format!("Record<string, {}>", self.map_type(value)),
            TypeRef::Tuple { items, rest } => {
                let mut parts: Vec<String> = items.iter().map(|i| self.map_type(i)).collect();
                if let Some(rest) = rest {
                    let rest = self.base_type(&TypeRef::Array {
                        item: rest.clone(),
                        unique: false,
                    });
                    parts.push(format!("...{}", rest));
                }
                format!("[{}]", parts.join(", "))
            }
            TypeRef::Union { members } => {
                let members: Vec<String> = members.iter().map(|m| self.map_type(m)).collect();
                members.join(" | ")
            }
            TypeRef::Any => "unknown".to_string(),
        }
    }
}

impl TypeMapper for TypeScriptMapper {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn map_primitive(&self, primitive: Primitive) -> &'static str {
        match primitive {
            Primitive::Int8
            | Primitive::UInt8
            | Primitive::Int16
            | Primitive::Int32
            | Primitive::Int64
            | Primitive::UInt32
            | Primitive::UInt64
            | Primitive::Float
            | Primitive::Double
            | Primitive::Decimal => "number",
            Primitive::Boolean => "boolean",
            Primitive::String
            | Primitive::Date
            | Primitive::DateTime
            | Primitive::Time
            | Primitive::Duration
            | Primitive::Uuid
            | Primitive::Uri
            | Primitive::Bytes => "string",
            Primitive::Binary => "Blob",
        }
    }

    fn map_type(&self, ty: &ResolvedType) -> String {
        let base = self.base_type(&ty.ty);
        if ty.nullable && ty.ty != TypeRef::Any {
            format!("{} | null", base)
        } else {
            base
        }
    }

    // Optional members are marked on the name (`name?: T`).
    fn map_member_type(&self, ty: &ResolvedType, _optional: bool) -> String {
        self.map_type(ty)
    }

    fn escape_identifier(&self, name: &str) -> String {
        escape_typescript(name)
    }

    fn method_name(&self, operation: &str) -> String {
        operation.to_lower_camel_case()
    }

    fn async_return_type(&self, inner: Option<&str>) -> String {
        format!("Promise<{}>", inner.unwrap_or("void"))
    }

    fn render_signature(&self, signature: &MethodSignature) -> String {
        let params: Vec<String> = signature
            .parameters
            .iter()
            .map(|p| {
                let marker = if p.optional { "?" } else { "" };
                format!("{}{}: {}", p.name, marker, p.ty)
            })
            .collect();
        format!(
            "{}({}): {}",
            signature.name,
            params.join(", "),
            signature.return_type
        )
    }
}
