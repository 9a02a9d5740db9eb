//! # Enum Extraction
//!
//! String and integer enumerations. Member identifiers come from `x-enum-varnames` /
//! `x-enumNames` when present, and are derived from the values otherwise.

use crate::naming::{to_type_name, unique_name};
use crate::oas::schema::Schema;
use crate::resolver::{JsonType, TypeFlags};
use serde::Serialize;
use serde_json::Value;

/// Value type of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnumKind {
    /// String values.
    String,
    /// Integer values.
    Integer,
}

/// One enum member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    /// Target identifier.
    pub name: String,
    /// Wire value.
    pub value: Value,
    /// From `x-enum-descriptions`.
    pub description: Option<String>,
}

/// A generated enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumModel {
    /// Target type name.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Value type.
    pub kind: EnumKind,
    /// Members in declaration order, `null` excluded.
    pub members: Vec<EnumMember>,
    /// Whether `null` is accepted.
    pub nullable: bool,
    /// `deprecated: true`.
    pub deprecated: bool,
}

const NAME_EXTENSIONS: &[&str] = &["x-enum-varnames", "x-enumNames"];
const DESCRIPTION_EXTENSION: &str = "x-enum-descriptions";

/// Builds the enum `name` from `schema`.
pub fn extract_enum(name: &str, schema: &Schema) -> EnumModel {
    let flags = TypeFlags::of(schema);
    let kind = match flags.single() {
        Some(JsonType::Integer) => EnumKind::Integer,
        _ => EnumKind::String,
    };
    let all_values: &[Value] = schema.enum_values.as_deref().unwrap_or(&[]);

    let names = aligned_strings(schema, NAME_EXTENSIONS, all_values);
    let descriptions = aligned_strings(schema, &[DESCRIPTION_EXTENSION], all_values);

    let mut members: Vec<EnumMember> = Vec::new();
    for (index, value) in all_values.iter().enumerate() {
        if value.is_null() {
            continue;
        }
        let explicit = names
            .as_ref()
            .and_then(|n| n.get(index).cloned().flatten())
            .map(|n| to_type_name(&n))
            .filter(|n| !n.is_empty());
        let base = explicit.unwrap_or_else(|| member_name(value));
        let member = unique_name(&base, |candidate| members.iter().any(|m| m.name == candidate));
        members.push(EnumMember {
            name: member,
            value: value.clone(),
            description: descriptions
                .as_ref()
                .and_then(|d| d.get(index).cloned().flatten()),
        });
    }

    tracing::debug!(enum_name = name, members = members.len(), "extracted enum");
    EnumModel {
        name: name.to_string(),
        description: schema.description.clone(),
        kind,
        members,
        nullable: flags.includes_null,
        deprecated: schema.deprecated.unwrap_or(false),
    }
}

/// Reads the first present string-array extension among `keys`, aligned to `values`.
///
/// The array may list an entry for every value (nulls included) or only for the non-null
/// values; any other length is ignored.
fn aligned_strings(schema: &Schema, keys: &[&str], values: &[Value]) -> Option<Vec<Option<String>>> {
    let (key, raw) = keys
        .iter()
        .find_map(|key| schema.extension(key).map(|raw| (*key, raw)))?;
    let Some(entries) = raw.as_array() else {
        tracing::warn!(key, "expected an array; skipping");
        return None;
    };
    let entries: Vec<Option<String>> = entries
        .iter()
        .map(|e| e.as_str().map(str::to_string))
        .collect();

    if entries.len() == values.len() {
        return Some(entries);
    }
    let non_null = values.iter().filter(|v| !v.is_null()).count();
    if entries.len() == non_null {
        let mut iter = entries.into_iter();
        return Some(
            values
                .iter()
                .map(|v| if v.is_null() { None } else { iter.next().flatten() })
                .collect(),
        );
    }
    tracing::warn!(
        key,
        expected = values.len(),
        found = entries.len(),
        "length does not match enum values; skipping"
    );
    None
}

/// Derives a member identifier from a value.
fn member_name(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) if i < 0 => format!("ValueMinus{}", i.unsigned_abs()),
            Some(i) => format!("Value{}", i),
            None => format!("Value{}", to_type_name(&n.to_string().replace(['.', '-'], "_"))),
        },
        Value::String(s) if s.is_empty() => "Empty".to_string(),
        Value::String(s) => {
            let name = to_type_name(s);
            if name.is_empty() {
                "Value".to_string()
            } else if name.starts_with(|c: char| c.is_ascii_digit()) {
                format!("Value{}", name)
            } else {
                name
            }
        }
        Value::Bool(b) => to_type_name(&b.to_string()),
        _ => "Value".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn names(model: &EnumModel) -> Vec<&str> {
        model.members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_string_members() {
        let model = extract_enum(
            "Status",
            &schema("type: string\nenum: [active, in_progress, '', 2fa, ACTIVE, 'active']"),
        );
        assert_eq!(model.kind, EnumKind::String);
        assert_eq!(
            names(&model),
            vec!["Active", "InProgress", "Empty", "Value2fa", "ACTIVE", "Active2"]
        );
    }

    #[test]
    fn test_integer_members() {
        let model = extract_enum("Level", &schema("type: integer\nenum: [0, 1, -1]"));
        assert_eq!(model.kind, EnumKind::Integer);
        assert_eq!(names(&model), vec!["Value0", "Value1", "ValueMinus1"]);
        assert_eq!(model.members[2].value, json!(-1));
    }

    #[test]
    fn test_var_names_and_descriptions() {
        let model = extract_enum(
            "Priority",
            &schema(
                "type: integer\nenum: [1, 2, 3]\nx-enum-varnames: [Low, Medium, High]\nx-enum-descriptions: [least, '', most]",
            ),
        );
        assert_eq!(names(&model), vec!["Low", "Medium", "High"]);
        assert_eq!(model.members[0].description.as_deref(), Some("least"));
        assert_eq!(model.members[2].description.as_deref(), Some("most"));
    }

    #[test]
    fn test_mismatched_var_names_ignored() {
        let model = extract_enum(
            "Priority",
            &schema("type: integer\nenum: [1, 2]\nx-enumNames: [Low]"),
        );
        assert_eq!(names(&model), vec!["Value1", "Value2"]);
    }

    #[test]
    fn test_nullable_enum() {
        let model = extract_enum(
            "Color",
            &schema("type: [string, 'null']\nenum: [red, null]\nx-enumNames: [Crimson]"),
        );
        assert!(model.nullable);
        assert_eq!(names(&model), vec!["Crimson"]);
    }
}
