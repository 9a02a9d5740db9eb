#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving target-safe identifiers from OpenAPI names: component
//! keys, property names, operation IDs, path templates and enum values.

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use regex::Regex;
use std::sync::OnceLock;

/// C# reserved keywords (escaped with `@`).
pub const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// TypeScript reserved words that cannot be used as parameter names.
pub const TYPESCRIPT_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with",
];

fn identifier_re() -> &'static Regex {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"))
}

pub(crate) fn path_param_re() -> &'static Regex {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    PARAM_RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("Invalid regex"))
}

/// Converts a raw name into a PascalCase type identifier.
///
/// Names that are already valid identifiers keep their casing (`UserDTO` stays `UserDTO`)
/// apart from an upper-cased first letter. Anything else goes through word splitting
/// (`pet-store_item` -> `PetStoreItem`). Returns an empty string when nothing survives.
pub fn to_type_name(raw: &str) -> String {
    if identifier_re().is_match(raw) && !raw.contains('_') {
        let mut chars = raw.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    raw.to_upper_camel_case()
}

/// Converts a JSON property name into a PascalCase member identifier.
///
/// A leading digit is prefixed with `_` (`2fa` -> `_2fa`).
pub fn to_property_name(json_name: &str) -> String {
    let name = to_type_name(json_name);
    if name.is_empty() {
        return "Property".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}

/// Converts a wire name (e.g. `X-Request-Id`, `page[size]`) into a camelCase parameter
/// identifier.
pub fn to_parameter_name(wire_name: &str) -> String {
    let name = wire_name.to_lower_camel_case();
    if name.is_empty() {
        return "param".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("p{}", name)
    } else {
        name
    }
}

/// Derives an operation name from the HTTP Method and URL path when `operationId` is missing.
///
/// e.g. `GET /users/{id}/posts` -> `GetUsersByIdPosts`
pub fn derive_operation_name(method: &str, path: &str) -> String {
    let mut name = method.to_upper_camel_case();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match path_param_re().captures(segment) {
            Some(caps) if caps.get(0).map(|m| m.as_str()) == Some(segment) => {
                name.push_str("By");
                name.push_str(&caps[1].to_upper_camel_case());
            }
            _ => name.push_str(&segment.to_upper_camel_case()),
        }
    }
    name
}

/// Returns the placeholder names of a path template in order (`/a/{x}/b/{y}` -> `[x, y]`).
pub fn path_template_params(path: &str) -> Vec<String> {
    path_param_re()
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Escapes a C# keyword with the verbatim prefix (`class` -> `@class`).
pub fn escape_csharp(name: &str) -> String {
    if CSHARP_KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Escapes a TypeScript reserved word with a trailing underscore (`default` -> `default_`).
pub fn escape_typescript(name: &str) -> String {
    if TYPESCRIPT_RESERVED.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Appends `2`, `3`, ... to `base` until `taken` reports it free.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
