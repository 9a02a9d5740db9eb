//! # Operation Extraction
//!
//! Walks every operation in document order and gathers what handlers and clients need:
//! a unique name, merged parameters, the request body, the result model and policies.

use crate::error::{AppError, AppResult};
use crate::extensions::OperationPolicies;
use crate::extractors::results::{extract_result, ResultModel};
use crate::naming::{
    derive_operation_name, path_template_params, to_parameter_name, to_type_name, unique_name,
};
use crate::oas::document::OperationEntry;
use crate::oas::schema::Schema;
use crate::oas::shims::{ShimMediaType, ShimParameter};
use crate::resolver::flags::is_binary_media_type;
use crate::resolver::{Primitive, ResolvedType, TypeResolver};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path template placeholder.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParameterLocation {
    /// Parses the `in` keyword.
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }

    /// The serialization style used when `style` is absent.
    pub fn default_style(&self) -> &'static str {
        match self {
            ParameterLocation::Path | ParameterLocation::Header => "simple",
            ParameterLocation::Query | ParameterLocation::Cookie => "form",
        }
    }
}

/// One operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterModel {
    /// camelCase identifier.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Location.
    pub location: ParameterLocation,
    /// Resolved type.
    pub ty: ResolvedType,
    /// Always true for path parameters.
    pub required: bool,
    /// `deprecated`.
    pub deprecated: bool,
    /// Description.
    pub description: Option<String>,
    /// Serialization style.
    pub style: String,
    /// Explode modifier.
    pub explode: bool,
    /// Added for a path placeholder that no parameter declared.
    pub synthesized: bool,
}

/// How a request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyKind {
    /// JSON (`application/json`, `*+json`).
    Json,
    /// `application/x-www-form-urlencoded`.
    Form,
    /// `multipart/*`.
    Multipart,
    /// Raw bytes.
    Binary,
    /// Plain text and other textual types.
    Text,
}

/// An operation's request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodyModel {
    /// Body type.
    pub ty: ResolvedType,
    /// Chosen media type.
    pub content_type: String,
    /// Encoding.
    pub kind: BodyKind,
    /// `required`.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
}

/// Everything known about one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationModel {
    /// PascalCase operation name.
    pub name: String,
    /// `operationId` as written.
    pub operation_id: Option<String>,
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// Group (first tag, else the configured default).
    pub group: String,
    /// All tags.
    pub tags: Vec<String>,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// `deprecated`.
    pub deprecated: bool,
    /// Merged parameters.
    pub parameters: Vec<ParameterModel>,
    /// Request body.
    pub request_body: Option<RequestBodyModel>,
    /// Response union.
    pub result: ResultModel,
    /// Cache, retry and security policies.
    pub policies: OperationPolicies,
}

/// Extracts every operation in document order.
pub fn extract_operations(resolver: &TypeResolver<'_>) -> AppResult<Vec<OperationModel>> {
    let doc = resolver.document();
    let mut seen: HashSet<String> = HashSet::new();
    let mut operations = Vec::new();

    for entry in doc.operations() {
        let name = operation_name(&entry);
        if !seen.insert(name.clone()) {
            return Err(AppError::DuplicateOperation(format!(
                "{} ({} {})",
                name, entry.method, entry.path
            )));
        }
        operations.push(extract_operation(resolver, &entry, name)?);
    }
    Ok(operations)
}

/// `PascalCase(operationId)`, else a name derived from method and path.
pub fn operation_name(entry: &OperationEntry<'_>) -> String {
    entry
        .operation
        .operation_id
        .as_deref()
        .map(to_type_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| derive_operation_name(entry.method, entry.path))
}

fn extract_operation(
    resolver: &TypeResolver<'_>,
    entry: &OperationEntry<'_>,
    name: String,
) -> AppResult<OperationModel> {
    let doc = resolver.document();
    let operation = entry.operation;
    let group = operation
        .tags
        .first()
        .map(|tag| to_type_name(tag))
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| to_type_name(&resolver.config().default_group));

    let parameters = extract_parameters(resolver, entry, &name)?;

    let request_body = match &operation.request_body {
        Some(body) => {
            let body = doc.resolve_request_body(body)?;
            match select_media(&body.content) {
                Some((content_type, media)) => Some(RequestBodyModel {
                    ty: media_type(resolver, content_type, media, &format!("{}Request", name))?,
                    kind: body_kind(content_type),
                    content_type: content_type.to_string(),
                    required: body.required,
                    description: body.description.clone(),
                }),
                None => None,
            }
        }
        None => None,
    };

    let result = extract_result(resolver, &name, operation)?;
    let policies = OperationPolicies::read(doc, entry)?;

    tracing::debug!(operation = %name, method = entry.method, path = entry.path, "extracted operation");
    Ok(OperationModel {
        operation_id: operation.operation_id.clone(),
        method: entry.method.to_string(),
        path: entry.path.to_string(),
        group,
        tags: operation.tags.clone(),
        summary: operation.summary.clone(),
        description: operation.description.clone(),
        deprecated: operation.deprecated,
        parameters,
        request_body,
        result,
        policies,
        name,
    })
}

fn extract_parameters(
    resolver: &TypeResolver<'_>,
    entry: &OperationEntry<'_>,
    operation_name: &str,
) -> AppResult<Vec<ParameterModel>> {
    let doc = resolver.document();

    let mut merged: IndexMap<(String, String), &ShimParameter> = IndexMap::new();
    for item in entry
        .path_item
        .parameters
        .iter()
        .chain(entry.operation.parameters.iter())
    {
        let parameter = doc.resolve_parameter(item)?;
        merged.insert(
            (parameter.name.clone(), parameter.location.clone()),
            parameter,
        );
    }

    let mut out: Vec<ParameterModel> = Vec::with_capacity(merged.len());
    for parameter in merged.values() {
        let Some(location) = ParameterLocation::parse(&parameter.location) else {
            tracing::warn!(
                parameter = %parameter.name,
                location = %parameter.location,
                "unknown parameter location; skipping"
            );
            continue;
        };
        let hint = format!("{}{}", operation_name, to_type_name(&parameter.name));
        let ty = match parameter_schema(parameter) {
            Some(schema) => resolver.resolve(schema, Some(&hint))?,
            None => ResolvedType::primitive(Primitive::String),
        };
        let style = parameter
            .style
            .clone()
            .unwrap_or_else(|| location.default_style().to_string());
        let explode = parameter.explode.unwrap_or(style == "form");
        out.push(ParameterModel {
            name: parameter_identifier(&parameter.name, &out),
            wire_name: parameter.name.clone(),
            location,
            required: location == ParameterLocation::Path || parameter.required,
            deprecated: parameter.deprecated,
            description: parameter.description.clone(),
            ty,
            style,
            explode,
            synthesized: false,
        });
    }

    for placeholder in path_template_params(entry.path) {
        let declared = out
            .iter()
            .any(|p| p.location == ParameterLocation::Path && p.wire_name == placeholder);
        if declared {
            continue;
        }
        tracing::warn!(
            path = entry.path,
            parameter = %placeholder,
            "path placeholder has no declared parameter; assuming a string"
        );
        out.push(ParameterModel {
            name: parameter_identifier(&placeholder, &out),
            wire_name: placeholder,
            location: ParameterLocation::Path,
            ty: ResolvedType::primitive(Primitive::String),
            required: true,
            deprecated: false,
            description: None,
            style: ParameterLocation::Path.default_style().to_string(),
            explode: false,
            synthesized: true,
        });
    }
    Ok(out)
}

fn parameter_identifier(wire_name: &str, taken: &[ParameterModel]) -> String {
    unique_name(&to_parameter_name(wire_name), |candidate| {
        candidate == "body" || taken.iter().any(|p| p.name == candidate)
    })
}

fn parameter_schema(parameter: &ShimParameter) -> Option<&Schema> {
    parameter.schema.as_ref().or_else(|| {
        parameter
            .content
            .as_ref()
            .and_then(|content| content.values().next())
            .and_then(|media| media.schema.as_ref())
    })
}

/// Picks the preferred media type: JSON, `+json`, form, multipart, octet-stream, text,
/// then whatever comes first.
pub fn select_media(
    content: &IndexMap<String, ShimMediaType>,
) -> Option<(&str, &ShimMediaType)> {
    let preferences: [&dyn Fn(&str) -> bool; 6] = [
        &|m| m == "application/json",
        &|m| m.ends_with("+json") || m.ends_with("/json"),
        &|m| m == "application/x-www-form-urlencoded",
        &|m| m.starts_with("multipart/"),
        &|m| m == "application/octet-stream",
        &|m| m.starts_with("text/"),
    ];
    preferences
        .iter()
        .find_map(|matches| {
            content
                .iter()
                .find(|(key, _)| matches(media_essence(key).as_str()))
        })
        .or_else(|| content.first())
        .map(|(key, media)| (key.as_str(), media))
}

/// Classifies a media type.
pub fn body_kind(content_type: &str) -> BodyKind {
    let media = media_essence(content_type);
    if media == "application/json" || media.ends_with("+json") || media.ends_with("/json") {
        BodyKind::Json
    } else if media == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else if media.starts_with("multipart/") {
        BodyKind::Multipart
    } else if is_binary_media_type(&media) {
        BodyKind::Binary
    } else {
        BodyKind::Text
    }
}

/// Lower-cased media type without parameters (`text/plain; charset=utf-8` -> `text/plain`).
fn media_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

/// Resolves the payload type of a media type entry. Binary media are raw streams and
/// `text/*` without a schema is a string.
pub(crate) fn media_type(
    resolver: &TypeResolver<'_>,
    content_type: &str,
    media: &ShimMediaType,
    hint: &str,
) -> AppResult<ResolvedType> {
    match (body_kind(content_type), &media.schema) {
        (BodyKind::Binary, _) => Ok(ResolvedType::primitive(Primitive::Binary)),
        (BodyKind::Text, None) => Ok(ResolvedType::primitive(Primitive::String)),
        (_, Some(schema)) => resolver.resolve(schema, Some(hint)),
        (_, None) => Ok(ResolvedType::any()),
    }
}
