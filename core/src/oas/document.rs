#![deny(missing_docs)]

//! # OpenAPI Document
//!
//! Parses an OpenAPI 3.0 / 3.1 document (YAML or JSON) into the shim layer and offers
//! local component lookup for the resolvers and extractors.

use crate::error::{AppError, AppResult};
use crate::oas::normalization::normalize_boolean_schemas;
use crate::oas::ref_utils::{extract_component_name, ComponentSection};
use crate::oas::schema::Schema;
use crate::oas::shims::{
    RefOr, ShimHeader, ShimOpenApi, ShimOperation, ShimParameter, ShimPathItem, ShimRequestBody,
    ShimResponse,
};
use serde_json::Value;
use url::Url;

/// The OpenAPI major/minor line a document was written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SpecVersion {
    /// 3.0.x: `nullable`, boolean `exclusiveMinimum`.
    V3_0,
    /// 3.1.x and 3.2.x: JSON Schema 2020-12 alignment.
    V3_1,
}

/// A single operation together with the path item it lives on.
#[derive(Debug, Clone, Copy)]
pub struct OperationEntry<'a> {
    /// Path template (e.g. `/users/{id}`).
    pub path: &'a str,
    /// Upper-case HTTP method.
    pub method: &'static str,
    /// The enclosing Path Item.
    pub path_item: &'a ShimPathItem,
    /// The Operation Object.
    pub operation: &'a ShimOperation,
}

/// A parsed OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    /// The deserialized shim.
    pub shim: ShimOpenApi,
    /// Detected version line.
    pub version: SpecVersion,
}

impl OpenApiDocument {
    /// Parses a YAML or JSON document.
    ///
    /// Boolean schemas are normalized before deserializing. Swagger 2.0 and unknown
    /// versions are rejected with [`AppError::UnsupportedVersion`].
    pub fn parse(content: &str) -> AppResult<Self> {
        let mut raw: Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI YAML: {}", e)))?;

        let version = detect_version(&raw)?;
        normalize_boolean_schemas(&mut raw);

        let shim: ShimOpenApi = serde_json::from_value(raw)
            .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI document: {}", e)))?;

        tracing::debug!(
            ?version,
            schemas = shim.components.schemas.len(),
            paths = shim.paths.items.len(),
            "parsed OpenAPI document"
        );

        Ok(Self { shim, version })
    }

    /// The `info.title`, or an empty string.
    pub fn title(&self) -> &str {
        self.shim.info.as_ref().map(|i| i.title.as_str()).unwrap_or("")
    }

    /// The `info.version`, or an empty string.
    pub fn api_version(&self) -> &str {
        self.shim
            .info
            .as_ref()
            .map(|i| i.version.as_str())
            .unwrap_or("")
    }

    /// The path portion of the first server URL (e.g. `/v1`), if any.
    ///
    /// Relative server URLs are resolved against a placeholder origin.
    pub fn base_path(&self) -> Option<String> {
        let server = self.shim.servers.first()?;
        let placeholder = Url::parse("http://localhost/").ok()?;
        let url = placeholder.join(&server.url).ok()?;
        let path = url.path().trim_end_matches('/');
        if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        }
    }

    /// Looks up a component schema by its raw name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.shim.components.schemas.get(name)
    }

    /// Resolves a `$ref` to `(component name, schema)`.
    pub fn resolve_schema_ref(&self, reference: &str) -> AppResult<(&str, &Schema)> {
        let name = extract_component_name(reference, ComponentSection::Schemas)
            .ok_or_else(|| AppError::UnresolvedReference(reference.to_string()))?;
        self.shim
            .components
            .schemas
            .get_key_value(name.as_str())
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| AppError::UnresolvedReference(reference.to_string()))
    }

    /// Resolves an inline-or-referenced parameter.
    pub fn resolve_parameter<'a>(
        &'a self,
        item: &'a RefOr<ShimParameter>,
    ) -> AppResult<&'a ShimParameter> {
        self.resolve_component(item, ComponentSection::Parameters, |name| {
            self.shim.components.parameters.get(name)
        })
    }

    /// Resolves an inline-or-referenced request body.
    pub fn resolve_request_body<'a>(
        &'a self,
        item: &'a RefOr<ShimRequestBody>,
    ) -> AppResult<&'a ShimRequestBody> {
        self.resolve_component(item, ComponentSection::RequestBodies, |name| {
            self.shim.components.request_bodies.get(name)
        })
    }

    /// Resolves an inline-or-referenced response.
    pub fn resolve_response<'a>(
        &'a self,
        item: &'a RefOr<ShimResponse>,
    ) -> AppResult<&'a ShimResponse> {
        self.resolve_component(item, ComponentSection::Responses, |name| {
            self.shim.components.responses.get(name)
        })
    }

    /// Resolves an inline-or-referenced header.
    pub fn resolve_header<'a>(&'a self, item: &'a RefOr<ShimHeader>) -> AppResult<&'a ShimHeader> {
        self.resolve_component(item, ComponentSection::Headers, |name| {
            self.shim.components.headers.get(name)
        })
    }

    fn resolve_component<'a, T>(
        &'a self,
        item: &'a RefOr<T>,
        section: ComponentSection,
        lookup: impl Fn(&str) -> Option<&'a T>,
    ) -> AppResult<&'a T> {
        match item {
            RefOr::Item(value) => Ok(value),
            RefOr::Ref { reference } => extract_component_name(reference, section)
                .and_then(|name| lookup(name.as_str()))
                .ok_or_else(|| AppError::UnresolvedReference(reference.clone())),
        }
    }

    /// Iterates every operation in document order (paths first, then methods).
    pub fn operations(&self) -> Vec<OperationEntry<'_>> {
        let mut out = Vec::new();
        for (path, item) in &self.shim.paths.items {
            for (method, operation) in item.operations() {
                out.push(OperationEntry {
                    path,
                    method,
                    path_item: item,
                    operation,
                });
            }
        }
        out
    }
}

fn detect_version(raw: &Value) -> AppResult<SpecVersion> {
    if let Some(swagger) = raw.get("swagger") {
        return Err(AppError::UnsupportedVersion(format!(
            "swagger {}",
            swagger.as_str().unwrap_or("?")
        )));
    }
    let version = match raw.get("openapi") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(AppError::UnsupportedVersion(
                "missing 'openapi' field".to_string(),
            ))
        }
    };

    let mut parts = version.split('.');
    match (parts.next(), parts.next()) {
        (Some("3"), Some("0")) => Ok(SpecVersion::V3_0),
        (Some("3"), Some("1" | "2")) => Ok(SpecVersion::V3_1),
        _ => Err(AppError::UnsupportedVersion(version)),
    }
}
