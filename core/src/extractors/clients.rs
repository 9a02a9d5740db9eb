//! # HTTP Clients
//!
//! Client models mirror the handler grouping. Each method knows how to build its URL,
//! what a successful call returns and which failures it documents.

use crate::extensions::{CachePolicy, RetryPolicy};
use crate::extractors::operations::{
    OperationModel, ParameterLocation, ParameterModel, RequestBodyModel,
};
use crate::extractors::results::{ResultCase, StatusCode};
use crate::naming::{path_param_re, to_parameter_name, to_type_name};
use crate::resolver::ResolvedType;
use indexmap::IndexMap;
use serde::Serialize;

/// A piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PathSegment {
    /// Fixed text, slashes included.
    Literal {
        /// Text.
        value: String,
    },
    /// A substituted path parameter.
    Parameter {
        /// Identifier of the matching parameter.
        name: String,
        /// Placeholder as written.
        wire_name: String,
    },
}

/// A documented failure of a client call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientErrorCase {
    /// Status key.
    pub status: StatusCode,
    /// Case identifier.
    pub name: String,
    /// Payload type.
    pub body: Option<ResolvedType>,
}

/// One client method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientMethod {
    /// Operation name.
    pub name: String,
    /// Upper-case HTTP method.
    pub http_method: String,
    /// Path template.
    pub path: String,
    /// Template split into literals and parameters.
    pub path_segments: Vec<PathSegment>,
    /// Parameters.
    pub parameters: Vec<ParameterModel>,
    /// Request body.
    pub request_body: Option<RequestBodyModel>,
    /// Body type of the first successful response that has one.
    pub success_type: Option<ResolvedType>,
    /// Status that `success_type` came from, else the first success status.
    pub success_status: Option<StatusCode>,
    /// Non-success cases.
    pub error_cases: Vec<ClientErrorCase>,
    /// `{Operation}Result`.
    pub result: String,
    /// `x-retry`.
    pub retry: Option<RetryPolicy>,
    /// `x-cache`.
    pub cache: Option<CachePolicy>,
    /// Whether credentials must be attached.
    pub requires_auth: bool,
    /// `deprecated`.
    pub deprecated: bool,
    /// Summary.
    pub summary: Option<String>,
}

/// A `{Group}Client`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientModel {
    /// Client name.
    pub name: String,
    /// Group the operations share.
    pub group: String,
    /// Path prefix of the first server URL.
    pub base_path: Option<String>,
    /// Methods in document order.
    pub methods: Vec<ClientMethod>,
}

/// Splits `path` into literal and parameter segments.
///
/// Placeholders are matched against the path parameters by wire name; unmatched ones
/// fall back to a camelCase identifier.
pub fn path_segments(path: &str, parameters: &[ParameterModel]) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in path_param_re().captures_iter(path) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(PathSegment::Literal {
                value: path[last..whole.start()].to_string(),
            });
        }
        let wire_name = inner.as_str();
        let name = parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Path && p.wire_name == wire_name)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| to_parameter_name(wire_name));
        segments.push(PathSegment::Parameter {
            name,
            wire_name: wire_name.to_string(),
        });
        last = whole.end();
    }
    if last < path.len() {
        segments.push(PathSegment::Literal {
            value: path[last..].to_string(),
        });
    }
    segments
}

impl From<&OperationModel> for ClientMethod {
    fn from(op: &OperationModel) -> Self {
        let success = op.result.success_body();
        let success_status = success
            .or_else(|| op.result.cases.iter().find(|c| c.is_success))
            .map(|c| c.status);
        ClientMethod {
            name: op.name.clone(),
            http_method: op.method.clone(),
            path: op.path.clone(),
            path_segments: path_segments(&op.path, &op.parameters),
            parameters: op.parameters.clone(),
            request_body: op.request_body.clone(),
            success_type: success.and_then(|c| c.body.clone()),
            success_status,
            error_cases: op.result.error_cases().map(ClientErrorCase::from).collect(),
            result: op.result.name.clone(),
            retry: op.policies.retry.as_ref().map(|s| s.value.clone()),
            cache: op.policies.cache.as_ref().map(|s| s.value.clone()),
            requires_auth: op.policies.requires_auth(),
            deprecated: op.deprecated,
            summary: op.summary.clone(),
        }
    }
}

impl From<&ResultCase> for ClientErrorCase {
    fn from(case: &ResultCase) -> Self {
        ClientErrorCase {
            status: case.status,
            name: case.name.clone(),
            body: case.body.clone(),
        }
    }
}

/// Groups `operations` into clients, in order of first appearance.
pub fn extract_clients(operations: &[OperationModel], base_path: Option<&str>) -> Vec<ClientModel> {
    let mut groups: IndexMap<&str, Vec<ClientMethod>> = IndexMap::new();
    for op in operations {
        groups.entry(op.group.as_str()).or_default().push(op.into());
    }
    groups
        .into_iter()
        .map(|(group, methods)| ClientModel {
            name: format!("{}Client", to_type_name(group)),
            group: group.to_string(),
            base_path: base_path.map(str::to_string),
            methods,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::extractors::operations::extract_operations;
    use crate::oas::OpenApiDocument;
    use crate::resolver::{TypeRef, TypeResolver};
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: Store, version: '1'}
servers:
  - url: https://api.example.com/v2
security:
  - token: []
paths:
  /stores/{store_id}/items/{item-id}.json:
    get:
      tags: [items]
      operationId: getItem
      x-retry: {maxAttempts: 5}
      x-cache: 60
      parameters:
        - {name: store_id, in: path, schema: {type: integer}}
        - {name: item-id, in: path, schema: {type: string}}
      responses:
        '204': {description: empty}
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Item'}
        '404': {description: missing}
  /ping:
    get:
      tags: [items]
      operationId: ping
      security: []
      responses:
        '204': {description: pong}
components:
  securitySchemes:
    token: {type: http, scheme: bearer}
  schemas:
    Item:
      type: object
      properties:
        id: {type: string}
"#;

    #[test]
    fn test_path_segments() {
        assert_eq!(
            path_segments("/a/{b}/c{d}", &[]),
            vec![
                PathSegment::Literal { value: "/a/".into() },
                PathSegment::Parameter { name: "b".into(), wire_name: "b".into() },
                PathSegment::Literal { value: "/c".into() },
                PathSegment::Parameter { name: "d".into(), wire_name: "d".into() },
            ]
        );
    }

    #[test]
    fn test_client_methods() {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        let operations = extract_operations(&resolver).unwrap();
        let base_path = doc.base_path();
        let clients = extract_clients(&operations, base_path.as_deref());

        assert_eq!(clients.len(), 1);
        let client = &clients[0];
        assert_eq!(client.name, "ItemsClient");
        assert_eq!(client.base_path.as_deref(), Some("/v2"));

        let get = &client.methods[0];
        assert_eq!(
            get.path_segments,
            vec![
                PathSegment::Literal { value: "/stores/".into() },
                PathSegment::Parameter { name: "storeId".into(), wire_name: "store_id".into() },
                PathSegment::Literal { value: "/items/".into() },
                PathSegment::Parameter { name: "itemId".into(), wire_name: "item-id".into() },
                PathSegment::Literal { value: ".json".into() },
            ]
        );
        assert_eq!(get.success_type.as_ref().map(|t| t.ty.clone()), Some(TypeRef::named("Item")));
        assert_eq!(get.success_status, Some(StatusCode::Code(200)));
        assert_eq!(get.error_cases.len(), 1);
        assert_eq!(get.error_cases[0].name, "NotFound");
        assert_eq!(get.retry.as_ref().map(|r| r.max_attempts), Some(5));
        assert_eq!(get.cache.as_ref().map(|c| c.ttl_seconds), Some(60));
        assert!(get.requires_auth);

        let ping = &client.methods[1];
        assert_eq!(ping.success_type, None);
        assert_eq!(ping.success_status, Some(StatusCode::Code(204)));
        assert!(!ping.requires_auth);
    }
}
