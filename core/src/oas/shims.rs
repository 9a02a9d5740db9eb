#![deny(missing_docs)]

//! # Document Shims
//!
//! Generic structures acting as an Intermediate Deserialization Layer.
//! These structs map directly to OpenAPI YAML objects and stay loose enough to accept
//! both 3.0 and 3.1 documents.

use crate::oas::schema::Schema;
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Either a `$ref` to a reusable component or the inline object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// `{ $ref: "#/components/..." }`
    Ref {
        /// Reference target.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline definition.
    Item(T),
}

/// Schema for the root document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShimOpenApi {
    /// OpenAPI version (e.g. "3.1.0").
    pub openapi: Option<String>,

    /// Swagger version (e.g. "2.0"), only read to reject it.
    pub swagger: Option<String>,

    /// Metadata about the API.
    pub info: Option<ShimInfo>,

    /// Server configuration.
    #[serde(default)]
    pub servers: Vec<ShimServer>,

    /// Path items.
    #[serde(default)]
    pub paths: ShimPaths,

    /// Reusable components.
    #[serde(default)]
    pub components: ShimComponents,

    /// Global security requirements.
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirementMap>>,

    /// Specification Extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A single Security Requirement Object: scheme name -> scopes.
pub type SecurityRequirementMap = IndexMap<String, Vec<String>>;

/// Metadata about the API (Info Object).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShimInfo {
    /// The title of the API.
    pub title: String,
    /// The version of the OpenAPI document.
    pub version: String,
    /// A description of the API.
    pub description: Option<String>,
}

/// Server Object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShimServer {
    /// Server URL (absolute or relative, may contain `{variables}`).
    pub url: String,
    /// Description.
    pub description: Option<String>,
}

/// Represents the Paths Object with support for specification extensions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShimPaths {
    /// Parsed path items keyed by path template, in document order.
    pub items: IndexMap<String, ShimPathItem>,
    /// Extensions attached to the Paths Object (x-...).
    pub extensions: BTreeMap<String, Value>,
}

impl<'de> Deserialize<'de> for ShimPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();
        let mut extensions = BTreeMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                extensions.insert(key, value);
                continue;
            }
            let path_item = serde_json::from_value::<ShimPathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items, extensions })
    }
}

/// Path Item Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimPathItem {
    /// Summary shared by all operations.
    pub summary: Option<String>,
    /// Description shared by all operations.
    pub description: Option<String>,
    /// GET operation.
    pub get: Option<ShimOperation>,
    /// PUT operation.
    pub put: Option<ShimOperation>,
    /// POST operation.
    pub post: Option<ShimOperation>,
    /// DELETE operation.
    pub delete: Option<ShimOperation>,
    /// OPTIONS operation.
    pub options: Option<ShimOperation>,
    /// HEAD operation.
    pub head: Option<ShimOperation>,
    /// PATCH operation.
    pub patch: Option<ShimOperation>,
    /// TRACE operation.
    pub trace: Option<ShimOperation>,
    /// Parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Specification Extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl ShimPathItem {
    /// Returns `(METHOD, operation)` pairs in the conventional declaration order.
    pub fn operations(&self) -> Vec<(&'static str, &ShimOperation)> {
        [
            ("GET", self.get.as_ref()),
            ("PUT", self.put.as_ref()),
            ("POST", self.post.as_ref()),
            ("DELETE", self.delete.as_ref()),
            ("OPTIONS", self.options.as_ref()),
            ("HEAD", self.head.as_ref()),
            ("PATCH", self.patch.as_ref()),
            ("TRACE", self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|o| (method, o)))
        .collect()
    }
}

/// Operation Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimOperation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Tags used for grouping.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Request body.
    #[serde(rename = "requestBody")]
    pub request_body: Option<RefOr<ShimRequestBody>>,
    /// Responses keyed by status code (`200`, `4XX`, `default`).
    #[serde(default, deserialize_with = "deserialize_status_keys")]
    pub responses: IndexMap<String, RefOr<ShimResponse>>,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Security requirements; `Some([])` means anonymous.
    pub security: Option<Vec<SecurityRequirementMap>>,
    /// Specification Extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// Drops `x-` keys from the Responses Object before parsing each response.
fn deserialize_status_keys<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, RefOr<ShimResponse>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    let mut out = IndexMap::new();
    for (key, value) in raw {
        if key.starts_with("x-") {
            continue;
        }
        let response = serde_json::from_value::<RefOr<ShimResponse>>(value).map_err(|e| {
            DeError::custom(format!("Failed to parse response '{}': {}", key, e))
        })?;
        out.insert(key, response);
    }
    Ok(out)
}

/// Parameter Object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShimParameter {
    /// Name of the parameter.
    pub name: String,
    /// Location of the parameter (query, path, header, cookie).
    #[serde(rename = "in")]
    pub location: String,
    /// Description.
    pub description: Option<String>,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Schema definition.
    pub schema: Option<Schema>,
    /// Alternative to `schema`: a single-entry media type map.
    pub content: Option<IndexMap<String, ShimMediaType>>,
    /// Serialization style.
    pub style: Option<String>,
    /// Explode modifier.
    pub explode: Option<bool>,
    /// Specification Extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// Request Body Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimRequestBody {
    /// Description.
    pub description: Option<String>,
    /// Media types.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Whether the body is required.
    #[serde(default)]
    pub required: bool,
}

/// Media Type Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimMediaType {
    /// Body schema.
    pub schema: Option<Schema>,
}

/// Response Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimResponse {
    /// Description.
    pub description: Option<String>,
    /// Response headers.
    #[serde(default)]
    pub headers: IndexMap<String, RefOr<ShimHeader>>,
    /// Media types.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// Header Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimHeader {
    /// Description.
    pub description: Option<String>,
    /// Whether the header is always sent.
    #[serde(default)]
    pub required: bool,
    /// Header value schema.
    pub schema: Option<Schema>,
}

/// Components object holding reusable definitions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimComponents {
    /// Schemas, in document order.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, ShimParameter>,
    /// Reusable request bodies.
    #[serde(rename = "requestBodies", default)]
    pub request_bodies: IndexMap<String, ShimRequestBody>,
    /// Reusable responses.
    #[serde(default)]
    pub responses: IndexMap<String, ShimResponse>,
    /// Reusable headers.
    #[serde(default)]
    pub headers: IndexMap<String, ShimHeader>,
    /// Security Schemes.
    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: IndexMap<String, ShimSecurityScheme>,
}

/// Security Scheme Object.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ShimSecurityScheme {
    /// API Key.
    #[serde(rename = "apiKey")]
    ApiKey(ShimApiKey),
    /// HTTP Authentication (Basic, Bearer).
    #[serde(rename = "http")]
    Http(ShimHttpAuth),
    /// OAuth2.
    #[serde(rename = "oauth2")]
    OAuth2(ShimDescribed),
    /// OpenID Connect.
    #[serde(rename = "openIdConnect")]
    OpenIdConnect(ShimDescribed),
    /// Mutual TLS.
    #[serde(rename = "mutualTLS")]
    MutualTls(ShimDescribed),
}

/// API Key definition.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ShimApiKey {
    /// Parameter name (header/query/cookie name).
    pub name: String,
    /// Location (query, header, cookie).
    #[serde(rename = "in")]
    pub location: String,
    /// Description.
    pub description: Option<String>,
}

/// HTTP Authentication definition.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ShimHttpAuth {
    /// Scheme (basic, bearer, etc.).
    pub scheme: String,
    /// Format (e.g. JWT).
    #[serde(rename = "bearerFormat")]
    pub bearer_format: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Schemes we classify but do not inspect further (OAuth2, OIDC, mTLS).
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ShimDescribed {
    /// Description.
    pub description: Option<String>,
    /// Remaining fields (flows, URLs).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_split_extensions() {
        let paths: ShimPaths = serde_yaml::from_str(
            r#"
/users:
  get:
    operationId: listUsers
    responses:
      200:
        description: ok
x-internal: true
"#,
        )
        .unwrap();
        assert_eq!(paths.items.len(), 1);
        assert!(paths.extensions.contains_key("x-internal"));
        let op = paths.items["/users"].get.as_ref().unwrap();
        assert!(op.responses.contains_key("200"));
    }

    #[test]
    fn test_ref_or_parameter() {
        let params: Vec<RefOr<ShimParameter>> = serde_yaml::from_str(
            r#"
- $ref: '#/components/parameters/Limit'
- name: id
  in: path
  required: true
  schema:
    type: string
"#,
        )
        .unwrap();
        assert!(matches!(&params[0], RefOr::Ref { reference } if reference.ends_with("Limit")));
        assert!(matches!(&params[1], RefOr::Item(p) if p.name == "id" && p.required));
    }

    #[test]
    fn test_security_scheme_variants() {
        let schemes: IndexMap<String, ShimSecurityScheme> = serde_yaml::from_str(
            r#"
bearer:
  type: http
  scheme: bearer
  bearerFormat: JWT
key:
  type: apiKey
  name: X-Api-Key
  in: header
oauth:
  type: oauth2
  flows: {}
"#,
        )
        .unwrap();
        assert!(matches!(schemes["bearer"], ShimSecurityScheme::Http(_)));
        assert!(matches!(schemes["key"], ShimSecurityScheme::ApiKey(_)));
        assert!(matches!(schemes["oauth"], ShimSecurityScheme::OAuth2(_)));
    }

    #[test]
    fn test_path_item_operation_order() {
        let item: ShimPathItem = serde_yaml::from_str(
            r#"
post:
  responses: {}
get:
  responses: {}
"#,
        )
        .unwrap();
        let methods: Vec<&str> = item.operations().into_iter().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["GET", "POST"]);
    }
}
