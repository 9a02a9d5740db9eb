//! # Result Extraction
//!
//! Every operation gets a `{Operation}Result` model: one case per documented response,
//! named after its status code.

use crate::error::AppResult;
use crate::extractors::operations::{media_type, select_media};
use crate::naming::{to_parameter_name, to_type_name};
use crate::oas::shims::ShimOperation;
use crate::resolver::{Primitive, ResolvedType, TypeResolver};
use serde::Serialize;

/// A response key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum StatusCode {
    /// An exact code (`404`).
    Code(u16),
    /// A class wildcard (`4XX` is `Range(4)`).
    Range(u8),
    /// `default`.
    Default,
}

impl StatusCode {
    /// Parses a Responses Object key. Returns `None` for anything unrecognised.
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.eq_ignore_ascii_case("default") {
            return Some(StatusCode::Default);
        }
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            let code = key.parse::<u16>().ok()?;
            return (100..=599).contains(&code).then_some(StatusCode::Code(code));
        }
        let bytes = key.as_bytes();
        if bytes.len() == 3 && bytes[1..].eq_ignore_ascii_case(b"XX") {
            let class = (bytes[0] as char).to_digit(10)?;
            if (1..=5).contains(&class) {
                return Some(StatusCode::Range(class as u8));
            }
        }
        None
    }

    /// Whether the status denotes success (2xx).
    pub fn is_success(&self) -> bool {
        match self {
            StatusCode::Code(code) => (200..300).contains(code),
            StatusCode::Range(class) => *class == 2,
            StatusCode::Default => false,
        }
    }

    /// Whether the status denotes a client or server error (4xx, 5xx, `default`).
    pub fn is_error(&self) -> bool {
        match self {
            StatusCode::Code(code) => *code >= 400,
            StatusCode::Range(class) => *class >= 4,
            StatusCode::Default => true,
        }
    }

    /// The case identifier (`Ok`, `NotFound`, `Status418`, `Status5XX`, `Default`).
    pub fn case_name(&self) -> String {
        match self {
            StatusCode::Code(code) => match reason_name(*code) {
                Some(name) => name.to_string(),
                None => format!("Status{}", code),
            },
            StatusCode::Range(class) => format!("Status{}XX", class),
            StatusCode::Default => "Default".to_string(),
        }
    }
}

fn reason_name(code: u16) -> Option<&'static str> {
    Some(match code {
        200 => "Ok",
        201 => "Created",
        202 => "Accepted",
        203 => "NonAuthoritativeInformation",
        204 => "NoContent",
        205 => "ResetContent",
        206 => "PartialContent",
        301 => "MovedPermanently",
        302 => "Found",
        303 => "SeeOther",
        304 => "NotModified",
        307 => "TemporaryRedirect",
        308 => "PermanentRedirect",
        400 => "BadRequest",
        401 => "Unauthorized",
        402 => "PaymentRequired",
        403 => "Forbidden",
        404 => "NotFound",
        405 => "MethodNotAllowed",
        406 => "NotAcceptable",
        408 => "RequestTimeout",
        409 => "Conflict",
        410 => "Gone",
        412 => "PreconditionFailed",
        413 => "PayloadTooLarge",
        415 => "UnsupportedMediaType",
        422 => "UnprocessableEntity",
        423 => "Locked",
        428 => "PreconditionRequired",
        429 => "TooManyRequests",
        500 => "InternalServerError",
        501 => "NotImplemented",
        502 => "BadGateway",
        503 => "ServiceUnavailable",
        504 => "GatewayTimeout",
        _ => return None,
    })
}

/// A response header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderModel {
    /// camelCase identifier.
    pub name: String,
    /// Header name on the wire.
    pub wire_name: String,
    /// Value type.
    pub ty: ResolvedType,
    /// Always sent.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
}

/// One documented response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultCase {
    /// Status key.
    pub status: StatusCode,
    /// Case identifier.
    pub name: String,
    /// Response description.
    pub description: Option<String>,
    /// Payload type, when the response has content.
    pub body: Option<ResolvedType>,
    /// Chosen media type.
    pub content_type: Option<String>,
    /// Documented headers.
    pub headers: Vec<HeaderModel>,
    /// 2xx.
    pub is_success: bool,
}

/// The response union of one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultModel {
    /// `{Operation}Result`.
    pub name: String,
    /// Operation name.
    pub operation: String,
    /// Cases in document order.
    pub cases: Vec<ResultCase>,
}

impl ResultModel {
    /// The first successful case that carries a body.
    pub fn success_body(&self) -> Option<&ResultCase> {
        self.cases
            .iter()
            .find(|c| c.is_success && c.body.is_some())
    }

    /// Cases that are not successful.
    pub fn error_cases(&self) -> impl Iterator<Item = &ResultCase> {
        self.cases.iter().filter(|c| !c.is_success)
    }
}

/// Builds `{operation_name}Result` from the operation's responses.
pub fn extract_result(
    resolver: &TypeResolver<'_>,
    operation_name: &str,
    operation: &ShimOperation,
) -> AppResult<ResultModel> {
    let doc = resolver.document();
    let mut cases = Vec::with_capacity(operation.responses.len());

    for (key, item) in &operation.responses {
        let Some(status) = StatusCode::parse(key) else {
            tracing::warn!(operation = operation_name, status = %key, "unrecognised response key; skipping");
            continue;
        };
        let response = doc.resolve_response(item)?;
        let case_name = status.case_name();

        let (body, content_type) = match select_media(&response.content) {
            Some((content_type, media)) => {
                let hint = format!("{}{}Response", operation_name, case_name);
                let body = media_type(resolver, content_type, media, &hint)?;
                (Some(body), Some(content_type.to_string()))
            }
            None => (None, None),
        };

        let mut headers = Vec::with_capacity(response.headers.len());
        for (wire_name, header) in &response.headers {
            if wire_name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            let header = doc.resolve_header(header)?;
            let hint = format!(
                "{}{}{}Header",
                operation_name,
                case_name,
                to_type_name(wire_name)
            );
            let ty = match &header.schema {
                Some(schema) => resolver.resolve(schema, Some(&hint))?,
                None => ResolvedType::primitive(Primitive::String),
            };
            headers.push(HeaderModel {
                name: to_parameter_name(wire_name),
                wire_name: wire_name.clone(),
                ty,
                required: header.required,
                description: header.description.clone(),
            });
        }

        cases.push(ResultCase {
            is_success: status.is_success(),
            status,
            name: case_name,
            description: response.description.clone(),
            body,
            content_type,
            headers,
        });
    }

    Ok(ResultModel {
        name: format!("{}Result", operation_name),
        operation: operation_name.to_string(),
        cases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::oas::OpenApiDocument;
    use crate::resolver::TypeRef;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_parsing() {
        assert_eq!(StatusCode::parse("200"), Some(StatusCode::Code(200)));
        assert_eq!(StatusCode::parse("4XX"), Some(StatusCode::Range(4)));
        assert_eq!(StatusCode::parse("5xx"), Some(StatusCode::Range(5)));
        assert_eq!(StatusCode::parse("default"), Some(StatusCode::Default));
        assert_eq!(StatusCode::parse("999"), None);
        assert_eq!(StatusCode::parse("2X"), None);
    }

    #[test]
    fn test_status_requires_plain_digits() {
        assert_eq!(StatusCode::parse("+200"), None);
        assert_eq!(StatusCode::parse("-404"), None);
        assert_eq!(StatusCode::parse("20O"), None);
        assert_eq!(StatusCode::parse("070000"), None);
    }

    #[test]
    fn test_case_names() {
        assert_eq!(StatusCode::Code(200).case_name(), "Ok");
        assert_eq!(StatusCode::Code(404).case_name(), "NotFound");
        assert_eq!(StatusCode::Code(418).case_name(), "Status418");
        assert_eq!(StatusCode::Range(5).case_name(), "Status5XX");
        assert_eq!(StatusCode::Default.case_name(), "Default");
        assert!(StatusCode::Range(2).is_success());
        assert!(!StatusCode::Default.is_success());
        assert!(StatusCode::Default.is_error());
    }

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: Files, version: '1'}
paths:
  /files/{id}:
    get:
      operationId: downloadFile
      responses:
        '200':
          description: the file
          headers:
            X-Rate-Limit:
              schema: {type: integer}
            ETag:
              $ref: '#/components/headers/ETag'
          content:
            application/octet-stream:
              schema: {type: string, format: binary}
        '202':
          description: still processing
          content:
            application/json:
              schema:
                type: object
                properties:
                  eta: {type: integer}
        '404':
          $ref: '#/components/responses/NotFound'
        default:
          description: failure
          content:
            text/plain: {}
        '2YY':
          description: not a status
components:
  headers:
    ETag:
      required: true
      schema: {type: string}
  responses:
    NotFound:
      description: missing
      content:
        application/problem+json:
          schema:
            $ref: '#/components/schemas/Problem'
  schemas:
    Problem:
      type: object
      properties:
        title: {type: string}
"#;

    #[test]
    fn test_extract_result_cases() {
        let doc = OpenApiDocument::parse(DOC).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        let op = doc.operations()[0].operation;
        let result = extract_result(&resolver, "DownloadFile", op).unwrap();

        assert_eq!(result.name, "DownloadFileResult");
        let names: Vec<&str> = result.cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ok", "Accepted", "NotFound", "Default"]);

        let ok = &result.cases[0];
        assert_eq!(
            ok.body.as_ref().map(|b| b.ty.clone()),
            Some(TypeRef::primitive(Primitive::Binary))
        );
        assert_eq!(ok.headers.len(), 2);
        assert_eq!(ok.headers[0].name, "xRateLimit");
        assert!(ok.headers[1].required);

        assert_eq!(
            result.cases[1].body.as_ref().map(|b| b.ty.clone()),
            Some(TypeRef::named("DownloadFileAcceptedResponse"))
        );

        let not_found = &result.cases[2];
        assert!(!not_found.is_success);
        assert_eq!(not_found.content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(
            not_found.body.as_ref().map(|b| b.ty.clone()),
            Some(TypeRef::named("Problem"))
        );

        assert_eq!(
            result.cases[3].body.as_ref().map(|b| b.ty.clone()),
            Some(TypeRef::primitive(Primitive::String))
        );
        assert_eq!(result.success_body().map(|c| c.name.as_str()), Some("Ok"));
        assert_eq!(result.error_cases().count(), 2);
    }
}
