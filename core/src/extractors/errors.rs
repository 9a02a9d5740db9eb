//! # Error Model Extraction
//!
//! Components used as error payloads: those returned by a `4XX`, `5XX` or `default`
//! response, and those flagged with `x-error: true`.

use crate::error::{AppError, AppResult};
use crate::extractors::results::{ResultModel, StatusCode};
use crate::resolver::TypeResolver;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Marks a component as an error payload regardless of where it is used.
pub const X_ERROR: &str = "x-error";

const PROBLEM_JSON: &str = "application/problem+json";

/// A component used as an error payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorModel {
    /// Target type name.
    pub name: String,
    /// Component key.
    pub source_name: String,
    /// Statuses the component is returned with, in first-seen order.
    pub status_codes: Vec<StatusCode>,
    /// Operations returning it.
    pub operations: Vec<String>,
    /// Served as RFC 7807 problem details.
    pub is_problem_details: bool,
    /// Flagged with `x-error: true`.
    pub explicit: bool,
}

/// Collects error models from the extracted results and the `x-error` flags.
pub fn extract_errors(
    resolver: &TypeResolver<'_>,
    results: &[ResultModel],
) -> AppResult<Vec<ErrorModel>> {
    let by_type: IndexMap<&str, &str> = resolver
        .components()
        .filter(|(_, _, kind)| kind.is_named())
        .map(|(raw, name, _)| (name, raw))
        .collect();

    let mut errors: IndexMap<String, ErrorModel> = IndexMap::new();

    for (raw, name, kind) in resolver.components() {
        if !kind.is_named() || !is_flagged(resolver, raw)? {
            continue;
        }
        errors.insert(name.to_string(), ErrorModel::new(name, raw, true));
    }

    for result in results {
        for case in result.cases.iter().filter(|c| c.status.is_error()) {
            let Some(type_name) = case.body.as_ref().and_then(|b| b.ty.named_type()) else {
                continue;
            };
            let Some(raw) = by_type.get(type_name) else {
                continue;
            };
            let model = errors
                .entry(type_name.to_string())
                .or_insert_with(|| ErrorModel::new(type_name, raw, false));
            if !model.status_codes.contains(&case.status) {
                model.status_codes.push(case.status);
            }
            if !model.operations.contains(&result.operation) {
                model.operations.push(result.operation.clone());
            }
            if case
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(PROBLEM_JSON))
            {
                model.is_problem_details = true;
            }
        }
    }

    tracing::debug!(count = errors.len(), "extracted error models");
    Ok(errors.into_values().collect())
}

impl ErrorModel {
    fn new(name: &str, raw: &str, explicit: bool) -> Self {
        ErrorModel {
            name: name.to_string(),
            source_name: raw.to_string(),
            status_codes: Vec::new(),
            operations: Vec::new(),
            is_problem_details: false,
            explicit,
        }
    }
}

fn is_flagged(resolver: &TypeResolver<'_>, raw: &str) -> AppResult<bool> {
    let Some(schema) = resolver.document().schema(raw) else {
        return Ok(false);
    };
    match schema.extension(X_ERROR) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(AppError::invalid_extension(
            X_ERROR,
            format!("expected a boolean on '{}', found {}", raw, other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::extractors::results::extract_result;
    use crate::oas::OpenApiDocument;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: Shop, version: '1'}
paths:
  /orders:
    get:
      operationId: listOrders
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {type: array, items: {$ref: '#/components/schemas/Order'}}
        '4XX':
          description: client error
          content:
            application/problem+json:
              schema: {$ref: '#/components/schemas/Problem'}
        default:
          description: other
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Problem'}
    post:
      operationId: createOrder
      responses:
        '201':
          description: created
        '409':
          description: conflict
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Conflict'}
components:
  schemas:
    Order:
      type: object
      properties:
        id: {type: string}
    Problem:
      type: object
      properties:
        title: {type: string}
        status: {type: integer}
    Conflict:
      type: object
      properties:
        existing: {type: string}
    ValidationFailure:
      type: object
      x-error: true
      properties:
        field: {type: string}
"#;

    fn errors(text: &str) -> AppResult<Vec<ErrorModel>> {
        let doc = OpenApiDocument::parse(text).unwrap();
        let config = GeneratorConfig::default();
        let resolver = TypeResolver::new(&doc, &config);
        let results = doc
            .operations()
            .iter()
            .map(|entry| {
                let name = entry.operation.operation_id.as_deref().unwrap_or_default();
                extract_result(&resolver, &crate::naming::to_type_name(name), entry.operation)
            })
            .collect::<AppResult<Vec<_>>>()?;
        extract_errors(&resolver, &results)
    }

    #[test]
    fn test_error_components_collected() {
        let models = errors(DOC).unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ValidationFailure", "Problem", "Conflict"]);

        let problem = &models[1];
        assert_eq!(
            problem.status_codes,
            vec![StatusCode::Range(4), StatusCode::Default]
        );
        assert_eq!(problem.operations, vec!["ListOrders".to_string()]);
        assert!(problem.is_problem_details);
        assert!(!problem.explicit);

        let conflict = &models[2];
        assert_eq!(conflict.status_codes, vec![StatusCode::Code(409)]);
        assert!(!conflict.is_problem_details);

        assert!(models[0].explicit);
        assert!(models[0].operations.is_empty());
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let text = DOC.replace("x-error: true", "x-error: maybe");
        assert!(matches!(
            errors(&text),
            Err(AppError::InvalidExtension { .. })
        ));
    }
}
