//! # Handler Interfaces
//!
//! Server-side handler interfaces: one per operation group, one method per operation.

use crate::extensions::OperationPolicies;
use crate::extractors::operations::{OperationModel, ParameterModel, RequestBodyModel};
use crate::naming::to_type_name;
use indexmap::IndexMap;
use serde::Serialize;

/// One handler method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerMethod {
    /// Operation name.
    pub name: String,
    /// Upper-case HTTP method.
    pub http_method: String,
    /// Route template.
    pub path: String,
    /// Parameters.
    pub parameters: Vec<ParameterModel>,
    /// Request body.
    pub request_body: Option<RequestBodyModel>,
    /// `{Operation}Result`.
    pub result: String,
    /// Cache, retry and security policies.
    pub policies: OperationPolicies,
    /// `deprecated`.
    pub deprecated: bool,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// A `{Group}Handler` interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerInterface {
    /// Interface name.
    pub name: String,
    /// Group the operations share.
    pub group: String,
    /// Methods in document order.
    pub methods: Vec<HandlerMethod>,
}

impl From<&OperationModel> for HandlerMethod {
    fn from(op: &OperationModel) -> Self {
        HandlerMethod {
            name: op.name.clone(),
            http_method: op.method.clone(),
            path: op.path.clone(),
            parameters: op.parameters.clone(),
            request_body: op.request_body.clone(),
            result: op.result.name.clone(),
            policies: op.policies.clone(),
            deprecated: op.deprecated,
            summary: op.summary.clone(),
            description: op.description.clone(),
        }
    }
}

/// Groups `operations` into handler interfaces, in order of first appearance.
pub fn extract_handlers(operations: &[OperationModel]) -> Vec<HandlerInterface> {
    let mut groups: IndexMap<&str, Vec<HandlerMethod>> = IndexMap::new();
    for op in operations {
        groups.entry(op.group.as_str()).or_default().push(op.into());
    }
    groups
        .into_iter()
        .map(|(group, methods)| HandlerInterface {
            name: format!("{}Handler", to_type_name(group)),
            group: group.to_string(),
            methods,
        })
        .collect()
}
