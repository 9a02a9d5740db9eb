//! # Model Extraction Entry Point
//!
//! Parses a document and runs every extractor, producing the complete [`ApiModel`] the
//! emission layer renders from.

use crate::composition::ComponentKind;
use crate::config::GeneratorConfig;
use crate::error::AppResult;
use crate::extractors::{
    extract_clients, extract_enum, extract_errors, extract_handlers, extract_hierarchy,
    extract_operations, extract_record, extract_tuple, extract_union, ClientModel, EnumModel,
    ErrorModel, HandlerInterface, RecordModel, ResultModel, TupleModel, UnionModel,
};
use crate::mapping::TypeMapper;
use crate::oas::schema::Schema;
use crate::oas::OpenApiDocument;
use crate::resolver::TypeResolver;
use serde::Serialize;

/// Everything extracted from one document, in document order.
///
/// Components come first, followed by the types synthesized from inline schemas in the
/// order they were met.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ApiModel {
    /// `info.title`.
    pub title: String,
    /// `info.version`.
    pub version: String,
    /// Namespace (C#) or module prefix the emitted files are placed in.
    pub namespace: String,
    /// Object types.
    pub records: Vec<RecordModel>,
    /// Enumerations.
    pub enums: Vec<EnumModel>,
    /// Positional tuples.
    pub tuples: Vec<TupleModel>,
    /// Polymorphic types.
    pub unions: Vec<UnionModel>,
    /// Error payload components.
    pub errors: Vec<ErrorModel>,
    /// One result per operation.
    pub results: Vec<ResultModel>,
    /// Server handler interfaces.
    pub handlers: Vec<HandlerInterface>,
    /// HTTP clients.
    pub clients: Vec<ClientModel>,
}

impl ApiModel {
    /// A mapper for the configured target that knows which generated names are enums.
    pub fn mapper(&self, config: &GeneratorConfig) -> Box<dyn TypeMapper> {
        config.mapper(self.enums.iter().map(|e| e.name.as_str()))
    }

    fn add_type(
        &mut self,
        resolver: &TypeResolver<'_>,
        name: &str,
        raw: Option<&str>,
        schema: &Schema,
        kind: ComponentKind,
    ) -> AppResult<()> {
        match kind {
            ComponentKind::Record => {
                self.records.push(extract_record(resolver, name, raw, schema)?);
            }
            ComponentKind::Hierarchy => {
                self.records.push(extract_record(resolver, name, raw, schema)?);
                if let Some(raw) = raw {
                    self.unions.push(extract_hierarchy(resolver, name, raw, schema));
                }
            }
            ComponentKind::Enum => self.enums.push(extract_enum(name, schema)),
            ComponentKind::Tuple => self.tuples.push(extract_tuple(resolver, name, schema)?),
            ComponentKind::Union => self.unions.push(extract_union(resolver, name, schema)?),
            ComponentKind::Alias => {}
        }
        Ok(())
    }
}

/// Parses `text` and extracts the full model.
pub fn extract_api(text: &str, config: &GeneratorConfig) -> AppResult<ApiModel> {
    let doc = OpenApiDocument::parse(text)?;
    extract_document(&doc, config)
}

/// Extracts the full model from an already parsed document.
pub fn extract_document(doc: &OpenApiDocument, config: &GeneratorConfig) -> AppResult<ApiModel> {
    let resolver = TypeResolver::new(doc, config);
    let mut model = ApiModel {
        title: doc.title().to_string(),
        version: doc.api_version().to_string(),
        namespace: config.namespace.clone(),
        ..ApiModel::default()
    };

    for (raw, name, kind) in resolver.components() {
        let Some(schema) = doc.schema(raw) else {
            continue;
        };
        model.add_type(&resolver, name, Some(raw), schema, kind)?;
    }

    let operations = extract_operations(&resolver)?;
    model.results = operations.iter().map(|op| op.result.clone()).collect();
    model.handlers = extract_handlers(&operations);
    model.clients = extract_clients(&operations, doc.base_path().as_deref());
    model.errors = extract_errors(&resolver, &model.results)?;

    // Extracting a synthesized type can synthesize more.
    loop {
        let pending = resolver.take_pending();
        if pending.is_empty() {
            break;
        }
        for synthesized in pending {
            model.add_type(
                &resolver,
                &synthesized.name,
                None,
                &synthesized.schema,
                synthesized.kind,
            )?;
        }
    }

    tracing::debug!(
        records = model.records.len(),
        enums = model.enums.len(),
        tuples = model.tuples.len(),
        unions = model.unions.len(),
        operations = operations.len(),
        "extracted api model"
    );
    Ok(model)
}
