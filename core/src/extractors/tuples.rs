//! # Tuple Extraction
//!
//! `prefixItems` arrays become positional tuple models with `Item1..n` elements.

use crate::error::AppResult;
use crate::oas::schema::Schema;
use crate::resolver::{ResolvedType, TypeResolver};
use serde::Serialize;

/// One positional element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleElement {
    /// `Item1`, `Item2`, ...
    pub name: String,
    /// Element type.
    pub ty: ResolvedType,
}

/// A generated tuple type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleModel {
    /// Target type name.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Positional elements.
    pub elements: Vec<TupleElement>,
    /// Type of trailing items for open tuples.
    pub rest: Option<ResolvedType>,
    /// `minItems`.
    pub min_items: Option<u64>,
    /// `maxItems`.
    pub max_items: Option<u64>,
}

impl TupleModel {
    /// Whether items beyond the prefix are allowed.
    pub fn is_open(&self) -> bool {
        self.rest.is_some()
    }
}

/// Builds the tuple `name` from a `prefixItems` schema.
pub fn extract_tuple(
    resolver: &TypeResolver<'_>,
    name: &str,
    schema: &Schema,
) -> AppResult<TupleModel> {
    let elements = schema
        .prefix_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let element = format!("Item{}", i + 1);
            let hint = format!("{}{}", name, element);
            Ok(TupleElement {
                ty: resolver.resolve(item, Some(&hint))?,
                name: element,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    let rest = resolver.resolve_tuple_rest(schema, Some(name))?;

    tracing::debug!(tuple = name, elements = elements.len(), "extracted tuple");
    Ok(TupleModel {
        name: name.to_string(),
        description: schema.description.clone(),
        elements,
        rest,
        min_items: schema.min_items,
        max_items: schema.max_items,
    })
}
