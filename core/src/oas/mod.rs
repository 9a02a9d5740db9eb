#![deny(missing_docs)]

//! # OpenAPI Parsing Module
//!
//! - **document**: Parsing entry point and local component lookup.
//! - **schema**: The Schema Object shim (3.0 and 3.1 shapes).
//! - **shims**: Paths, operations, parameters, responses and components.
//! - **normalization**: Boolean schema rewriting before deserialization.
//! - **ref_utils**: `$ref` pointer decoding.

pub mod document;
pub(crate) mod normalization;
pub mod ref_utils;
pub mod schema;
pub mod shims;

pub use document::{OpenApiDocument, OperationEntry, SpecVersion};
pub use schema::{BoolOrSchema, Discriminator, ExclusiveBound, Schema, SchemaTypeSet};
