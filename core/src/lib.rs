#![deny(missing_docs)]

//! # API Generator Core
//!
//! Core library of an OpenAPI-driven code generator: reads a document, decides the target
//! type of every schema position and extracts the models that handlers, records, clients
//! and polymorphic hierarchies are emitted from.

/// Shared error types.
pub mod error;

/// Generator configuration.
pub mod config;

/// Identifier derivation and escaping.
pub mod naming;

/// OpenAPI (OAS) document shims.
pub mod oas;

/// Schema-to-type resolution.
pub mod resolver;

/// `allOf` / `oneOf` / `anyOf` and discriminator handling.
pub mod composition;

/// Operation-level `x-` extensions and security.
pub mod extensions;

/// Model extractors.
pub mod extractors;

/// Target language type rendering.
pub mod mapping;

/// Whole-document extraction.
pub mod generator;

pub use composition::{classify, ComponentKind};
pub use config::{GeneratorConfig, TargetLanguage};
pub use error::{AppError, AppResult};
pub use extensions::OperationPolicies;
pub use generator::{extract_api, extract_document, ApiModel};
pub use mapping::{client_signature, MethodSignature, TypeMapper};
pub use oas::{OpenApiDocument, Schema, SpecVersion};
pub use resolver::{Primitive, ResolvedType, TypeRef, TypeResolver};
