//! # Target Type Mapping
//!
//! Renders resolved types and client method signatures for a target language.

pub mod csharp;
pub mod typescript;

use crate::extractors::clients::ClientMethod;
use crate::extractors::operations::ParameterModel;
use crate::resolver::{Primitive, ResolvedType};
use serde::Serialize;

pub use csharp::CSharpMapper;
pub use typescript::TypeScriptMapper;

/// Trait for mapping resolved types to language-specific type expressions.
///
/// Implement this trait for each target language.
pub trait TypeMapper {
    /// The target language name.
    fn language(&self) -> &'static str;

    /// Map a scalar to its type name.
    fn map_primitive(&self, primitive: Primitive) -> &'static str;

    /// Render a full type expression, nullability included.
    fn map_type(&self, ty: &ResolvedType) -> String;

    /// Render the type of a property or parameter that may be omitted.
    fn map_member_type(&self, ty: &ResolvedType, optional: bool) -> String {
        if optional && !ty.nullable {
            self.map_type(&ty.clone().into_nullable())
        } else {
            self.map_type(ty)
        }
    }

    /// Default value of an omittable parameter of type `ty` rendered as `rendered`.
    ///
    /// `None` when the target marks omission on the parameter itself.
    fn optional_default(&self, _ty: &ResolvedType, _rendered: &str) -> Option<String> {
        None
    }

    /// Escape a reserved word used as an identifier.
    fn escape_identifier(&self, name: &str) -> String;

    /// The method name for an operation (`GetItem`).
    fn method_name(&self, operation: &str) -> String;

    /// Wrap a return type for an asynchronous call; `None` means no payload.
    fn async_return_type(&self, inner: Option<&str>) -> String;

    /// Render a signature as a single line.
    fn render_signature(&self, signature: &MethodSignature) -> String;
}

/// One rendered parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureParam {
    /// Escaped identifier.
    pub name: String,
    /// Rendered type.
    pub ty: String,
    /// May be omitted by the caller.
    pub optional: bool,
    /// Default value used when omitted, for targets that need one.
    pub default: Option<String>,
}

/// A client method signature in target syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    /// Method name.
    pub name: String,
    /// Parameters, required ones first.
    pub parameters: Vec<SignatureParam>,
    /// Rendered return type.
    pub return_type: String,
}

/// Builds the signature of a client method.
///
/// Required parameters come first in declaration order, followed by the request body
/// (named `body`), then the optional parameters.
pub fn client_signature(method: &ClientMethod, mapper: &dyn TypeMapper) -> MethodSignature {
    let render = |name: String, ty: &ResolvedType, optional: bool| {
        let rendered = mapper.map_member_type(ty, optional);
        let default = if optional {
            mapper.optional_default(ty, &rendered)
        } else {
            None
        };
        SignatureParam {
            name,
            ty: rendered,
            optional,
            default,
        }
    };
    let param =
        |p: &ParameterModel| render(mapper.escape_identifier(&p.name), &p.ty, !p.required);

    let mut required: Vec<SignatureParam> = Vec::new();
    let mut optional: Vec<SignatureParam> = Vec::new();
    for p in &method.parameters {
        if p.required {
            required.push(param(p));
        } else {
            optional.push(param(p));
        }
    }
    if let Some(body) = &method.request_body {
        let body_param = render("body".to_string(), &body.ty, !body.required);
        if body.required {
            required.push(body_param);
        } else {
            optional.insert(0, body_param);
        }
    }
    required.extend(optional);

    let success = method.success_type.as_ref().map(|t| mapper.map_type(t));
    MethodSignature {
        name: mapper.method_name(&method.name),
        parameters: required,
        return_type: mapper.async_return_type(success.as_deref()),
    }
}
