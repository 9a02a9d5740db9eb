//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The document (or configuration) could not be deserialized.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// The document declares a version this crate does not read.
    #[from(ignore)]
    #[display("Unsupported OpenAPI version: {_0}")]
    UnsupportedVersion(String),

    /// A `$ref` that does not point at an existing local component.
    #[from(ignore)]
    #[display("Unresolved reference: {_0}")]
    UnresolvedReference(String),

    /// An `allOf` inheritance chain that loops back onto itself.
    #[from(ignore)]
    #[display("Circular reference: {_0}")]
    CircularReference(String),

    /// An `x-` extension whose value has the wrong shape.
    #[from(ignore)]
    #[display("Invalid extension '{key}': {message}")]
    InvalidExtension {
        /// Extension key (e.g. `x-retry`).
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// Two operations map to the same generated operation name.
    #[from(ignore)]
    #[display("Duplicate operation name: {_0}")]
    DuplicateOperation(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Builds an [`AppError::InvalidExtension`].
    pub fn invalid_extension(key: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidExtension {
            key: key.into(),
            message: message.into(),
        }
    }
}
