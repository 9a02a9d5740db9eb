#![deny(missing_docs)]

//! # Generator Configuration
//!
//! Options controlling how schemas are resolved and how types are rendered. Loaded from
//! YAML or JSON; every field has a default so an empty document is a valid config.

use crate::error::{AppError, AppResult};
use crate::mapping::csharp::CSharpMapper;
use crate::mapping::typescript::TypeScriptMapper;
use crate::mapping::TypeMapper;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The language generated code targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    /// C# server handlers, models and clients.
    #[default]
    CSharp,
    /// TypeScript clients.
    TypeScript,
}

/// Options for model extraction and type mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct GeneratorConfig {
    /// Target language.
    pub target: TargetLanguage,
    /// Namespace (C#) or module prefix for generated types.
    pub namespace: String,
    /// Render reference types with `?` when nullable (C# nullable reference types).
    pub nullable_reference_types: bool,
    /// Treat optional properties and parameters as nullable.
    pub optional_as_nullable: bool,
    /// Group name for operations without tags.
    pub default_group: String,
    /// Give inline objects, enums and unions generated names.
    pub synthesize_inline_types: bool,
    /// Render `uniqueItems: true` arrays as sets.
    pub unique_items_as_set: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target: TargetLanguage::CSharp,
            namespace: "Generated".to_string(),
            nullable_reference_types: true,
            optional_as_nullable: true,
            default_group: "Default".to_string(),
            synthesize_inline_types: true,
            unique_items_as_set: true,
        }
    }
}

impl GeneratorConfig {
    /// Parses a config from YAML (or JSON) text.
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Parse(format!("Invalid generator config: {}", e)))
    }

    /// Reads and parses a config file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// A type mapper for the configured target.
    ///
    /// `enum_names` are the generated enum types; C# renders them as value types.
    pub fn mapper<I, S>(&self, enum_names: I) -> Box<dyn TypeMapper>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.target {
            TargetLanguage::CSharp => {
                Box::new(CSharpMapper::new(self).with_value_types(enum_names))
            }
            TargetLanguage::TypeScript => Box::new(TypeScriptMapper),
        }
    }
}
