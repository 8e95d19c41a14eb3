//! Analysis configuration.
//!
//! ```toml
//! trust_field_initializers = true
//! untrusted_classes = ["com.example.Settings"]
//! implicit_write_annotations = ["javax.inject.Inject"]
//! ```
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::{DfaError, DfaResult};

/// Annotations whose fields are written reflectively by injection frameworks.
pub const DEFAULT_IMPLICIT_WRITE_ANNOTATIONS: &[&str] = &[
    "javax.inject.Inject",
    "jakarta.inject.Inject",
    "com.google.inject.Inject",
    "org.springframework.beans.factory.annotation.Autowired",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DfaConfig {
    /// When `false`, no static initializer is ever folded into a virtual field value.
    pub trust_field_initializers: bool,

    /// Classes whose static fields may be rewritten through reflection.
    pub untrusted_classes: Vec<String>,

    pub implicit_write_annotations: Vec<String>,
}

impl Default for DfaConfig {
    fn default() -> Self {
        Self {
            trust_field_initializers: true,
            untrusted_classes: Vec::new(),
            implicit_write_annotations: DEFAULT_IMPLICIT_WRITE_ANNOTATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DfaConfig {
    /// Parse a configuration from TOML text. `origin` only names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> DfaResult<Self> {
        let config: DfaConfig =
            toml::from_str(text).map_err(|source| DfaError::ConfigParseError {
                source,
                file: origin.to_string(),
            })?;
        config.validate()?;
        debug!(
            "Loaded analysis configuration from {} ({} untrusted classes, {} implicit-write annotations)",
            origin,
            config.untrusted_classes.len(),
            config.implicit_write_annotations.len()
        );
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> DfaResult<Self> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| DfaError::IoError {
            source,
            file: file.clone(),
        })?;
        Self::from_toml_str(&text, &file)
    }

    fn validate(&self) -> DfaResult<()> {
        let invalid = self
            .untrusted_classes
            .iter()
            .chain(self.implicit_write_annotations.iter())
            .find(|name| !is_qualified_name(name));
        match invalid {
            Some(name) => Err(DfaError::InvalidClassName(name.clone())),
            None => Ok(()),
        }
    }
}

/// `a.b.C`, `C` or `a.b.C$Inner`; every segment a non-empty identifier.
fn is_qualified_name(name: &str) -> bool {
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    })
}
