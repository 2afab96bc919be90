//! weft_options: weft.json parsing and binder options.
//!
//! Parses weft.json project files and provides the `BinderOptions` the
//! binder and the compiler driver read.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Options that change how trees are bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BinderOptions {
    /// Reuse results for trees that were already bound.
    pub use_cache: bool,
    /// Upper bound on diagnostics returned per tree. The bind itself still
    /// runs to completion.
    pub max_diagnostics: Option<usize>,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            max_diagnostics: None,
        }
    }
}

/// The weft.json file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub binder_options: BinderOptions,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid project configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("maxDiagnostics must be greater than zero")]
    ZeroDiagnosticLimit,
}

/// Parse a weft.json file from a string.
pub fn parse_project_config(content: &str) -> Result<ProjectConfig, OptionsError> {
    let config: ProjectConfig = serde_json::from_str(content)?;
    if config.binder_options.max_diagnostics == Some(0) {
        return Err(OptionsError::ZeroDiagnosticLimit);
    }
    Ok(config)
}

/// Parse a weft.json file from a path.
pub fn load_project_config(path: impl AsRef<Path>) -> Result<ProjectConfig, OptionsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_project_config(&content)
}
