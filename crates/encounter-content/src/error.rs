//! Catalog loading errors.

use encounter_core::error::PipelineError;
use thiserror::Error;

/// Errors raised while loading static configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid YAML for the catalog schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but is inconsistent.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

impl From<CatalogError> for PipelineError {
    fn from(err: CatalogError) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}
