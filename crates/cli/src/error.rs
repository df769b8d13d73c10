//! Error types for CLI operations.

use std::path::Path;

use codegen::GenerationError;
use config_loader::ConfigError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Descriptor file not found
    #[error("Contract descriptor file not found: {path}")]
    ContractsNotFound { path: String },

    /// Descriptor loading (parse or validation) error
    #[error("Failed to load contracts from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: ConfigError,
    },

    /// Requested contract is not declared in the descriptor file
    #[error("Contract '{name}' is not declared")]
    UnknownContract { name: String },

    /// Adapter generation error
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl CliError {
    pub fn contracts_not_found(path: &Path) -> Self {
        Self::ContractsNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn load(path: &Path, source: ConfigError) -> Self {
        Self::Load {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn unknown_contract(name: impl Into<String>) -> Self {
        Self::UnknownContract { name: name.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
