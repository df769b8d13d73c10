//! # Config Loader
//!
//! Contract descriptor loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON descriptor files
//! - Validate descriptor legality
//! - Produce a `ContractSet` for the generator
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let set = ConfigLoader::load_from_path(Path::new("contracts.toml")).unwrap();
//! println!("Contracts: {}", set.contracts.len());
//! ```

mod error;
mod parser;
mod validator;

pub use contracts::ContractSet;
pub use error::ConfigError;
pub use parser::ConfigFormat;

use std::path::Path;
use tracing::debug;

/// Descriptor loader
///
/// Provides static methods to load descriptors from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load descriptors from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ContractSet, ConfigError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let set = Self::load_from_str(&content, format)?;
        debug!(path = %path.display(), contracts = set.contracts.len(), "Descriptors loaded");
        Ok(set)
    }

    /// Load descriptors from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<ContractSet, ConfigError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize ContractSet to TOML string
    pub fn to_toml(set: &ContractSet) -> Result<String, ConfigError> {
        toml::to_string_pretty(set)
            .map_err(|e| ConfigError::parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ContractSet to JSON string
    pub fn to_json(set: &ContractSet) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(set)
            .map_err(|e| ConfigError::parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer descriptor format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::parse(format!("unsupported config format: .{ext}")))
    }

    /// Read descriptor file content
    fn read_file(path: &Path) -> Result<String, ConfigError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate descriptor content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<ContractSet, ConfigError> {
        let set = parser::parse(content, format)?;
        validator::validate(&set)?;
        Ok(set)
    }
}
