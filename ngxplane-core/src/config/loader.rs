//! Options loader

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use std::path::Path;

/// Loader for parse options files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load options from a `.toml` or `.json` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ParseOptions> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read options file: {}", e)))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        tracing::debug!("Loading parse options from {}", path.display());

        match ext {
            "json" => Self::from_json(&content),
            "toml" | "" => Self::from_toml(&content),
            _ => Err(Error::Config(format!("Unknown options format: {}", ext))),
        }
    }

    /// Parse JSON options
    pub fn from_json(content: &str) -> Result<ParseOptions> {
        serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid JSON: {}", e)))
    }

    /// Parse TOML options
    pub fn from_toml(content: &str) -> Result<ParseOptions> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }
}
