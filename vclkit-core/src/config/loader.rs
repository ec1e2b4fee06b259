//! Configuration loader

use crate::config::StyleConfig;
use crate::error::{Error, Result};
use std::path::Path;

/// Style configuration loader for TOML and JSON files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load style configuration from a file, choosing the format by
    /// extension. Files without an extension are read as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<StyleConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        tracing::debug!(path = %path.display(), format = ext, "loading style configuration");

        match ext {
            "json" => StyleConfig::from_json_str(&content),
            "toml" | "" => StyleConfig::from_toml_str(&content),
            _ => Err(Error::Config(format!("Unknown config format: {}", ext))),
        }
    }
}
