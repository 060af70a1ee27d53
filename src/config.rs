//! Report configuration
//!
//! Looked up in this order:
//! 1. an explicit `--config <file>`
//! 2. `~/.config/tiptrie/config.json` if it exists
//! 3. built-in defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables shared by ingestion and rendering
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// How many trailing characters of a hash to show
    pub short_hash_len: usize,
    /// Number of white-to-blue shades used to grade blocks by annotation count
    pub color_steps: usize,
    /// Stop reading a log file after this many entries
    pub max_entries: usize,
    /// Characters trimmed from the end of a snapshot label
    /// (pod names carry a generated suffix)
    pub label_suffix_trim: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            short_hash_len: 8,
            color_steps: 200,
            max_entries: 1000,
            label_suffix_trim: 0,
        }
    }
}

impl ReportConfig {
    /// Default location (~/.config/tiptrie/config.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tiptrie").join("config.json"))
    }

    /// Load from a file; fields missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: ReportConfig = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the explicit file if given, else the default file if present
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.color_steps == 0 {
            return Err(Error::Config("color_steps must be at least 1".into()));
        }
        Ok(())
    }
}
