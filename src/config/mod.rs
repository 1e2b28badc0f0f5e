//! Configuration schema definitions and loading.
//!
//! Defines the complete configuration structure for Attune: server
//! connection, capture parameters and adaptation tuning. All sections
//! have sensible defaults so an absent or empty file still runs.

mod adaptation;
mod capture;
mod server;

#[cfg(test)]
mod tests;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use adaptation::AdaptationConfig;
pub use capture::CaptureConfig;
pub use server::ServerConfig;

use crate::core::{AttuneError, Result};

/// Main configuration structure for Attune.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttuneConfig {
    /// Music server connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Camera and microphone capture settings.
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Attention adaptation settings.
    #[serde(default)]
    pub adaptation: AdaptationConfig,
}

impl AttuneConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or fails to parse.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| AttuneError::toml_parse(e, Some(path)))
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if the string fails to parse.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| AttuneError::toml_parse(e, None))
    }
}
