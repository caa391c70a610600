//! YAML manifest describing a resolver's sources
//!
//! ```yaml
//! debug: false
//! sources:
//!   - kind: env
//!   - kind: file
//!     path: .env
//!     key_file: .env.key
//!   - kind: secrets
//!     path: /run/secrets
//! ```
//!
//! Relative paths are taken relative to the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sources::SourceSpec;
use super::config::Config;
use super::error::{ConfigError, ConfigResult};

/// Source list and flags loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Sources in precedence order
    #[serde(default)]
    pub sources: Vec<SourceSpec>,

    #[serde(default)]
    pub debug: bool,
}

impl Manifest {
    /// User-level manifest (~/.config/layerconf/sources.yaml)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("layerconf").join("sources.yaml")
    }

    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Manifest(format!("Failed to parse YAML: {}", e)))
    }

    /// Load a manifest file, anchoring relative paths at its directory
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut manifest = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            manifest.anchor(base);
        }
        tracing::debug!(
            target: "layerconf",
            manifest = %path.display(),
            sources = manifest.sources.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    fn anchor(&mut self, base: &Path) {
        for spec in &mut self.sources {
            for path in [&mut spec.path, &mut spec.key_file].into_iter().flatten() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    /// Build a resolver from the listed sources
    pub fn build(&self) -> ConfigResult<Config> {
        let mut config = Config::new().with_debug(self.debug);
        for spec in &self.sources {
            let source = spec
                .build()
                .map_err(|e| ConfigError::Manifest(format!("source '{}': {}", spec, e)))?;
            config = config.source(source);
        }
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Manifest(format!("Failed to serialize YAML: {}", e)))
    }
}
