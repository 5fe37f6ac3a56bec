//! Layered provenance configuration
//!
//! [`ConfigResolver`] merges configuration from a fixed hierarchy; later
//! layers override earlier ones field by field:
//!
//! 1. Built-in defaults
//! 2. Global config (`<config_dir>/manifest-provenance/config.toml`)
//! 3. Project config (`<project>/.manifest-provenance.toml`)

use crate::Result;
use manifest_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the per-project configuration layer.
pub const PROJECT_CONFIG_FILE: &str = ".manifest-provenance.toml";

/// Effective settings used by the read and write paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceConfig {
    /// Path fragment that marks a manifest as coming from a library.
    pub library_marker: String,

    /// Hard cap on module hops while resolving a record's location.
    /// Defaults to the number of modules in the graph.
    pub max_resolution_depth: Option<usize>,

    /// Number of distinct display slots before they repeat.
    pub palette_size: usize,

    /// Step between consecutive files' slots.
    pub palette_stride: usize,

    /// Text shown for values the build system injected.
    pub injected_label: String,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            library_marker: "exploded-aar".to_string(),
            max_resolution_depth: None,
            palette_size: 10,
            palette_stride: 3,
            injected_label: "Value provided by Gradle".to_string(),
        }
    }
}

impl ProvenanceConfig {
    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(marker) = layer.library_marker {
            self.library_marker = marker;
        }
        if layer.max_resolution_depth.is_some() {
            self.max_resolution_depth = layer.max_resolution_depth;
        }
        if let Some(size) = layer.palette_size {
            self.palette_size = size;
        }
        if let Some(stride) = layer.palette_stride {
            self.palette_stride = stride;
        }
        if let Some(label) = layer.injected_label {
            self.injected_label = label;
        }
    }
}

/// One config file; every field is optional so a layer only overrides what
/// it names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    library_marker: Option<String>,
    max_resolution_depth: Option<usize>,
    palette_size: Option<usize>,
    palette_stride: Option<usize>,
    injected_label: Option<String>,
}

/// Resolves [`ProvenanceConfig`] for a project directory.
pub struct ConfigResolver {
    root: NormalizedPath,

    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(root: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            root,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("manifest-provenance"))
    }

    /// Merge every layer that exists. Missing files are skipped; a file that
    /// fails to parse is an error.
    pub fn resolve(&self) -> Result<ProvenanceConfig> {
        let store = ConfigStore::new();
        let mut config = ProvenanceConfig::default();

        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = NormalizedPath::new(global_dir.join("config.toml"));
            if global_config_path.to_native().is_file() {
                tracing::debug!(path = %global_config_path, "Loading global config");
                config.merge(store.load(&global_config_path)?);
            } else {
                tracing::debug!(path = %global_config_path, "No global config found, skipping");
            }
        }

        let project_config_path = self.root.join(PROJECT_CONFIG_FILE);
        if project_config_path.to_native().is_file() {
            tracing::debug!(path = %project_config_path, "Loading project config");
            config.merge(store.load(&project_config_path)?);
        }

        Ok(config)
    }
}
