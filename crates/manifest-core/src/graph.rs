//! Module graph and per-module snapshots
//!
//! The resolver only needs two lookups from the build: which module owns a
//! file, and that module's own merge result. [`ModuleGraph`] and
//! [`SnapshotSupplier`] are those seams; [`ProjectGraph`] and
//! [`SnapshotCache`] implement them from a project description file.

use crate::snapshot::MergedManifestSnapshot;
use crate::{Error, Result};
use manifest_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Identifier of a build module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Read-only view of the build's module structure.
pub trait ModuleGraph {
    /// The module whose sources or build outputs contain `file`.
    fn owning_module(&self, file: &NormalizedPath) -> Option<ModuleId>;

    /// Manifests of every module `module` depends on.
    fn dependency_manifests(&self, module: &ModuleId) -> Vec<NormalizedPath>;

    fn module_count(&self) -> usize;

    /// Display name of a module.
    fn module_name(&self, module: &ModuleId) -> Option<String>;

    /// Name of the source set (`main`, `debug`, a flavor) that contributes
    /// `file`, for display only.
    fn source_provider_label(&self, file: &NormalizedPath) -> Option<String>;
}

/// Gives access to a module's own merge result.
pub trait SnapshotSupplier {
    fn snapshot(&self, module: &ModuleId) -> Option<Arc<MergedManifestSnapshot>>;
}

/// One manifest a module contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: NormalizedPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_set: Option<String>,
}

/// One module in a [`ProjectGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub id: ModuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub root: NormalizedPath,
    /// The first manifest is the module's primary (editable) manifest.
    #[serde(default)]
    pub manifests: Vec<ManifestEntry>,
    #[serde(default)]
    pub dependencies: Vec<ModuleId>,
    /// The module's merge report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<NormalizedPath>,
}

/// A module graph described in a JSON, TOML or YAML file.
///
/// Relative paths in the file are taken relative to the file's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectGraph {
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

impl ProjectGraph {
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let mut graph: Self = ConfigStore::new().load(path)?;
        if let Some(base) = path.parent() {
            graph.rebase(&base);
        }
        tracing::debug!(path = %path, modules = graph.modules.len(), "loaded project graph");
        Ok(graph)
    }

    /// Make every relative path absolute against `base`.
    pub fn rebase(&mut self, base: &NormalizedPath) {
        let anchor = |path: &mut NormalizedPath| {
            if !is_absolute(path) {
                *path = base.join(path.as_str());
            }
        };
        for module in &mut self.modules {
            anchor(&mut module.root);
            module.manifests.iter_mut().for_each(|m| anchor(&mut m.path));
            if let Some(report) = module.report.as_mut() {
                anchor(report);
            }
        }
    }

    pub fn module(&self, id: &ModuleId) -> Option<&ModuleEntry> {
        self.modules.iter().find(|module| &module.id == id)
    }

    /// The manifest edits for `module` are written to.
    pub fn primary_manifest(&self, id: &ModuleId) -> Result<NormalizedPath> {
        self.module(id)
            .and_then(|module| module.manifests.first())
            .map(|manifest| manifest.path.clone())
            .ok_or_else(|| Error::UnknownModule {
                module: id.to_string(),
            })
    }

    /// Load every module's merge report.
    pub fn load_snapshots(&self) -> Result<SnapshotCache> {
        let mut cache = SnapshotCache::default();
        for module in &self.modules {
            if let Some(report) = &module.report {
                cache.insert(module.id.clone(), MergedManifestSnapshot::load(report)?);
            }
        }
        Ok(cache)
    }
}

fn is_absolute(path: &NormalizedPath) -> bool {
    path.as_str().starts_with('/') || path.to_native().is_absolute()
}

impl ModuleGraph for ProjectGraph {
    fn owning_module(&self, file: &NormalizedPath) -> Option<ModuleId> {
        if let Some(module) = self
            .modules
            .iter()
            .find(|module| module.manifests.iter().any(|m| &m.path == file))
        {
            return Some(module.id.clone());
        }
        // Innermost root wins for nested modules
        self.modules
            .iter()
            .filter(|module| file.is_within(&module.root))
            .max_by_key(|module| module.root.as_str().len())
            .map(|module| module.id.clone())
    }

    fn dependency_manifests(&self, id: &ModuleId) -> Vec<NormalizedPath> {
        let mut seen = BTreeSet::from([id.clone()]);
        let mut pending: Vec<ModuleId> = self
            .module(id)
            .map(|module| module.dependencies.clone())
            .unwrap_or_default();
        let mut manifests = Vec::new();
        while let Some(next) = pending.pop() {
            if !seen.insert(next.clone()) {
                continue;
            }
            if let Some(module) = self.module(&next) {
                manifests.extend(module.manifests.iter().map(|m| m.path.clone()));
                pending.extend(module.dependencies.iter().cloned());
            }
        }
        manifests
    }

    fn module_count(&self) -> usize {
        self.modules.len()
    }

    fn module_name(&self, id: &ModuleId) -> Option<String> {
        self.module(id)
            .map(|module| module.name.clone().unwrap_or_else(|| module.id.to_string()))
    }

    fn source_provider_label(&self, file: &NormalizedPath) -> Option<String> {
        self.modules
            .iter()
            .flat_map(|module| module.manifests.iter())
            .find(|manifest| &manifest.path == file)
            .and_then(|manifest| manifest.source_set.clone())
    }
}

/// In-memory [`SnapshotSupplier`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    snapshots: HashMap<ModuleId, Arc<MergedManifestSnapshot>>,
}

impl SnapshotCache {
    pub fn insert(&mut self, module: ModuleId, snapshot: MergedManifestSnapshot) {
        self.snapshots.insert(module, Arc::new(snapshot));
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotSupplier for SnapshotCache {
    fn snapshot(&self, module: &ModuleId) -> Option<Arc<MergedManifestSnapshot>> {
        self.snapshots.get(module).cloned()
    }
}
