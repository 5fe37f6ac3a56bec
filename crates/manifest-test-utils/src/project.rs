//! [`TestProject`] builder for multi-module manifest scenarios.

use crate::merge;
use manifest_core::{
    ManifestEntry, MergedManifestSnapshot, ModuleEntry, ModuleGraph, ModuleId, ProjectGraph,
    SnapshotReport,
};
use manifest_fs::NormalizedPath;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Name of the graph file written by [`TestProject::write_graph`].
pub const GRAPH_FILE: &str = "project.json";

/// Where [`TestProject::merge_module`] writes a module's merged manifest.
pub const MERGED_MANIFEST: &str = "build/merged/AndroidManifest.xml";

/// A temporary project directory.
///
/// # Example
///
/// ```rust,no_run
/// use manifest_test_utils::project::TestProject;
///
/// let mut project = TestProject::new();
/// project.add_module("app", &["lib"]);
/// project.add_module("lib", &[]);
/// project.write_manifest("app", "main", "<manifest/>");
/// let graph = project.write_graph();
/// ```
pub struct TestProject {
    temp_dir: TempDir,
    graph: ProjectGraph,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            graph: ProjectGraph::default(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute, normalized path of `relative`.
    pub fn path(&self, relative: &str) -> NormalizedPath {
        NormalizedPath::new(self.root()).join(relative)
    }

    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    /// Register a module rooted at `<root>/<id>`.
    pub fn add_module(&mut self, id: &str, dependencies: &[&str]) {
        self.graph.modules.push(ModuleEntry {
            id: ModuleId::new(id),
            name: None,
            root: self.path(id),
            manifests: Vec::new(),
            dependencies: dependencies.iter().map(|&d| ModuleId::new(d)).collect(),
            report: None,
        });
    }

    fn module_mut(&mut self, id: &str) -> &mut ModuleEntry {
        let id = ModuleId::new(id);
        self.graph
            .modules
            .iter_mut()
            .find(|module| module.id == id)
            .unwrap_or_else(|| panic!("TestProject: unknown module {id}"))
    }

    /// Write `<module>/src/<source_set>/AndroidManifest.xml`. The first
    /// manifest written for a module becomes its primary manifest.
    pub fn write_manifest(
        &mut self,
        module: &str,
        source_set: &str,
        content: &str,
    ) -> NormalizedPath {
        let path = self.path(&format!("{module}/src/{source_set}/AndroidManifest.xml"));
        self.write(&path, content);
        self.module_mut(module).manifests.push(ManifestEntry {
            path: path.clone(),
            source_set: Some(source_set.to_string()),
        });
        path
    }

    /// Write a file that belongs to no source set, such as a library's
    /// extracted manifest.
    pub fn write_file(&self, relative: &str, content: &str) -> NormalizedPath {
        let path = self.path(relative);
        self.write(&path, content);
        path
    }

    /// Write `<module>/build/merge-report.json` and register it.
    pub fn write_report(&mut self, module: &str, report: &SnapshotReport) -> NormalizedPath {
        let path = self.path(&format!("{module}/build/merge-report.json"));
        self.write(&path, &serde_json::to_string_pretty(report).unwrap());
        self.module_mut(module).report = Some(path.clone());
        path
    }

    /// Path of `module`'s merged manifest output.
    pub fn merged_manifest(&self, module: &str) -> NormalizedPath {
        self.path(&format!("{module}/{MERGED_MANIFEST}"))
    }

    /// Merge `module`'s primary manifest with the merged outputs of its
    /// dependencies, then write the merged manifest and the report.
    ///
    /// Dependencies must be merged first.
    pub fn merge_module(&mut self, module: &str) -> MergedManifestSnapshot {
        let id = ModuleId::new(module);
        let primary = self.graph.primary_manifest(&id).unwrap();
        let primary_text = self.read(&primary);
        let dependencies = self.graph.module(&id).unwrap().dependencies.clone();
        let inputs: Vec<(NormalizedPath, String)> = dependencies
            .iter()
            .map(|dep| {
                let path = self.merged_manifest(dep.as_str());
                let text = self.read(&path);
                (path, text)
            })
            .collect();
        let libraries: Vec<(&NormalizedPath, &str)> =
            inputs.iter().map(|(path, text)| (path, text.as_str())).collect();

        // Report source manifests, not merge inputs
        let mut files: Vec<NormalizedPath> = self
            .graph
            .module(&id)
            .unwrap()
            .manifests
            .iter()
            .map(|m| m.path.clone())
            .collect();
        files.extend(self.graph.dependency_manifests(&id));
        let snapshot = merge::merge((&primary, &primary_text), &libraries)
            .unwrap()
            .with_manifest_files(files);
        let output = self.merged_manifest(module);
        self.write(&output, snapshot.document().source());
        self.write_report(module, &snapshot.to_report());
        snapshot
    }

    /// Serialize the module graph to [`GRAPH_FILE`] with paths relative to
    /// the project root.
    pub fn write_graph(&self) -> NormalizedPath {
        let root = NormalizedPath::new(self.root());
        let relative = |path: &NormalizedPath| {
            NormalizedPath::new(
                path.as_str()
                    .strip_prefix(root.as_str())
                    .map_or(path.as_str(), |rest| rest.trim_start_matches('/')),
            )
        };
        let mut graph = self.graph.clone();
        for module in &mut graph.modules {
            module.root = relative(&module.root);
            for manifest in &mut module.manifests {
                manifest.path = relative(&manifest.path);
            }
            if let Some(report) = module.report.as_mut() {
                *report = relative(report);
            }
        }
        let path = self.path(GRAPH_FILE);
        self.write(&path, &serde_json::to_string_pretty(&graph).unwrap());
        path
    }

    pub fn read(&self, path: &NormalizedPath) -> String {
        fs::read_to_string(path.to_native())
            .unwrap_or_else(|_| panic!("Could not read file: {path}"))
    }

    fn write(&self, path: &NormalizedPath, content: &str) {
        let native = path.to_native();
        if let Some(parent) = native.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&native, content).unwrap();
    }

    /// Assert that the file at `path` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &NormalizedPath, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }

    /// Assert that the file at `path` does **not** contain `content`.
    pub fn assert_file_not_contains(&self, path: &NormalizedPath, content: &str) {
        let file_content = self.read(path);
        assert!(
            !file_content.contains(content),
            "File {} unexpectedly contains {}.\nActual: {}",
            path,
            content,
            file_content
        );
    }
}
