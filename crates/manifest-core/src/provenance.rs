//! Which files contributed to a merged manifest, in display order
//!
//! The currently edited manifest always comes first. It is followed by the
//! files that at least one attribute's history resolves to, then by files
//! that took part in the merge without contributing anything. Within each
//! group, project files sort before library files, then by path.

use crate::actions::ActionType;
use crate::config::ProvenanceConfig;
use crate::graph::{ModuleGraph, ModuleId};
use crate::location::SourceFilePosition;
use crate::resolver::ActionLocationResolver;
use crate::snapshot::MergedManifestSnapshot;
use manifest_fs::NormalizedPath;
use manifest_xml::NodeRef;
use serde::Serialize;
use std::collections::HashSet;

/// Display-oriented view of one contributing file. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestFileWithMetadata {
    pub file: NormalizedPath,
    pub label: String,
    pub is_current: bool,
    pub is_project_file: bool,
    pub sort_key: String,
    /// Position in [`ProvenanceIndex::files`].
    pub slot: Option<usize>,
    /// Palette entry for the slot; the current file has none.
    pub palette_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ProvenanceIndex {
    files: Vec<NormalizedPath>,
    referenced: usize,
    others: usize,
    library_marker: String,
    palette_size: usize,
    palette_stride: usize,
}

impl ProvenanceIndex {
    pub fn build(
        snapshot: &MergedManifestSnapshot,
        current: &NormalizedPath,
        resolver: &ActionLocationResolver<'_>,
        module: &ModuleId,
        config: &ProvenanceConfig,
    ) -> Self {
        let document = snapshot.document();
        let mut contributing = HashSet::new();
        for element in document.elements() {
            for attribute in document.attribute_ids(element) {
                for record in snapshot.records_for(NodeRef::Attribute(attribute)) {
                    if record.action_type == ActionType::Injected {
                        continue;
                    }
                    if let Some(file) = resolver.resolve(record, module).file {
                        contributing.insert(file);
                    }
                }
            }
        }

        let marker = config.library_marker.as_str();
        let mut referenced = Vec::new();
        let mut others = Vec::new();
        for file in snapshot.manifest_files() {
            if file == current || referenced.contains(file) || others.contains(file) {
                continue;
            }
            if contributing.contains(file) {
                referenced.push(file.clone());
            } else {
                others.push(file.clone());
            }
        }
        referenced.sort_by_key(|file| sort_key(file, marker));
        others.sort_by_key(|file| sort_key(file, marker));
        tracing::debug!(
            referenced = referenced.len(),
            others = others.len(),
            "indexed contributing manifests"
        );

        let mut files = Vec::with_capacity(1 + referenced.len() + others.len());
        files.push(current.clone());
        let (referenced_count, others_count) = (referenced.len(), others.len());
        files.extend(referenced);
        files.extend(others);
        Self {
            files,
            referenced: referenced_count,
            others: others_count,
            library_marker: config.library_marker.clone(),
            palette_size: config.palette_size,
            palette_stride: config.palette_stride,
        }
    }

    /// Every known file in slot order, including files interned later.
    pub fn files(&self) -> &[NormalizedPath] {
        &self.files
    }

    pub fn current(&self) -> &NormalizedPath {
        &self.files[0]
    }

    /// Files some attribute's history points to.
    pub fn referenced(&self) -> &[NormalizedPath] {
        &self.files[1..1 + self.referenced]
    }

    /// Files that were merged but contributed nothing.
    pub fn others(&self) -> &[NormalizedPath] {
        let start = 1 + self.referenced;
        &self.files[start..start + self.others]
    }

    pub fn slot_of(&self, file: &NormalizedPath) -> Option<usize> {
        self.files.iter().position(|known| known == file)
    }

    /// Slot of `file`, appending it when first seen so existing slots
    /// never move.
    pub fn intern(&mut self, file: &NormalizedPath) -> usize {
        if let Some(slot) = self.slot_of(file) {
            return slot;
        }
        self.files.push(file.clone());
        self.files.len() - 1
    }

    /// Palette entry for a slot. Slot 0 is the current file and has none.
    pub fn palette_index(&self, slot: usize) -> Option<usize> {
        if slot == 0 || self.palette_size == 0 {
            return None;
        }
        Some((slot - 1) * self.palette_stride % self.palette_size)
    }

    /// Slot of the file that `node`'s first record resolves to.
    pub fn slot_for_node(
        &mut self,
        snapshot: &MergedManifestSnapshot,
        node: NodeRef,
        resolver: &ActionLocationResolver<'_>,
        module: &ModuleId,
    ) -> Option<usize> {
        let record = snapshot.records_for(node).into_iter().next()?;
        let file = resolver.resolve(record, module).file?;
        Some(self.intern(&file))
    }

    pub fn is_project_file(&self, file: &NormalizedPath) -> bool {
        !file.contains(&self.library_marker)
    }

    pub fn describe(
        &self,
        file: &NormalizedPath,
        graph: &dyn ModuleGraph,
    ) -> ManifestFileWithMetadata {
        let slot = self.slot_of(file);
        ManifestFileWithMetadata {
            file: file.clone(),
            label: label_for(&SourceFilePosition::file_only(file.clone()), graph),
            is_current: slot == Some(0),
            is_project_file: self.is_project_file(file),
            sort_key: sort_key(file, &self.library_marker),
            slot,
            palette_index: slot.and_then(|slot| self.palette_index(slot)),
        }
    }
}

fn sort_key(file: &NormalizedPath, library_marker: &str) -> String {
    let group = if file.contains(library_marker) { '1' } else { '0' };
    format!("{group}{file}")
}

/// Human label for a location: the owning module's name (only in
/// multi-module projects) followed by the source set, e.g. `app main`.
/// Falls back to the file name plus position.
pub fn label_for(location: &SourceFilePosition, graph: &dyn ModuleGraph) -> String {
    let Some(file) = &location.file else {
        return location.to_string();
    };
    let module = (graph.module_count() >= 2)
        .then(|| graph.owning_module(file))
        .flatten()
        .and_then(|module| graph.module_name(&module));
    let provider = graph.source_provider_label(file);

    match (module, provider) {
        (Some(module), Some(provider)) => format!("{module} {provider}"),
        (Some(label), None) | (None, Some(label)) => label,
        (None, None) => {
            let name = file.file_name().unwrap_or(file.as_str());
            match location.position {
                Some(position) => format!("{name}:{position}"),
                None => name.to_string(),
            }
        }
    }
}
