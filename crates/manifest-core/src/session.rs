//! Queries and edits against one module's merged manifest
//!
//! A [`Session`] ties a snapshot to the module it was merged for, that
//! module's primary manifest, and the collaborators needed to resolve
//! locations. Read operations never touch the disk; edit operations write
//! the primary manifest and leave the snapshot stale.

use crate::actions::ActionType;
use crate::config::ProvenanceConfig;
use crate::graph::{ModuleGraph, ModuleId, SnapshotSupplier};
use crate::location::SourceFilePosition;
use crate::provenance::{self, ProvenanceIndex};
use crate::removal::{self, RemovalPlan};
use crate::resolver::ActionLocationResolver;
use crate::snapshot::{LoggingRecord, MergedManifestSnapshot, Severity};
use crate::suggestion::{self, Suggestion, USES_SDK};
use crate::tools::{self, ToolsEdit};
use crate::{Error, Result};
use manifest_fs::NormalizedPath;
use manifest_xml::NodeRef;
use serde::Serialize;
use std::sync::Arc;

/// One line of a node's merge history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainEntry {
    pub action_type: ActionType,
    pub location: SourceFilePosition,
    pub reason: Option<String>,
}

/// A node's merge history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub entries: Vec<ExplainEntry>,
    /// The merge reported errors, so the history may be incomplete.
    pub merge_failed: bool,
}

/// A requested change to the primary manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    Remove,
    AddOverride { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub file: NormalizedPath,
    /// How a removal was carried out.
    pub plan: Option<RemovalPlan>,
    pub edit: ToolsEdit,
    /// The file on disk changed.
    pub written: bool,
}

pub struct Session<'a> {
    snapshot: Arc<MergedManifestSnapshot>,
    module: ModuleId,
    primary: NormalizedPath,
    graph: &'a dyn ModuleGraph,
    snapshots: &'a dyn SnapshotSupplier,
    config: ProvenanceConfig,
}

impl<'a> Session<'a> {
    pub fn new(
        snapshot: Arc<MergedManifestSnapshot>,
        module: ModuleId,
        primary: NormalizedPath,
        graph: &'a dyn ModuleGraph,
        snapshots: &'a dyn SnapshotSupplier,
    ) -> Self {
        Self {
            snapshot,
            module,
            primary,
            graph,
            snapshots,
            config: ProvenanceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProvenanceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn snapshot(&self) -> &MergedManifestSnapshot {
        &self.snapshot
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn primary_manifest(&self) -> &NormalizedPath {
        &self.primary
    }

    pub fn config(&self) -> &ProvenanceConfig {
        &self.config
    }

    pub fn resolver(&self) -> ActionLocationResolver<'a> {
        ActionLocationResolver::new(self.graph, self.snapshots)
            .with_max_depth(self.config.max_resolution_depth)
    }

    /// True origin of every record of `node`, oldest first.
    pub fn resolved_locations(&self, node: NodeRef) -> Vec<SourceFilePosition> {
        let resolver = self.resolver();
        self.snapshot
            .records_for(node)
            .into_iter()
            .map(|record| resolver.resolve(record, &self.module))
            .collect()
    }

    /// Why `node` is in the merged manifest.
    ///
    /// Consecutive records that resolve to the same location are shown
    /// once, and a run of injected values becomes a single entry.
    pub fn explain(&self, node: NodeRef) -> Explanation {
        let resolver = self.resolver();
        let mut entries: Vec<ExplainEntry> = Vec::new();
        let mut previous: Option<SourceFilePosition> = None;

        for record in self.snapshot.records_for(node) {
            let location = resolver.resolve(record, &self.module);
            if previous.as_ref() == Some(&location) {
                continue;
            }
            previous = Some(location.clone());

            if record.action_type == ActionType::Injected {
                if entries
                    .last()
                    .is_some_and(|entry| entry.action_type == ActionType::Injected)
                {
                    continue;
                }
                entries.push(ExplainEntry {
                    action_type: ActionType::Injected,
                    location,
                    reason: Some(self.config.injected_label.clone()),
                });
                continue;
            }

            entries.push(ExplainEntry {
                action_type: record.action_type,
                location,
                reason: record.reason.clone(),
            });
        }

        Explanation {
            entries,
            merge_failed: !self.merge_errors().is_empty(),
        }
    }

    pub fn can_remove(&self, node: NodeRef) -> bool {
        removal::can_remove(&self.resolved_locations(node), &self.primary)
    }

    /// Where `node` was declared: the first resolved location with a known
    /// file.
    pub fn declaration(&self, node: NodeRef) -> Option<SourceFilePosition> {
        let resolver = self.resolver();
        self.snapshot
            .records_for(node)
            .into_iter()
            .map(|record| resolver.resolve(record, &self.module))
            .find(|location| location.file.is_some())
    }

    pub fn provenance_index(&self) -> ProvenanceIndex {
        ProvenanceIndex::build(
            &self.snapshot,
            &self.primary,
            &self.resolver(),
            &self.module,
            &self.config,
        )
    }

    /// Display label for a location.
    pub fn label(&self, location: &SourceFilePosition) -> String {
        provenance::label_for(location, self.graph)
    }

    pub fn merge_errors(&self) -> Vec<&LoggingRecord> {
        self.snapshot
            .logging_records()
            .iter()
            .filter(|record| record.severity == Severity::Error)
            .collect()
    }

    /// Suggestions carried by the merge errors.
    pub fn suggestions(&self) -> Vec<(Suggestion, &LoggingRecord)> {
        self.merge_errors()
            .into_iter()
            .filter_map(|record| suggestion::parse(&record.message).map(|s| (s, record)))
            .collect()
    }

    /// Write `operation` for `node` into the primary manifest.
    pub fn edit(&self, node: NodeRef, operation: EditOperation) -> Result<EditOutcome> {
        let document = self.snapshot.document();
        let (plan, target, name, value) = match operation {
            EditOperation::Remove => {
                let plan = removal::plan_removal(document, node);
                match plan {
                    RemovalPlan::RemoveElement(id) => {
                        (Some(plan), id, tools::NODE.to_string(), tools::NODE_REMOVE.to_string())
                    }
                    RemovalPlan::RemoveAttribute(id) => (
                        Some(plan),
                        id.element,
                        tools::REMOVE.to_string(),
                        document.attribute(id).name().to_string(),
                    ),
                }
            }
            EditOperation::AddOverride { name, value } => (None, node.owner(), name, value),
        };

        tracing::debug!(
            file = %self.primary,
            attribute = %name,
            value = %value,
            "editing primary manifest"
        );
        let (edit, written) = tools::edit_manifest_file(&self.primary, |source| {
            tools::add_tools_attribute(source, document, target, &name, &value)
        })?;
        Ok(EditOutcome {
            file: self.primary.clone(),
            plan,
            edit,
            written,
        })
    }

    /// Apply a merger suggestion to the primary manifest. `location` is the
    /// position of the error record that carried it.
    pub fn apply_suggestion(
        &self,
        suggestion: &Suggestion,
        location: &SourceFilePosition,
    ) -> Result<EditOutcome> {
        let (attribute, value, expected, line, column) = match suggestion {
            Suggestion::Add {
                attribute,
                value,
                tag,
                line,
                column,
            } => (attribute, value, tag.as_str(), *line, *column),
            Suggestion::Use { attribute, value } => {
                let position = location.position.ok_or_else(|| Error::UnsupportedSuggestion {
                    message: format!("{} has no source position", suggestion.describe()),
                })?;
                (attribute, value, USES_SDK, position.start_line, position.start_column)
            }
            Suggestion::Unsupported { text } => {
                return Err(Error::UnsupportedSuggestion {
                    message: text.clone(),
                });
            }
        };

        let (edit, written) = tools::edit_manifest_file(&self.primary, |source| {
            let document = source.document();
            let found = document
                .element_at(line, column)
                .map(|element| (element, document.tag_name(element).to_string()));
            match found {
                Some((element, tag)) if tag == expected => {
                    tools::set_tools_attribute(source, element, attribute, value)
                }
                other => {
                    let found = other
                        .map_or_else(|| "nothing".to_string(), |(_, tag)| format!("<{tag}>"));
                    tracing::warn!(
                        expected,
                        found = %found,
                        line,
                        column,
                        "suggestion target not found"
                    );
                    Err(Error::SuggestionTargetMismatch {
                        expected: expected.to_string(),
                        found,
                        line,
                        column,
                    })
                }
            }
        })?;
        Ok(EditOutcome {
            file: self.primary.clone(),
            plan: None,
            edit,
            written,
        })
    }
}
