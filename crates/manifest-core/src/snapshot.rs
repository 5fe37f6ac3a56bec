//! One merge result
//!
//! A [`MergedManifestSnapshot`] is immutable once built and is shared behind
//! an `Arc` by everything that queries it. Writing to any source manifest
//! makes it stale; [`MergedManifestSnapshot::is_stale`] detects that from
//! the checksums recorded at merge time.

use crate::actions::{ActionIndex, Actions, Record};
use crate::key::{self, KeyTable, NodeKey};
use crate::location::SourceFilePosition;
use crate::{Error, Result};
use manifest_fs::{ConfigStore, NormalizedPath, has_changed};
use manifest_xml::{Document, NodeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity of a merger log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A message the merger logged while merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingRecord {
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub location: SourceFilePosition,
}

/// The merged document and everything the merger said about it.
#[derive(Debug, Clone)]
pub struct MergedManifestSnapshot {
    document: Document,
    actions: Actions,
    manifest_files: Vec<NormalizedPath>,
    key_table: KeyTable,
    logging_records: Vec<LoggingRecord>,
    checksums: BTreeMap<NormalizedPath, String>,
}

impl MergedManifestSnapshot {
    pub fn new(document: Document, actions: Actions) -> Self {
        Self {
            document,
            actions,
            manifest_files: Vec::new(),
            key_table: KeyTable::default(),
            logging_records: Vec::new(),
            checksums: BTreeMap::new(),
        }
    }

    pub fn with_manifest_files(mut self, files: Vec<NormalizedPath>) -> Self {
        self.manifest_files = files;
        self
    }

    pub fn with_key_table(mut self, table: KeyTable) -> Self {
        self.key_table = table;
        self
    }

    pub fn with_logging_records(mut self, records: Vec<LoggingRecord>) -> Self {
        self.logging_records = records;
        self
    }

    pub fn with_checksums(mut self, checksums: BTreeMap<NormalizedPath, String>) -> Self {
        self.checksums = checksums;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Every manifest that contributed to the merge.
    pub fn manifest_files(&self) -> &[NormalizedPath] {
        &self.manifest_files
    }

    pub fn key_table(&self) -> &KeyTable {
        &self.key_table
    }

    pub fn logging_records(&self) -> &[LoggingRecord] {
        &self.logging_records
    }

    /// Key of the element whose records describe `node`.
    pub fn key_for(&self, node: NodeRef) -> Option<NodeKey> {
        let owner = key::record_owner(&self.document, node);
        key::element_key(&self.document, &self.key_table, owner)
    }

    /// The merge history of `node`, oldest first. Empty when the node has
    /// no key.
    pub fn records_for(&self, node: NodeRef) -> Vec<&Record> {
        let Some(key) = self.key_for(node) else {
            tracing::debug!(?node, "node has no key, no provenance available");
            return Vec::new();
        };
        match node {
            NodeRef::Attribute(id) if key::record_owner(&self.document, node) == id.element => {
                let name = self.document.attribute(id).name();
                self.actions.attribute_records(&key, name)
            }
            _ => self.actions.node_records(&key),
        }
    }

    /// True when any recorded source file changed or vanished since the
    /// merge. Snapshots without checksums are never considered stale.
    pub fn is_stale(&self) -> bool {
        self.checksums
            .iter()
            .any(|(path, recorded)| has_changed(path, recorded))
    }

    /// Build from a deserialized merge report.
    pub fn from_report(report: SnapshotReport) -> Result<Self> {
        let document = Document::parse(report.merged)?;
        Ok(Self {
            document,
            actions: Actions::new(report.actions),
            manifest_files: report.manifest_files,
            key_table: report.key_table.unwrap_or_default(),
            logging_records: report.logging_records,
            checksums: report.checksums,
        })
    }

    pub fn to_report(&self) -> SnapshotReport {
        SnapshotReport {
            merged: self.document.source().to_string(),
            actions: self.actions.records().to_vec(),
            manifest_files: self.manifest_files.clone(),
            key_table: Some(self.key_table.clone()),
            logging_records: self.logging_records.clone(),
            checksums: self.checksums.clone(),
        }
    }

    /// Load a report file (JSON, TOML or YAML by extension).
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let report: SnapshotReport = ConfigStore::new().load(path)?;
        Self::from_report(report).map_err(|e| match e {
            Error::Xml(source) => Error::MalformedSource {
                path: path.clone(),
                source,
            },
            other => other,
        })
    }
}

/// Serialized form of a snapshot, as written by the merge step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotReport {
    /// Merged manifest XML text.
    pub merged: String,
    #[serde(default)]
    pub actions: Vec<Record>,
    #[serde(default)]
    pub manifest_files: Vec<NormalizedPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_table: Option<KeyTable>,
    #[serde(default)]
    pub logging_records: Vec<LoggingRecord>,
    /// `sha256:` checksums of the source manifests at merge time.
    #[serde(default)]
    pub checksums: BTreeMap<NormalizedPath, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionType;
    use manifest_xml::SourcePosition;

    const MERGED: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">
    <application android:label="App">
        <activity android:name=".Main">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
            </intent-filter>
        </activity>
    </application>
</manifest>"#;

    fn at(line: usize) -> SourceFilePosition {
        SourceFilePosition::new("app/AndroidManifest.xml", SourcePosition::point(line, 1))
    }

    fn snapshot() -> MergedManifestSnapshot {
        let actions = Actions::new(vec![
            Record::node("activity#.Main", ActionType::Added, at(3)),
            Record::attribute("application", "android:label", ActionType::Added, at(2)),
            Record::node("intent-filter#android.intent.action.MAIN", ActionType::Added, at(4)),
        ]);
        MergedManifestSnapshot::new(Document::parse(MERGED).unwrap(), actions)
    }

    fn find(snapshot: &MergedManifestSnapshot, tag: &str) -> manifest_xml::ElementId {
        let document = snapshot.document();
        document.elements().find(|&id| document.tag_name(id) == tag).unwrap()
    }

    #[test]
    fn element_records() {
        let snapshot = snapshot();
        let activity = find(&snapshot, "activity");
        let records = snapshot.records_for(NodeRef::Element(activity));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, at(3));
    }

    #[test]
    fn attribute_records_by_qualified_name() {
        let snapshot = snapshot();
        let application = find(&snapshot, "application");
        let label = snapshot
            .document()
            .find_attribute_named(application, "android:label")
            .unwrap();
        let records = snapshot.records_for(NodeRef::Attribute(label));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, at(2));
    }

    #[test]
    fn intent_filter_attributes_use_filter_records() {
        let snapshot = snapshot();
        let action = find(&snapshot, "action");
        let name = snapshot.document().attribute_ids(action).next().unwrap();
        let records = snapshot.records_for(NodeRef::Attribute(name));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, at(4));
    }

    #[test]
    fn report_round_trip_keeps_records() {
        let original = snapshot();
        let restored = MergedManifestSnapshot::from_report(original.to_report()).unwrap();
        assert_eq!(restored.actions(), original.actions());
        assert_eq!(restored.document().source(), MERGED);
    }

    #[test]
    fn no_checksums_is_never_stale() {
        assert!(!snapshot().is_stale());
    }
}
