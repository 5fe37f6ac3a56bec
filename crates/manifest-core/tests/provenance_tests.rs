//! Tests for contributing-file ordering and display metadata

use manifest_core::{
    ActionLocationResolver, ActionType, Actions, ManifestEntry, MergedManifestSnapshot,
    ModuleEntry, ModuleId, ProjectGraph, ProvenanceConfig, ProvenanceIndex, Record, SnapshotCache,
    SourceFilePosition,
};
use manifest_core::provenance::label_for;
use manifest_fs::NormalizedPath;
use manifest_xml::{Document, NodeRef, SourcePosition};
use pretty_assertions::assert_eq;

const MERGED: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="p">
    <uses-sdk android:minSdkVersion="21" />
    <application android:label="App" android:icon="@mipmap/ic">
        <activity android:name=".Lib" android:theme="@style/T" />
    </application>
</manifest>"#;

const CURRENT: &str = "/p/app/src/main/AndroidManifest.xml";
const DEBUG: &str = "/p/app/src/debug/AndroidManifest.xml";
const AAR: &str = "/home/u/.gradle/exploded-aar/com.lib/AndroidManifest.xml";
const LIB: &str = "/p/lib/src/main/AndroidManifest.xml";
const UNUSED: &str = "/p/app/src/unused/AndroidManifest.xml";
const UNUSED_AAR: &str = "/home/u/.gradle/exploded-aar/com.other/AndroidManifest.xml";

fn at(file: &str, line: usize) -> SourceFilePosition {
    SourceFilePosition::new(file, SourcePosition::point(line, 5))
}

fn snapshot() -> MergedManifestSnapshot {
    let actions = Actions::new(vec![
        Record::attribute("uses-sdk", "android:minSdkVersion", ActionType::Added, at(AAR, 3)),
        Record::attribute("application", "android:label", ActionType::Added, at(CURRENT, 4)),
        Record::attribute("application", "android:icon", ActionType::Added, at(DEBUG, 2)),
        Record::attribute("activity#.Lib", "android:theme", ActionType::Added, at(LIB, 7)),
        // injected values do not make a file referenced
        Record::attribute("application", "android:icon", ActionType::Injected, at(UNUSED, 1)),
    ]);
    let files = [CURRENT, UNUSED_AAR, LIB, AAR, UNUSED, DEBUG]
        .into_iter()
        .map(NormalizedPath::new)
        .collect();
    MergedManifestSnapshot::new(Document::parse(MERGED).unwrap(), actions)
        .with_manifest_files(files)
}

fn graph() -> ProjectGraph {
    ProjectGraph {
        modules: vec![
            ModuleEntry {
                id: ModuleId::new("app"),
                name: Some("app".to_string()),
                root: NormalizedPath::new("/p/app"),
                manifests: vec![
                    ManifestEntry {
                        path: NormalizedPath::new(CURRENT),
                        source_set: Some("main".to_string()),
                    },
                    ManifestEntry {
                        path: NormalizedPath::new(DEBUG),
                        source_set: Some("debug".to_string()),
                    },
                ],
                dependencies: vec![ModuleId::new("lib")],
                report: None,
            },
            ModuleEntry {
                id: ModuleId::new("lib"),
                name: Some("mylib".to_string()),
                root: NormalizedPath::new("/p/lib"),
                manifests: Vec::new(),
                dependencies: Vec::new(),
                report: None,
            },
        ],
    }
}

fn build(
    graph: &ProjectGraph,
    snapshots: &SnapshotCache,
) -> (MergedManifestSnapshot, ProvenanceIndex) {
    let snapshot = snapshot();
    let resolver = ActionLocationResolver::new(graph, snapshots);
    let index = ProvenanceIndex::build(
        &snapshot,
        &NormalizedPath::new(CURRENT),
        &resolver,
        &ModuleId::new("app"),
        &ProvenanceConfig::default(),
    );
    (snapshot, index)
}

fn paths(files: &[NormalizedPath]) -> Vec<&str> {
    files.iter().map(NormalizedPath::as_str).collect()
}

#[test]
fn test_current_first_then_referenced_then_others() {
    let graph = graph();
    let snapshots = SnapshotCache::default();
    let (_, index) = build(&graph, &snapshots);

    assert_eq!(index.current().as_str(), CURRENT);
    assert_eq!(paths(index.referenced()), vec![DEBUG, LIB, AAR]);
    assert_eq!(paths(index.others()), vec![UNUSED, UNUSED_AAR]);
    assert_eq!(index.files().len(), 6);
}

#[test]
fn test_palette_slots() {
    let graph = graph();
    let snapshots = SnapshotCache::default();
    let (_, index) = build(&graph, &snapshots);

    assert_eq!(index.palette_index(0), None);
    assert_eq!(index.palette_index(1), Some(0));
    assert_eq!(index.palette_index(2), Some(3));
    assert_eq!(index.palette_index(4), Some(9));
    assert_eq!(index.palette_index(5), Some(2));
}

#[test]
fn test_interning_appends_unknown_files() {
    let graph = graph();
    let snapshots = SnapshotCache::default();
    let (_, mut index) = build(&graph, &snapshots);

    let stranger = NormalizedPath::new("/elsewhere/AndroidManifest.xml");
    assert_eq!(index.slot_of(&stranger), None);
    assert_eq!(index.intern(&stranger), 6);
    assert_eq!(index.intern(&stranger), 6);
    assert_eq!(index.intern(&NormalizedPath::new(LIB)), 2);
}

#[test]
fn test_slot_for_node() {
    let graph = graph();
    let snapshots = SnapshotCache::default();
    let (snapshot, mut index) = build(&graph, &snapshots);
    let resolver = ActionLocationResolver::new(&graph, &snapshots);
    let document = snapshot.document();
    let application = document.children(document.root())[1];
    let label = document.find_attribute_named(application, "android:label").unwrap();

    let slot = index.slot_for_node(
        &snapshot,
        NodeRef::Attribute(label),
        &resolver,
        &ModuleId::new("app"),
    );
    assert_eq!(slot, Some(0));

    let package = document.find_attribute_named(document.root(), "package").unwrap();
    assert_eq!(
        index.slot_for_node(
            &snapshot,
            NodeRef::Attribute(package),
            &resolver,
            &ModuleId::new("app"),
        ),
        None
    );
}

#[test]
fn test_describe_labels() {
    let graph = graph();
    let snapshots = SnapshotCache::default();
    let (_, index) = build(&graph, &snapshots);

    let current = index.describe(&NormalizedPath::new(CURRENT), &graph);
    assert_eq!(current.label, "app main");
    assert!(current.is_current);
    assert!(current.is_project_file);
    assert_eq!(current.palette_index, None);

    let debug = index.describe(&NormalizedPath::new(DEBUG), &graph);
    assert_eq!(debug.label, "app debug");
    assert_eq!(debug.slot, Some(1));

    let lib = index.describe(&NormalizedPath::new(LIB), &graph);
    assert_eq!(lib.label, "mylib");

    let aar = index.describe(&NormalizedPath::new(AAR), &graph);
    assert_eq!(aar.label, "AndroidManifest.xml");
    assert!(!aar.is_project_file);
    assert!(aar.sort_key.starts_with('1'));
}

#[test]
fn test_label_fallback_includes_position() {
    let graph = ProjectGraph::default();
    assert_eq!(label_for(&at(AAR, 3), &graph), "AndroidManifest.xml:3:5");
}

#[test]
fn test_single_module_omits_module_name() {
    let mut graph = graph();
    graph.modules.truncate(1);
    assert_eq!(label_for(&SourceFilePosition::file_only(DEBUG), &graph), "debug");
}
