//! Cross-module resolution through graph and report files
//!
//! `app` depends on `feature`, which depends on `lib`. Each module's merged
//! manifest is an input of the next merge, so records in `app` point into
//! intermediate files until the resolver follows them home.

use manifest_core::{
    ConfigResolver, ModuleId, NodePath, ProjectGraph, ProvenanceConfig, Session, SnapshotCache,
    SnapshotSupplier,
};
use manifest_fs::NormalizedPath;
use manifest_test_utils::project::{GRAPH_FILE, TestProject};
use manifest_xml::NodeRef;
use pretty_assertions::assert_eq;

const APP: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.app">
    <application android:label="App" />
</manifest>
"#;

const FEATURE: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.feature">
    <application>
        <activity android:name="com.feature.FeatureActivity" />
    </application>
</manifest>
"#;

const LIB: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.lib">
    <uses-permission android:name="android.permission.CAMERA" />
    <application>
        <service
            android:name="com.lib.SyncService"
            android:exported="false" />
    </application>
</manifest>
"#;

fn chain_project() -> TestProject {
    let mut project = TestProject::new();
    project.add_module("app", &["feature"]);
    project.add_module("feature", &["lib"]);
    project.add_module("lib", &[]);
    project.write_manifest("app", "main", APP);
    project.write_manifest("feature", "main", FEATURE);
    project.write_manifest("lib", "main", LIB);
    project.merge_module("lib");
    project.merge_module("feature");
    project.merge_module("app");
    project.write_graph();
    project
}

struct Loaded {
    graph: ProjectGraph,
    snapshots: SnapshotCache,
}

impl Loaded {
    fn from(project: &TestProject) -> Self {
        let graph = ProjectGraph::load(&project.path(GRAPH_FILE)).unwrap();
        let snapshots = graph.load_snapshots().unwrap();
        Self { graph, snapshots }
    }

    fn session(&self, config: ProvenanceConfig) -> Session<'_> {
        let id = ModuleId::new("app");
        let snapshot = self.snapshots.snapshot(&id).unwrap();
        let primary = self.graph.primary_manifest(&id).unwrap();
        Session::new(snapshot, id, primary, &self.graph, &self.snapshots).with_config(config)
    }
}

fn node(session: &Session<'_>, path: &str) -> NodeRef {
    NodePath::parse(path)
        .unwrap()
        .resolve(session.snapshot().document())
        .unwrap()
}

#[test]
fn test_records_resolve_through_two_modules() {
    let project = chain_project();
    let loaded = Loaded::from(&project);
    let session = loaded.session(ProvenanceConfig::default());
    let service = node(&session, "manifest/application/service[com.lib.SyncService]");

    let record = session.snapshot().records_for(service)[0].clone();
    assert_eq!(record.location.file, Some(project.merged_manifest("feature")));

    let resolution = session.resolver().resolve_detailed(&record, session.module());
    assert_eq!(resolution.hops, vec![ModuleId::new("feature"), ModuleId::new("lib")]);
    assert!(!resolution.truncated);
    assert_eq!(
        resolution.location.file,
        Some(project.path("lib/src/main/AndroidManifest.xml"))
    );
    assert_eq!(resolution.location.position.map(|p| (p.start_line, p.start_column)), Some((4, 9)));
}

#[test]
fn test_attribute_resolves_to_its_own_line() {
    let project = chain_project();
    let loaded = Loaded::from(&project);
    let session = loaded.session(ProvenanceConfig::default());
    let exported = node(
        &session,
        "manifest/application/service[com.lib.SyncService]@android:exported",
    );

    let declaration = session.declaration(exported).unwrap();
    assert_eq!(declaration.file, Some(project.path("lib/src/main/AndroidManifest.xml")));
    assert_eq!(declaration.position.map(|p| p.start_line), Some(6));
    assert_eq!(session.label(&declaration), "lib main");
}

#[test]
fn test_project_config_limits_depth() {
    let project = chain_project();
    std::fs::write(
        project.root().join(".manifest-provenance.toml"),
        "max_resolution_depth = 1\n",
    )
    .unwrap();
    let global = tempfile::TempDir::new().unwrap();
    let config = ConfigResolver::with_global_config_dir(
        NormalizedPath::new(project.root()),
        global.path().to_path_buf(),
    )
    .resolve()
    .unwrap();
    assert_eq!(config.max_resolution_depth, Some(1));

    let loaded = Loaded::from(&project);
    let session = loaded.session(config);
    let service = node(&session, "manifest/application/service[com.lib.SyncService]");
    let record = session.snapshot().records_for(service)[0].clone();

    let resolution = session.resolver().resolve_detailed(&record, session.module());
    assert!(resolution.truncated);
    assert_eq!(resolution.hops, vec![ModuleId::new("feature")]);
    assert_eq!(resolution.location.file, Some(project.merged_manifest("lib")));
}

#[test]
fn test_provenance_index_orders_contributors() {
    let project = chain_project();
    let loaded = Loaded::from(&project);
    let session = loaded.session(ProvenanceConfig::default());
    let index = session.provenance_index();

    let expected: Vec<NormalizedPath> = vec![
        project.path("app/src/main/AndroidManifest.xml"),
        project.path("feature/src/main/AndroidManifest.xml"),
        project.path("lib/src/main/AndroidManifest.xml"),
    ];
    assert_eq!(index.files(), expected.as_slice());
    assert_eq!(index.referenced().len(), 2);
    assert!(index.others().is_empty());

    let labels: Vec<String> = index
        .files()
        .iter()
        .map(|file| index.describe(file, &loaded.graph).label)
        .collect();
    assert_eq!(labels, vec!["app main", "feature main", "lib main"]);
}

#[test]
fn test_explain_crosses_modules() {
    let project = chain_project();
    let loaded = Loaded::from(&project);
    let session = loaded.session(ProvenanceConfig::default());
    let permission = node(&session, "manifest/uses-permission[android.permission.CAMERA]");

    let explanation = session.explain(permission);
    assert!(!explanation.merge_failed);
    assert_eq!(explanation.entries.len(), 1);
    assert_eq!(
        explanation.entries[0].location.file,
        Some(project.path("lib/src/main/AndroidManifest.xml"))
    );
    assert!(session.can_remove(permission));
}
