//! Edit-then-merge round trips
//!
//! Each test writes a tools directive through a [`Session`], runs the test
//! merger again, and checks the merged manifest reflects the directive.

use manifest_core::{
    ActionType, EditOperation, ModuleId, NodePath, ProjectGraph, Session, SnapshotCache,
    SnapshotSupplier,
};
use manifest_test_utils::project::{GRAPH_FILE, TestProject};
use manifest_test_utils::scenario::{APP_MANIFEST, app_with_library};
use manifest_xml::NodeRef;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const TRACKER: &str = "manifest/application/activity[com.example.lib.TrackerActivity]";

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

    fn session(&self, module: &str) -> Session<'_> {
        let id = ModuleId::new(module);
        let snapshot = self.snapshots.snapshot(&id).unwrap();
        let primary = self.graph.primary_manifest(&id).unwrap();
        Session::new(snapshot, id, primary, &self.graph, &self.snapshots)
    }
}

fn node(session: &Session<'_>, path: &str) -> NodeRef {
    NodePath::parse(path)
        .unwrap()
        .resolve(session.snapshot().document())
        .unwrap()
}

#[test]
fn snapshot_merged_app_manifest() {
    let project = app_with_library();
    let merged = project.read(&project.merged_manifest("app"));
    insta::assert_snapshot!(merged, @r#"
    <manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.app">
        <uses-permission android:name="android.permission.INTERNET" />
        <application android:label="@string/app_name" android:icon="@drawable/lib_icon">
            <activity android:name=".MainActivity" />
            <activity android:name="com.example.lib.TrackerActivity" android:exported="true" />
        </application>
    </manifest>
    "#);
}

#[test]
fn test_removed_library_activity_is_gone_after_merge() {
    let mut project = app_with_library();
    {
        let loaded = Loaded::from(&project);
        let session = loaded.session("app");
        let tracker = node(&session, TRACKER);
        assert!(session.can_remove(tracker));
        let outcome = session.edit(tracker, EditOperation::Remove).unwrap();
        assert!(outcome.written);
    }

    let merged = project.merge_module("app");
    let text = merged.document().source();
    assert!(!text.contains("TrackerActivity"), "still merged:\n{text}");
    assert!(text.contains("android.permission.INTERNET"));
    assert!(text.contains(".MainActivity"));

    let rejected: Vec<_> = merged
        .actions()
        .records()
        .iter()
        .filter(|record| record.action_type == ActionType::Rejected)
        .map(|record| record.target_key.as_str().to_string())
        .collect();
    assert_eq!(rejected, vec!["activity#com.example.lib.TrackerActivity".to_string()]);
}

#[test]
fn test_removed_library_attribute_is_gone_after_merge() {
    let mut project = app_with_library();
    {
        let loaded = Loaded::from(&project);
        let session = loaded.session("app");
        let icon = node(&session, "manifest/application@android:icon");
        session.edit(icon, EditOperation::Remove).unwrap();
    }

    let merged = project.merge_module("app");
    let text = merged.document().source();
    assert!(text.contains(r#"<application android:label="@string/app_name">"#), "{text}");
    assert!(!text.contains("lib_icon"));
}

#[test]
fn test_remove_is_idempotent_on_disk() {
    let project = app_with_library();
    let primary = project.path("app/src/main/AndroidManifest.xml");
    let loaded = Loaded::from(&project);
    let session = loaded.session("app");
    let tracker = node(&session, TRACKER);

    session.edit(tracker, EditOperation::Remove).unwrap();
    let once = project.read(&primary);
    let outcome = session.edit(tracker, EditOperation::Remove).unwrap();
    assert!(!outcome.written);
    assert_eq!(project.read(&primary), once);
}

#[test]
fn test_edit_marks_snapshot_stale_until_remerged() {
    let mut project = app_with_library();
    {
        let loaded = Loaded::from(&project);
        let session = loaded.session("app");
        assert!(!session.snapshot().is_stale());
        let tracker = node(&session, TRACKER);
        session.edit(tracker, EditOperation::Remove).unwrap();
        assert!(session.snapshot().is_stale());
    }

    project.merge_module("app");
    let loaded = Loaded::from(&project);
    assert!(!loaded.session("app").snapshot().is_stale());
}

#[test]
fn test_replace_values_accumulate() {
    let project = app_with_library();
    let primary = project.path("app/src/main/AndroidManifest.xml");
    let loaded = Loaded::from(&project);
    let session = loaded.session("app");
    let application = node(&session, "manifest/application");

    for value in ["android:icon", "android:label", "android:icon"] {
        let operation = EditOperation::AddOverride {
            name: "replace".to_string(),
            value: value.to_string(),
        };
        session.edit(application, operation).unwrap();
    }
    project.assert_file_contains(&primary, r#"tools:replace="android:icon,android:label""#);
}

#[test]
fn test_failed_edit_leaves_primary_untouched() {
    let project = app_with_library();
    let primary = project.path("app/src/main/AndroidManifest.xml");
    let loaded = Loaded::from(&project);
    let session = loaded.session("app");
    let application = node(&session, "manifest/application");

    let operation = EditOperation::AddOverride {
        name: "tools:replace".to_string(),
        value: "android:icon".to_string(),
    };
    assert!(session.edit(application, operation).is_err());
    assert_eq!(project.read(&primary), APP_MANIFEST);
}

const ACTIVITIES: [&str; 3] = ["com.lib.First", "com.lib.Second", "com.lib.Third"];

fn three_activity_project() -> TestProject {
    let mut lib = String::from(
        r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.lib">
    <application>
"#,
    );
    for name in ACTIVITIES {
        lib.push_str(&format!("        <activity android:name=\"{name}\" />\n"));
    }
    lib.push_str("    </application>\n</manifest>\n");

    let mut project = TestProject::new();
    project.add_module("app", &["lib"]);
    project.add_module("lib", &[]);
    project.write_manifest("app", "main", APP_MANIFEST);
    project.write_manifest("lib", "main", &lib);
    project.merge_module("lib");
    project.merge_module("app");
    project.write_graph();
    project
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn removed_activities_never_survive_a_merge(mask in 0u8..8) {
        let mut project = three_activity_project();
        {
            let loaded = Loaded::from(&project);
            let session = loaded.session("app");
            for (i, name) in ACTIVITIES.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    let target = node(&session, &format!("manifest/application/activity[{name}]"));
                    session.edit(target, EditOperation::Remove).unwrap();
                }
            }
        }

        let merged = project.merge_module("app");
        let text = merged.document().source();
        for (i, name) in ACTIVITIES.iter().enumerate() {
            let removed = mask & (1 << i) != 0;
            prop_assert_eq!(text.contains(&format!("\"{name}\"")), !removed);
        }
    }
}
