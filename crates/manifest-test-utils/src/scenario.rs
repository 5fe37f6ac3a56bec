//! Ready-made projects shared by the CLI and integration suites.

use crate::project::TestProject;

/// Primary manifest of the `app` module in [`app_with_library`].
pub const APP_MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app">
    <application android:label="@string/app_name">
        <activity android:name=".MainActivity" />
    </application>
</manifest>
"#;

/// Primary manifest of the `lib` module in [`app_with_library`].
pub const LIB_MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.lib">
    <uses-permission android:name="android.permission.INTERNET" />
    <application android:icon="@drawable/lib_icon">
        <activity
            android:name="com.example.lib.TrackerActivity"
            android:exported="true" />
    </application>
</manifest>
"#;

/// `app` depends on `lib`; both are merged and the graph file is written.
///
/// In the merged `app` manifest the permission, the application icon and
/// `TrackerActivity` come from `lib`.
pub fn app_with_library() -> TestProject {
    let mut project = TestProject::new();
    project.add_module("app", &["lib"]);
    project.add_module("lib", &[]);
    project.write_manifest("app", "main", APP_MANIFEST);
    project.write_manifest("lib", "main", LIB_MANIFEST);
    project.merge_module("lib");
    project.merge_module("app");
    project.write_graph();
    project
}
