//! Tests for parsing and navigation

use manifest_xml::ns::{ANDROID_URI, TOOLS_URI};
use manifest_xml::{Document, Error, NodeRef, SourcePosition};
use pretty_assertions::assert_eq;
use rstest::rstest;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- app manifest -->
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app">
    <uses-sdk android:minSdkVersion="21" />
    <application android:label="@string/app_name">
        <activity android:name=".MainActivity">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#;

#[test]
fn test_parse_builds_tree_in_document_order() {
    let doc = Document::parse(MANIFEST).unwrap();
    let names: Vec<&str> = doc.elements().map(|id| doc.tag_name(id)).collect();
    assert_eq!(
        names,
        vec!["manifest", "uses-sdk", "application", "activity", "intent-filter", "action"]
    );

    let root = doc.root();
    assert_eq!(doc.parent(root), None);
    let application = doc.children(root)[1];
    assert_eq!(doc.tag_name(application), "application");
    assert_eq!(doc.parent(application), Some(root));
}

#[test]
fn test_attribute_namespaces_resolve() {
    let doc = Document::parse(MANIFEST).unwrap();
    let activity = doc.elements().find(|&id| doc.tag_name(id) == "activity").unwrap();
    assert_eq!(doc.attribute_value(activity, ANDROID_URI, "name"), Some(".MainActivity"));

    let root = doc.root();
    let package = doc.find_attribute_named(root, "package").unwrap();
    assert_eq!(doc.attribute(package).namespace(), None);
    assert_eq!(doc.prefix_for_namespace(activity, ANDROID_URI), Some("android"));
    assert_eq!(doc.prefix_for_namespace(activity, TOOLS_URI), None);
}

#[test]
fn test_entities_are_unescaped() {
    let doc = Document::parse(r#"<manifest label="a &amp; b"/>"#).unwrap();
    let attr = doc.find_attribute_named(doc.root(), "label").unwrap();
    assert_eq!(doc.attribute(attr).value(), "a & b");
}

#[test]
fn test_element_position() {
    let doc = Document::parse(MANIFEST).unwrap();
    let uses_sdk = doc.elements().find(|&id| doc.tag_name(id) == "uses-sdk").unwrap();
    let position = doc.position(uses_sdk);
    assert_eq!(position.start_line, 5);
    assert_eq!(position.start_column, 5);
    assert_eq!(position.end_line, 5);
}

#[rstest]
#[case(5, 5, "uses-sdk")]
#[case(9, 17, "action")]
#[case(8, 20, "intent-filter")]
#[case(4, 1, "manifest")]
fn test_element_at(#[case] line: usize, #[case] column: usize, #[case] expected: &str) {
    let doc = Document::parse(MANIFEST).unwrap();
    let found = doc.element_at(line, column).unwrap();
    assert_eq!(doc.tag_name(found), expected);
}

#[test]
fn test_node_at_prefers_attribute() {
    let doc = Document::parse(MANIFEST).unwrap();
    // column of `android:minSdkVersion` on line 5
    let node = doc.node_at(5, 15).unwrap();
    match node {
        NodeRef::Attribute(id) => assert_eq!(doc.attribute(id).name(), "android:minSdkVersion"),
        other => panic!("expected attribute, got {other:?}"),
    }
}

#[test]
fn test_node_at_outside_root_is_none() {
    let doc = Document::parse(MANIFEST).unwrap();
    assert_eq!(doc.node_at(1, 1), None);
    assert_eq!(doc.node_at(400, 1), None);
}

#[test]
fn test_attribute_position_display() {
    let doc = Document::parse("<manifest>\n  <uses-sdk a=\"1\"/>\n</manifest>").unwrap();
    let uses_sdk = doc.children(doc.root())[0];
    let attr = doc.find_attribute_named(uses_sdk, "a").unwrap();
    assert_eq!(
        doc.node_position(NodeRef::Attribute(attr)),
        SourcePosition::range((2, 13), (2, 18))
    );
}

#[test]
fn test_missing_root() {
    let result = Document::parse("<?xml version=\"1.0\"?>\n<!-- nothing -->");
    assert_eq!(result.unwrap_err(), Error::NoRootElement);
}

#[test]
fn test_second_root_rejected() {
    let result = Document::parse("<manifest/>\n<manifest/>");
    assert!(matches!(result, Err(Error::MultipleRoots { line: 2, .. })));
}

#[test]
fn test_mismatched_end_tag_rejected() {
    let result = Document::parse("<manifest><application></manifest>");
    assert!(result.is_err());
}

#[test]
fn test_bad_attribute_syntax_reports_position() {
    let result = Document::parse("<manifest>\n  <uses-sdk min=21/>\n</manifest>");
    assert!(matches!(result, Err(Error::Syntax { line: 2, .. })));
}

#[test]
fn test_positions_serialize_as_plain_fields() {
    let position = SourcePosition::range((3, 5), (3, 49));
    let json = serde_json::to_value(position).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"start_line": 3, "start_column": 5, "end_line": 3, "end_column": 49})
    );
    let back: SourcePosition = serde_json::from_value(json).unwrap();
    assert_eq!(back.to_string(), "3:5-49");
}
