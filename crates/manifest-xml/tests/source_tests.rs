//! Tests for format-preserving source edits

use manifest_xml::ns::TOOLS_URI;
use manifest_xml::{EditKind, SourceDocument};
use pretty_assertions::assert_eq;

#[test]
fn test_set_attribute_inline() {
    let mut source =
        SourceDocument::parse("<manifest>\n    <uses-sdk a=\"1\" />\n</manifest>\n").unwrap();
    let uses_sdk = source.document().children(source.document().root())[0];

    assert!(source.set_attribute(uses_sdk, "tools:node", "remove").unwrap());

    assert_eq!(
        source.source(),
        "<manifest>\n    <uses-sdk a=\"1\" tools:node=\"remove\" />\n</manifest>\n"
    );
    assert!(source.is_modified());
    assert_eq!(source.edits().len(), 1);
    assert_eq!(source.edits()[0].kind, EditKind::Insert);
}

#[test]
fn test_set_attribute_follows_one_per_line_layout() {
    let text = "<manifest>\n    <activity\n        android:name=\".Main\"\n        android:label=\"x\">\n    </activity>\n</manifest>\n";
    let mut source = SourceDocument::parse(text).unwrap();
    let activity = source.document().children(source.document().root())[0];

    source.set_attribute(activity, "tools:replace", "android:label").unwrap();

    assert_eq!(
        source.source(),
        "<manifest>\n    <activity\n        android:name=\".Main\"\n        android:label=\"x\"\n        tools:replace=\"android:label\">\n    </activity>\n</manifest>\n"
    );
}

#[test]
fn test_set_attribute_replaces_value_in_place() {
    let mut source =
        SourceDocument::parse("<manifest><a tools:replace='android:label' b=\"2\"/></manifest>")
            .unwrap();
    let a = source.document().children(source.document().root())[0];

    source
        .set_attribute(a, "tools:replace", "android:label,android:icon")
        .unwrap();

    assert_eq!(
        source.source(),
        "<manifest><a tools:replace='android:label,android:icon' b=\"2\"/></manifest>"
    );
    assert_eq!(source.edits()[0].old_content, "android:label");
}

#[test]
fn test_set_attribute_same_value_is_noop() {
    let mut source = SourceDocument::parse("<manifest a=\"1\"/>").unwrap();
    let root = source.document().root();
    assert!(!source.set_attribute(root, "a", "1").unwrap());
    assert!(!source.is_modified());
}

#[test]
fn test_set_attribute_escapes_value() {
    let mut source = SourceDocument::parse("<manifest/>").unwrap();
    let root = source.document().root();
    source.set_attribute(root, "label", "a<b").unwrap();
    assert_eq!(source.source(), "<manifest label=\"a&lt;b\"/>");
    let attr = source.document().find_attribute_named(root, "label").unwrap();
    assert_eq!(source.document().attribute(attr).value(), "a<b");
}

#[test]
fn test_declare_namespace_on_root() {
    let mut source = SourceDocument::parse("<manifest package=\"p\">\n</manifest>").unwrap();
    source.declare_namespace("tools", TOOLS_URI).unwrap();
    let root = source.document().root();
    assert_eq!(source.document().prefix_for_namespace(root, TOOLS_URI), Some("tools"));
}

#[test]
fn test_append_child_after_existing_children() {
    let text = "<manifest>\n    <application>\n        <activity android:name=\".A\" />\n    </application>\n</manifest>\n";
    let mut source = SourceDocument::parse(text).unwrap();
    let application = source.document().children(source.document().root())[0];

    let created = source
        .append_child(application, "activity", &[("android:name", ".B")])
        .unwrap();

    assert_eq!(
        source.source(),
        "<manifest>\n    <application>\n        <activity android:name=\".A\" />\n        <activity android:name=\".B\" />\n    </application>\n</manifest>\n"
    );
    assert_eq!(source.document().tag_name(created), "activity");
    assert_eq!(source.document().parent(created), Some(application));
}

#[test]
fn test_append_child_expands_self_closing_parent() {
    let text = "<manifest>\n    <application android:label=\"x\" />\n</manifest>\n";
    let mut source = SourceDocument::parse(text).unwrap();
    let application = source.document().children(source.document().root())[0];

    let created = source.append_child(application, "service", &[]).unwrap();

    assert_eq!(
        source.source(),
        "<manifest>\n    <application android:label=\"x\">\n        <service />\n    </application>\n</manifest>\n"
    );
    assert_eq!(source.document().tag_name(created), "service");
}

#[test]
fn test_append_child_into_inline_empty_element() {
    let mut source = SourceDocument::parse("<manifest></manifest>").unwrap();
    let root = source.document().root();

    let created = source.append_child(root, "application", &[]).unwrap();

    assert_eq!(source.source(), "<manifest>\n    <application />\n</manifest>");
    assert_eq!(source.document().parent(created), Some(root));
}

#[test]
fn test_nested_appends_build_a_path() {
    let mut source = SourceDocument::parse("<manifest>\n</manifest>\n").unwrap();
    let root = source.document().root();

    let application = source.append_child(root, "application", &[]).unwrap();
    let activity = source
        .append_child(application, "activity", &[("android:name", ".Main")])
        .unwrap();
    source.set_attribute(activity, "tools:node", "remove").unwrap();

    assert_eq!(
        source.source(),
        "<manifest>\n    <application>\n        <activity android:name=\".Main\" tools:node=\"remove\" />\n    </application>\n</manifest>\n"
    );
}

#[test]
fn test_crlf_line_endings_preserved() {
    let text = "<manifest>\r\n    <application />\r\n</manifest>\r\n";
    let mut source = SourceDocument::parse(text).unwrap();
    let application = source.document().children(source.document().root())[0];

    source.append_child(application, "service", &[]).unwrap();

    assert_eq!(
        source.source(),
        "<manifest>\r\n    <application>\r\n        <service />\r\n    </application>\r\n</manifest>\r\n"
    );
}
