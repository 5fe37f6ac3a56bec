//! A minimal manifest merger for tests.
//!
//! Only the direct children of `<manifest>` and `<application>` take part.
//! Merged elements are emitted self-closing, nested content is dropped.
//! Markers in the primary manifest are honoured: `tools:node="remove"`
//! drops the element with the same key from every library, and
//! `tools:remove="a,b"` drops the listed attributes.

use manifest_core::key::element_key;
use manifest_core::{
    ActionType, Actions, KeyTable, MergedManifestSnapshot, NodeKey, Record, Result,
    SourceFilePosition,
};
use manifest_fs::{NormalizedPath, compute_content_checksum};
use manifest_xml::ns::{ANDROID_PREFIX, ANDROID_URI, TOOLS_URI};
use manifest_xml::{Document, ElementId, NodeRef};
use quick_xml::escape::escape;
use std::collections::{BTreeMap, HashMap};

const APPLICATION: &str = "application";

#[derive(Debug, Default)]
struct Directives {
    remove_node: bool,
    remove_attributes: Vec<String>,
}

#[derive(Debug)]
struct MergedElement {
    key: Option<NodeKey>,
    tag: String,
    attributes: Vec<(String, String)>,
}

impl MergedElement {
    fn has(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }
}

struct Source<'a> {
    path: &'a NormalizedPath,
    document: Document,
}

/// Merge `primary` with `libraries`, in priority order.
pub fn merge(
    primary: (&NormalizedPath, &str),
    libraries: &[(&NormalizedPath, &str)],
) -> Result<MergedManifestSnapshot> {
    let table = KeyTable::default();
    let mut sources = Vec::with_capacity(libraries.len() + 1);
    let mut checksums = BTreeMap::new();
    for (path, text) in std::iter::once(primary).chain(libraries.iter().copied()) {
        sources.push(Source {
            path,
            document: Document::parse(text)?,
        });
        checksums.insert(path.clone(), compute_content_checksum(text));
    }

    let directives = collect_directives(&sources[0].document, &table);
    let mut actions = Actions::default();
    let mut top = Vec::new();
    let mut app: Option<MergedElement> = None;
    let mut app_children = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        let doc = &source.document;
        let is_primary = index == 0;
        for &child in doc.children(doc.root()) {
            if doc.tag_name(child) == APPLICATION {
                let is_new = app.is_none();
                let merged = app.get_or_insert_with(|| MergedElement {
                    key: element_key(doc, &table, child),
                    tag: APPLICATION.to_string(),
                    attributes: Vec::new(),
                });
                merge_element(source, child, merged, is_new, &directives, &mut actions);
                for &grandchild in doc.children(child) {
                    place(
                        source,
                        grandchild,
                        is_primary,
                        &table,
                        &directives,
                        &mut app_children,
                        &mut actions,
                    );
                }
            } else {
                place(source, child, is_primary, &table, &directives, &mut top, &mut actions);
            }
        }
    }

    let merged = render(&sources[0].document, &top, app.as_ref(), &app_children);
    let document = Document::parse(merged)?;
    Ok(MergedManifestSnapshot::new(document, actions)
        .with_manifest_files(sources.iter().map(|s| s.path.clone()).collect())
        .with_key_table(table)
        .with_checksums(checksums))
}

fn collect_directives(primary: &Document, table: &KeyTable) -> HashMap<NodeKey, Directives> {
    let mut directives = HashMap::new();
    for element in primary.elements() {
        let Some(key) = element_key(primary, table, element) else {
            continue;
        };
        let entry: &mut Directives = directives.entry(key).or_default();
        if primary.attribute_value(element, TOOLS_URI, "node") == Some("remove") {
            entry.remove_node = true;
        }
        if let Some(list) = primary.attribute_value(element, TOOLS_URI, "remove") {
            entry
                .remove_attributes
                .extend(list.split(',').map(|name| name.trim().to_string()));
        }
    }
    directives
}

/// Add `element` to `siblings`, or fold it into the sibling with its key.
fn place(
    source: &Source<'_>,
    element: ElementId,
    is_primary: bool,
    table: &KeyTable,
    directives: &HashMap<NodeKey, Directives>,
    siblings: &mut Vec<MergedElement>,
    actions: &mut Actions,
) {
    let doc = &source.document;
    let key = element_key(doc, table, element);
    if let Some(key) = &key {
        if directives.get(key).is_some_and(|d| d.remove_node) {
            if !is_primary {
                let location = SourceFilePosition::new(source.path.clone(), doc.position(element));
                actions.push(
                    Record::node(key.clone(), ActionType::Rejected, location)
                        .with_reason("tools:node=\"remove\""),
                );
            }
            return;
        }
    }

    let existing = key
        .as_ref()
        .and_then(|key| siblings.iter().position(|s| s.key.as_ref() == Some(key)));
    let index = match existing {
        Some(index) => index,
        None => {
            siblings.push(MergedElement {
                key: key.clone(),
                tag: doc.tag_name(element).to_string(),
                attributes: Vec::new(),
            });
            siblings.len() - 1
        }
    };
    merge_element(source, element, &mut siblings[index], existing.is_none(), directives, actions);
    if let (Some(key), Some(_)) = (&key, existing) {
        let location = SourceFilePosition::new(source.path.clone(), doc.position(element));
        actions.push(Record::node(key.clone(), ActionType::Merged, location));
    }
}

/// Copy attributes the merged element does not have yet, logging each.
fn merge_element(
    source: &Source<'_>,
    element: ElementId,
    merged: &mut MergedElement,
    is_new: bool,
    directives: &HashMap<NodeKey, Directives>,
    actions: &mut Actions,
) {
    let doc = &source.document;
    let removed = merged
        .key
        .as_ref()
        .and_then(|key| directives.get(key))
        .map(|d| d.remove_attributes.as_slice())
        .unwrap_or_default();
    if is_new {
        if let Some(key) = &merged.key {
            let location = SourceFilePosition::new(source.path.clone(), doc.position(element));
            actions.push(Record::node(key.clone(), ActionType::Added, location));
        }
    }

    for id in doc.attribute_ids(element) {
        let attr = doc.attribute(id);
        if attr.is_namespace_declaration() || attr.namespace() == Some(TOOLS_URI) {
            continue;
        }
        let name = match attr.namespace() {
            Some(ANDROID_URI) => format!("{ANDROID_PREFIX}:{}", attr.local_name()),
            _ => attr.name().to_string(),
        };
        if merged.has(&name) || removed.contains(&name) {
            continue;
        }
        if let Some(key) = &merged.key {
            let location = SourceFilePosition::new(
                source.path.clone(),
                doc.node_position(NodeRef::Attribute(id)),
            );
            actions.push(Record::attribute(key.clone(), name.clone(), ActionType::Added, location));
        }
        merged.attributes.push((name, attr.value().to_string()));
    }
}

fn render(
    primary: &Document,
    top: &[MergedElement],
    app: Option<&MergedElement>,
    app_children: &[MergedElement],
) -> String {
    let root = primary.root();
    let mut out = format!("<manifest xmlns:{ANDROID_PREFIX}=\"{ANDROID_URI}\"");
    for id in primary.attribute_ids(root) {
        let attr = primary.attribute(id);
        if attr.is_namespace_declaration() || attr.namespace() == Some(TOOLS_URI) {
            continue;
        }
        out.push_str(&format!(" {}=\"{}\"", attr.name(), escape(attr.value())));
    }
    out.push_str(">\n");

    for element in top {
        out.push_str(&format!("    {}\n", start_tag(element, true)));
    }
    if let Some(app) = app {
        if app_children.is_empty() {
            out.push_str(&format!("    {}\n", start_tag(app, true)));
        } else {
            out.push_str(&format!("    {}\n", start_tag(app, false)));
            for child in app_children {
                out.push_str(&format!("        {}\n", start_tag(child, true)));
            }
            out.push_str("    </application>\n");
        }
    }
    out.push_str("</manifest>\n");
    out
}

fn start_tag(element: &MergedElement, self_closing: bool) -> String {
    let mut tag = format!("<{}", element.tag);
    for (name, value) in &element.attributes {
        tag.push_str(&format!(" {name}=\"{}\"", escape(value.as_str())));
    }
    tag.push_str(if self_closing { " />" } else { ">" });
    tag
}
