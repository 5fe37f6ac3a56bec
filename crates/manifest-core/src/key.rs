//! Canonical node keys
//!
//! The merger logs every decision against a key derived from the element,
//! so looking provenance up means deriving the same key from the merged
//! document. First match wins:
//!
//! 1. the tag's entry in the snapshot's [`KeyTable`] (elements that occur
//!    at most once, such as `application` or `uses-sdk`)
//! 2. `tag#<android:name>`
//! 3. `tag#<android:glEsVersion>`
//! 4. `intent-filter#<structural key over its children>`
//!
//! Anything else has no key and therefore no provenance.

use manifest_xml::ns::ANDROID_URI;
use manifest_xml::{Document, ElementId, NodeRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const INTENT_FILTER: &str = "intent-filter";

/// Opaque key identifying an element in merge records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Keys for tags that are unique within a manifest and so need no
/// disambiguator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyTable(HashMap<String, NodeKey>);

impl KeyTable {
    pub fn new(entries: HashMap<String, NodeKey>) -> Self {
        Self(entries)
    }

    pub fn get(&self, tag: &str) -> Option<&NodeKey> {
        self.0.get(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>, key: NodeKey) {
        self.0.insert(tag.into(), key);
    }
}

impl Default for KeyTable {
    /// Android's singleton manifest elements, each keyed by its tag.
    fn default() -> Self {
        let entries = [
            "manifest",
            "application",
            "uses-sdk",
            "supports-screens",
            "compatible-screens",
            "uses-configuration",
        ]
        .into_iter()
        .map(|tag| (tag.to_string(), NodeKey::new(tag)))
        .collect();
        Self(entries)
    }
}

/// Derive the key of `element`, or `None` when it has no identity.
pub fn element_key(document: &Document, table: &KeyTable, element: ElementId) -> Option<NodeKey> {
    let tag = document.tag_name(element);
    if let Some(key) = table.get(tag) {
        return Some(key.clone());
    }
    if let Some(name) = document.attribute_value(element, ANDROID_URI, "name") {
        return Some(NodeKey::new(format!("{tag}#{name}")));
    }
    if let Some(version) = document.attribute_value(element, ANDROID_URI, "glEsVersion") {
        return Some(NodeKey::new(format!("{tag}#{version}")));
    }
    if tag == INTENT_FILTER {
        return Some(NodeKey::new(format!("{tag}#{}", intent_filter_signature(document, element))));
    }
    None
}

/// The element whose records describe `node`.
///
/// Children of an intent-filter, and their attributes, are not addressable
/// on their own; their history is logged against the filter.
pub fn record_owner(document: &Document, node: NodeRef) -> ElementId {
    let owner = node.owner();
    match document.parent(owner) {
        Some(parent) if document.tag_name(parent) == INTENT_FILTER => parent,
        _ => owner,
    }
}

/// Order-independent description of an intent-filter's content: each
/// child's `android:name` (or, for `data`, its sorted attributes), sorted
/// and joined with `+`.
pub fn intent_filter_signature(document: &Document, filter: ElementId) -> String {
    let mut parts: Vec<String> = document
        .children(filter)
        .iter()
        .map(|&child| match document.attribute_value(child, ANDROID_URI, "name") {
            Some(name) => name.to_string(),
            None => {
                let mut attrs: Vec<String> = document
                    .element(child)
                    .attributes()
                    .iter()
                    .filter(|attr| !attr.is_namespace_declaration())
                    .map(|attr| format!("{}={}", attr.local_name(), attr.value()))
                    .collect();
                attrs.sort();
                format!("{}({})", document.tag_name(child), attrs.join(";"))
            }
        })
        .collect();
    parts.sort();
    parts.join("+")
}
