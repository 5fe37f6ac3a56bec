//! Writing `tools:` directives into a primary manifest
//!
//! The merged document tells us *which* element to annotate; the primary
//! manifest may not contain that element at all (it came from a library),
//! so the editor walks the element's ancestor chain through the real source
//! and creates whatever tags are missing before setting the attribute.
//! All edits happen on a copy; the caller's source is only replaced once
//! every step succeeded.

use crate::node_path::{PathSegment, ancestor_chain};
use crate::{Error, Result};
use manifest_fs::NormalizedPath;
use manifest_xml::ns::{ANDROID_PREFIX, ANDROID_URI, TOOLS_PREFIX, TOOLS_URI};
use manifest_xml::{Document, ElementId, SourceDocument};

/// `tools:node`
pub const NODE: &str = "node";
/// `tools:remove`
pub const REMOVE: &str = "remove";
/// `tools:replace`
pub const REPLACE: &str = "replace";
/// Value of `tools:node` that drops the element from the merge.
pub const NODE_REMOVE: &str = "remove";

/// Tools attributes holding one value rather than a comma separated list.
const SINGLE_VALUED: &[&str] = &[NODE, "selector"];

/// What one tools edit did to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsEdit {
    /// The annotated element, in the edited source.
    pub element: ElementId,
    /// Attribute name as written, e.g. `tools:replace`.
    pub attribute: String,
    /// The attribute's value after the edit.
    pub value: String,
    /// Path segments that had to be created.
    pub created: Vec<PathSegment>,
    pub changed: bool,
}

/// Add `tools:name="value"` to the element in `source` that corresponds to
/// `target` in the merged document, creating missing ancestors.
///
/// An existing value is treated as a comma separated list; `value` is
/// appended unless already present. Single-valued attributes such as
/// `tools:node` are replaced instead.
pub fn add_tools_attribute(
    source: &mut SourceDocument,
    merged: &Document,
    target: ElementId,
    name: &str,
    value: &str,
) -> Result<ToolsEdit> {
    check_name(name)?;
    let chain = ancestor_chain(merged, target);
    let Some((first, rest)) = chain.split_first() else {
        return Err(Error::AncestorPathMismatch {
            segment: String::new(),
        });
    };

    let mut working = source.clone();
    let root = working.document().root();
    if working.document().tag_name(root) != first.tag {
        return Err(Error::AncestorPathMismatch {
            segment: first.to_string(),
        });
    }

    let mut created = Vec::new();
    let mut current = root;
    for segment in rest {
        let existing = working
            .document()
            .children(current)
            .iter()
            .copied()
            .find(|&child| segment.matches(working.document(), child));
        current = match existing {
            Some(child) => child,
            None => {
                tracing::debug!(segment = %segment, "creating missing tag in primary manifest");
                created.push(segment.clone());
                create_segment(&mut working, current, segment)?
            }
        };
    }

    let mut edit = set_tools_attribute(&mut working, current, name, value)?;
    edit.created = created;
    edit.changed = working.source() != source.source();
    *source = working;
    Ok(edit)
}

/// Add `tools:name="value"` directly on `element` of `source`, merging with
/// any existing value.
pub fn set_tools_attribute(
    source: &mut SourceDocument,
    element: ElementId,
    name: &str,
    value: &str,
) -> Result<ToolsEdit> {
    check_name(name)?;
    let edits_before = source.edits().len();
    let prefix = ensure_namespace(source, TOOLS_URI, TOOLS_PREFIX)?;

    let document = source.document();
    let (attribute, merged) = match document.find_attribute(element, TOOLS_URI, name) {
        Some(id) => {
            let existing = document.attribute(id);
            let merged = if SINGLE_VALUED.contains(&name) {
                value.to_string()
            } else {
                merge_list(existing.value(), value)
            };
            (existing.name().to_string(), merged)
        }
        None => (format!("{prefix}:{name}"), value.to_string()),
    };

    source.set_attribute(element, &attribute, &merged)?;
    Ok(ToolsEdit {
        element,
        attribute,
        value: merged,
        created: Vec::new(),
        changed: source.edits().len() != edits_before,
    })
}

/// Run `edit` against the manifest at `path` under an exclusive lock and
/// write the result atomically. A parse failure is reported as
/// [`Error::MalformedSource`] and nothing is written.
pub fn edit_manifest_file<T>(
    path: &NormalizedPath,
    edit: impl FnOnce(&mut SourceDocument) -> Result<T>,
) -> Result<(T, bool)> {
    let (value, written) = manifest_fs::io::edit_locked(path, |content| {
        let mut source = SourceDocument::parse(content).map_err(|source| {
            tracing::error!(path = %path, error = %source, "refusing to edit malformed manifest");
            Error::MalformedSource {
                path: path.clone(),
                source,
            }
        })?;
        let value = edit(&mut source)?;
        let updated = source.is_modified().then(|| source.into_source());
        Ok::<_, Error>((value, updated))
    })?;
    if written {
        tracing::info!(path = %path, "updated manifest");
    }
    Ok((value, written))
}

fn check_name(name: &str) -> Result<()> {
    if name.contains(':') {
        return Err(Error::NamespacedToolsAttribute {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn merge_list(existing: &str, value: &str) -> String {
    if existing.split(',').map(str::trim).any(|item| item == value) {
        existing.to_string()
    } else if existing.trim().is_empty() {
        value.to_string()
    } else {
        format!("{existing},{value}")
    }
}

/// Prefix bound to `uri` on the root, declaring `preferred` (or the first
/// free `preferredN`) when there is none.
fn ensure_namespace(source: &mut SourceDocument, uri: &str, preferred: &str) -> Result<String> {
    let root = source.document().root();
    if let Some(prefix) = source.document().prefix_for_namespace(root, uri) {
        return Ok(prefix.to_string());
    }
    let mut prefix = preferred.to_string();
    let mut n = 2;
    while source.document().is_prefix_bound(root, &prefix) {
        prefix = format!("{preferred}{n}");
        n += 1;
    }
    source.declare_namespace(&prefix, uri)?;
    Ok(prefix)
}

fn create_segment(
    source: &mut SourceDocument,
    parent: ElementId,
    segment: &PathSegment,
) -> Result<ElementId> {
    let Some(name) = &segment.name else {
        return Ok(source.append_child(parent, &segment.tag, &[])?);
    };
    let prefix = ensure_namespace(source, ANDROID_URI, ANDROID_PREFIX)?;
    let attribute = format!("{prefix}:name");
    Ok(source.append_child(parent, &segment.tag, &[(attribute.as_str(), name.as_str())])?)
}
