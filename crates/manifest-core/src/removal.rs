//! What "remove this" means for a node
//!
//! Removing an element is `tools:node="remove"` on it. Removing an attribute
//! is `tools:remove="name"` on its owner, except where that would leave an
//! element without its identity, in which case the whole element goes.

use crate::location::SourceFilePosition;
use manifest_fs::NormalizedPath;
use manifest_xml::ns::ANDROID_URI;
use manifest_xml::{AttributeId, Document, ElementId, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalPlan {
    /// `tools:node="remove"` on the element.
    RemoveElement(ElementId),
    /// `tools:remove="<attribute>"` on the attribute's owner.
    RemoveAttribute(AttributeId),
}

impl RemovalPlan {
    /// The element that receives the tools attribute.
    pub fn target(self) -> ElementId {
        match self {
            Self::RemoveElement(id) => id,
            Self::RemoveAttribute(id) => id.element,
        }
    }
}

pub fn plan_removal(document: &Document, node: NodeRef) -> RemovalPlan {
    let id = match node {
        NodeRef::Element(id) => return RemovalPlan::RemoveElement(id),
        NodeRef::Attribute(id) => id,
    };

    let attribute = document.attribute(id);
    if attribute.namespace() == Some(ANDROID_URI) && attribute.local_name() == "name" {
        return RemovalPlan::RemoveElement(id.element);
    }

    let owner = document.element(id.element);
    let significant = owner
        .attributes()
        .iter()
        .filter(|attr| !attr.is_namespace_declaration())
        .count();
    if significant == 1 && owner.children().is_empty() {
        return RemovalPlan::RemoveElement(id.element);
    }
    RemovalPlan::RemoveAttribute(id)
}

/// True when `resolved` is non-empty and none of it points at `primary`.
///
/// A single record resolving to `primary` is enough to refuse: the primary
/// declares the node itself, so it has to be edited there.
pub fn can_remove(resolved: &[SourceFilePosition], primary: &NormalizedPath) -> bool {
    !resolved.is_empty()
        && resolved
            .iter()
            .all(|location| location.file.as_ref() != Some(primary))
}
