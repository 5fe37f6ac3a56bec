//! Arena handles

use serde::{Deserialize, Serialize};

/// Index of an element inside one [`Document`](crate::Document).
///
/// Ids are assigned in document (pre-)order. They are only meaningful for the
/// document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An attribute, addressed by its owner and its position in the owner's
/// attribute list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeId {
    pub element: ElementId,
    pub index: usize,
}

/// Either kind of addressable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Element(ElementId),
    Attribute(AttributeId),
}

impl NodeRef {
    /// The element itself, or the attribute's owner.
    pub fn owner(self) -> ElementId {
        match self {
            Self::Element(id) => id,
            Self::Attribute(attr) => attr.element,
        }
    }
}

impl From<ElementId> for NodeRef {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

impl From<AttributeId> for NodeRef {
    fn from(id: AttributeId) -> Self {
        Self::Attribute(id)
    }
}
