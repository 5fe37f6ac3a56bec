//! Textual addresses for nodes
//!
//! `manifest/application/activity[.Main]@android:label` names the
//! `android:label` attribute of the activity whose `android:name` is
//! `.Main`. The same segments describe the ancestor chain the tools editor
//! walks.

use crate::{Error, Result};
use manifest_xml::ns::ANDROID_URI;
use manifest_xml::{Document, ElementId, NodeRef};

/// One step from the root: a tag and, when present, its `android:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub tag: String,
    pub name: Option<String>,
}

impl PathSegment {
    pub fn of(document: &Document, element: ElementId) -> Self {
        Self {
            tag: document.tag_name(element).to_string(),
            name: document
                .attribute_value(element, ANDROID_URI, "name")
                .map(str::to_string),
        }
    }

    /// Same tag, and same `android:name` when this segment has one.
    pub fn matches(&self, document: &Document, element: ElementId) -> bool {
        document.tag_name(element) == self.tag
            && self.name.as_deref().is_none_or(|name| {
                document.attribute_value(element, ANDROID_URI, "name") == Some(name)
            })
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}[{}]", self.tag, name),
            None => f.write_str(&self.tag),
        }
    }
}

/// Segments from the root down to and including `element`.
pub fn ancestor_chain(document: &Document, element: ElementId) -> Vec<PathSegment> {
    let mut chain = Vec::new();
    let mut current = Some(element);
    while let Some(id) = current {
        chain.push(PathSegment::of(document, id));
        current = document.parent(id);
    }
    chain.reverse();
    chain
}

/// A parsed node address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    pub segments: Vec<PathSegment>,
    pub attribute: Option<String>,
}

impl NodePath {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidNodePath {
            path: text.to_string(),
            reason: reason.to_string(),
        };

        let (elements, attribute) = match text.split_once('@') {
            Some((_, "")) => return Err(invalid("empty attribute name")),
            Some((elements, attribute)) => (elements, Some(attribute.to_string())),
            None => (text, None),
        };

        let mut segments = Vec::new();
        for raw in elements.split('/') {
            if raw.is_empty() {
                return Err(invalid("empty segment"));
            }
            let segment = match raw.split_once('[') {
                Some((tag, rest)) => {
                    let name = rest
                        .strip_suffix(']')
                        .ok_or_else(|| invalid("unterminated '['"))?;
                    if tag.is_empty() || name.is_empty() {
                        return Err(invalid("empty tag or name"));
                    }
                    PathSegment {
                        tag: tag.to_string(),
                        name: Some(name.to_string()),
                    }
                }
                None => PathSegment {
                    tag: raw.to_string(),
                    name: None,
                },
            };
            segments.push(segment);
        }

        Ok(Self {
            segments,
            attribute,
        })
    }

    /// The path of an existing node.
    pub fn of(document: &Document, node: NodeRef) -> Self {
        let segments = ancestor_chain(document, node.owner());
        let attribute = match node {
            NodeRef::Attribute(id) => Some(document.attribute(id).name().to_string()),
            NodeRef::Element(_) => None,
        };
        Self {
            segments,
            attribute,
        }
    }

    /// Find the node this path names. Each segment takes the first
    /// matching child.
    pub fn resolve(&self, document: &Document) -> Result<NodeRef> {
        let not_found = || Error::NodeNotFound {
            path: self.to_string(),
        };
        let (first, rest) = self.segments.split_first().ok_or_else(not_found)?;
        let root = document.root();
        if !first.matches(document, root) {
            return Err(not_found());
        }

        let mut current = root;
        for segment in rest {
            current = document
                .children(current)
                .iter()
                .copied()
                .find(|&child| segment.matches(document, child))
                .ok_or_else(not_found)?;
        }

        match &self.attribute {
            Some(name) => document
                .find_attribute_named(current, name)
                .map(NodeRef::Attribute)
                .ok_or_else(not_found),
            None => Ok(NodeRef::Element(current)),
        }
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, "@{attribute}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for NodePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
