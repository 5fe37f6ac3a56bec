//! Span-based text edits

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The kind of edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Insert new content at a zero-width span.
    Insert,
    /// Replace existing content.
    Replace,
}

/// An edit on document text, applied against the text it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub kind: EditKind,
    /// Byte span in the pre-edit text.
    pub span: Range<usize>,
    pub old_content: String,
    pub new_content: String,
}

impl Edit {
    pub fn insert(at: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            span: at..at,
            old_content: String::new(),
            new_content: content.into(),
        }
    }

    pub fn replace(span: Range<usize>, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Replace,
            span,
            old_content: old.into(),
            new_content: new.into(),
        }
    }

    /// Apply to `source`, returning the edited text.
    pub fn apply(&self, source: &str) -> String {
        let mut result = String::with_capacity(source.len() + self.new_content.len());
        result.push_str(&source[..self.span.start]);
        result.push_str(&self.new_content);
        result.push_str(&source[self.span.end..]);
        result
    }
}
