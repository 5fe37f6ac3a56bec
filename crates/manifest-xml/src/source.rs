//! Format-preserving editing of a real manifest source
//!
//! Every change is a text [`Edit`] spliced into the current source, after
//! which the document is re-parsed. Element ids of elements that precede an
//! edit point stay valid; ids after an inserted element shift, so callers
//! should re-derive handles from the returned ids rather than cache them.

use crate::document::Document;
use crate::edit::Edit;
use crate::error::{Error, Result};
use crate::node::ElementId;
use quick_xml::escape::escape;

/// Indentation used for a first child when the parent has none to copy.
const INDENT_UNIT: &str = "    ";

/// An editable manifest that tracks the edits applied to it.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    original: String,
    document: Document,
    edits: Vec<Edit>,
}

impl SourceDocument {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self {
            original: source.to_string(),
            document: Document::parse(source)?,
            edits: Vec::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn source(&self) -> &str {
        self.document.source()
    }

    /// Check if the source differs from what was parsed.
    pub fn is_modified(&self) -> bool {
        self.document.source() != self.original
    }

    /// Edits applied so far, each relative to the text before it.
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn into_source(self) -> String {
        self.document.into_source()
    }

    fn apply(&mut self, edit: Edit) -> Result<()> {
        let updated = edit.apply(self.document.source());
        self.document = Document::parse(updated)?;
        tracing::trace!(span = ?edit.span, content = %edit.new_content, "applied source edit");
        self.edits.push(edit);
        Ok(())
    }

    fn newline(&self) -> &'static str {
        if self.source().contains("\r\n") { "\r\n" } else { "\n" }
    }

    /// Whitespace between the start of the line and `offset`, or `None` when
    /// something other than whitespace precedes it.
    fn indent_before(&self, offset: usize) -> Option<String> {
        let line_start = self.document.line_start(offset);
        let prefix = &self.source()[line_start..offset];
        prefix
            .chars()
            .all(|c| c == ' ' || c == '\t')
            .then(|| prefix.to_string())
    }

    /// Set `name` (qualified as written) to `value` on `element`.
    ///
    /// An existing attribute keeps its position and quotes; a new one is
    /// appended after the last attribute, on its own line when the element
    /// already lays its attributes out one per line. Returns whether the
    /// source changed.
    pub fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> Result<bool> {
        let edit = {
            let el = self.document.element(element);
            match el.attributes().iter().find(|attr| attr.name() == name) {
                Some(existing) if existing.value() == value => return Ok(false),
                Some(existing) => {
                    let span = existing.value_span();
                    let old = self.source()[span.clone()].to_string();
                    Edit::replace(span, old, escape(value).into_owned())
                }
                None => {
                    let separator = self.attribute_separator(element);
                    Edit::insert(
                        el.attributes_end(),
                        format!("{separator}{name}=\"{}\"", escape(value)),
                    )
                }
            }
        };
        self.apply(edit)?;
        Ok(true)
    }

    fn attribute_separator(&self, element: ElementId) -> String {
        let el = self.document.element(element);
        let Some(last) = el.attributes().last() else {
            return " ".to_string();
        };
        let attr_start = last.span().start;
        if self.document.line_of(attr_start) == self.document.line_of(el.span().start) {
            return " ".to_string();
        }
        match self.indent_before(attr_start) {
            Some(indent) => format!("{}{indent}", self.newline()),
            None => " ".to_string(),
        }
    }

    /// Bind `prefix` to `uri` on the root element.
    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) -> Result<bool> {
        let root = self.document.root();
        self.set_attribute(root, &format!("xmlns:{prefix}"), uri)
    }

    /// Append `<tag attr="value" ... />` as the last child of `parent` and
    /// return the new element's id.
    ///
    /// A self-closing parent is expanded into a start/end tag pair.
    pub fn append_child(
        &mut self,
        parent: ElementId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<ElementId> {
        let (edit, child_start) = {
            let nl = self.newline();
            let el = self.document.element(parent);
            let parent_indent = self.indent_before(el.span().start).unwrap_or_default();
            let child_indent = el
                .children()
                .first()
                .and_then(|&first| self.indent_before(self.document.element(first).span().start))
                .filter(|indent| !indent.is_empty())
                .unwrap_or_else(|| format!("{parent_indent}{INDENT_UNIT}"));

            let mut tag_text = format!("<{tag}");
            for (name, value) in attributes {
                tag_text.push_str(&format!(" {name}=\"{}\"", escape(*value)));
            }
            tag_text.push_str(" />");

            match el.end_tag() {
                None => {
                    let span = el.attributes_end()..el.start_tag().end;
                    let old = self.source()[span.clone()].to_string();
                    let lead = format!(">{nl}{child_indent}");
                    let text = format!("{lead}{tag_text}{nl}{parent_indent}</{}>", el.name());
                    (Edit::replace(span.clone(), old, text), span.start + lead.len())
                }
                Some(end_tag) => {
                    let line_start = self.document.line_start(end_tag.start);
                    let own_line = line_start > el.start_tag().end
                        && self.indent_before(end_tag.start).is_some();
                    if own_line {
                        let text = format!("{child_indent}{tag_text}{nl}");
                        (Edit::insert(line_start, text), line_start + child_indent.len())
                    } else {
                        let lead = format!("{nl}{child_indent}");
                        let text = format!("{lead}{tag_text}{nl}{parent_indent}");
                        (Edit::insert(end_tag.start, text), end_tag.start + lead.len())
                    }
                }
            }
        };

        self.apply(edit)?;
        self.document
            .element_starting_at(child_start)
            .ok_or(Error::EditLostElement {
                offset: child_start,
            })
    }
}
