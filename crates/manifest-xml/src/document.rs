//! Arena document with source spans

use crate::error::{Error, Result};
use crate::node::{AttributeId, ElementId, NodeRef};
use crate::ns::{XML_URI, XMLNS_URI};
use crate::position::{LineIndex, SourcePosition};
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::ops::Range;

/// One attribute as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    namespace: Option<String>,
    value: String,
    span: Range<usize>,
    value_span: Range<usize>,
}

impl Attribute {
    /// Qualified name as written, e.g. `android:name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Resolved namespace URI. `None` for unprefixed attributes and for
    /// prefixes with no declaration in scope.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Unescaped value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Byte span of `name="value"`.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Byte span of the raw value between the quotes.
    pub fn value_span(&self) -> Range<usize> {
        self.value_span.clone()
    }

    /// `xmlns` or `xmlns:*`.
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }

    fn matches(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local
    }
}

/// One element and its place in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    span: Range<usize>,
    start_tag: Range<usize>,
    end_tag: Option<Range<usize>>,
    attributes_end: usize,
}

impl Element {
    /// Tag name as written, including any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Byte span from `<` through the end tag (or `/>`).
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn start_tag(&self) -> Range<usize> {
        self.start_tag.clone()
    }

    /// `None` for self-closing elements.
    pub fn end_tag(&self) -> Option<Range<usize>> {
        self.end_tag.clone()
    }

    /// Offset just past the tag name or the last attribute; new attributes
    /// are inserted here.
    pub fn attributes_end(&self) -> usize {
        self.attributes_end
    }

    pub fn is_self_closing(&self) -> bool {
        self.end_tag.is_none()
    }
}

/// A parsed XML document that remembers where everything came from.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    elements: Vec<Element>,
    lines: LineIndex,
}

impl Document {
    /// Parse a complete document. Prolog, comments, processing instructions
    /// and text are skipped; exactly one root element is required.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let lines = LineIndex::new(&source);
        let elements = Parser::new(&source, &lines).run()?;
        if elements.is_empty() {
            return Err(Error::NoRootElement);
        }
        Ok(Self {
            source,
            elements,
            lines,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this document.
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this document.
    pub fn attribute(&self, id: AttributeId) -> &Attribute {
        &self.element(id.element).attributes[id.index]
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len()).map(ElementId)
    }

    /// Attribute ids of `element`, in source order.
    pub fn attribute_ids(&self, element: ElementId) -> impl Iterator<Item = AttributeId> + '_ {
        (0..self.element(element).attributes.len()).map(move |index| AttributeId { element, index })
    }

    pub fn tag_name(&self, id: ElementId) -> &str {
        self.element(id).name()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.element(id).children
    }

    pub fn find_attribute(
        &self,
        element: ElementId,
        namespace: &str,
        local: &str,
    ) -> Option<AttributeId> {
        self.element(element)
            .attributes
            .iter()
            .position(|attr| attr.matches(namespace, local))
            .map(|index| AttributeId { element, index })
    }

    /// Value of the attribute in `namespace` with local name `local`.
    pub fn attribute_value(
        &self,
        element: ElementId,
        namespace: &str,
        local: &str,
    ) -> Option<&str> {
        self.find_attribute(element, namespace, local)
            .map(|id| self.attribute(id).value())
    }

    /// Look an attribute up by its qualified name as written.
    pub fn find_attribute_named(&self, element: ElementId, name: &str) -> Option<AttributeId> {
        self.element(element)
            .attributes
            .iter()
            .position(|attr| attr.name == name)
            .map(|index| AttributeId { element, index })
    }

    /// Prefix bound to `uri` at `element`, searching outwards to the root.
    /// The innermost declaration wins.
    pub fn prefix_for_namespace(&self, element: ElementId, uri: &str) -> Option<&str> {
        let mut current = Some(element);
        while let Some(id) = current {
            let el = self.element(id);
            let declared = el
                .attributes
                .iter()
                .filter(|attr| attr.value == uri)
                .find_map(|attr| attr.name.strip_prefix("xmlns:"));
            if declared.is_some() {
                return declared;
            }
            current = el.parent;
        }
        None
    }

    /// True when some element in scope of `element` already binds `prefix`.
    pub fn is_prefix_bound(&self, element: ElementId, prefix: &str) -> bool {
        let declaration = format!("xmlns:{prefix}");
        let mut current = Some(element);
        while let Some(id) = current {
            if self.find_attribute_named(id, &declaration).is_some() {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Position of an element's whole span.
    pub fn position(&self, id: ElementId) -> SourcePosition {
        self.span_position(self.element(id).span())
    }

    pub fn node_position(&self, node: NodeRef) -> SourcePosition {
        match node {
            NodeRef::Element(id) => self.position(id),
            NodeRef::Attribute(id) => self.span_position(self.attribute(id).span()),
        }
    }

    fn span_position(&self, span: Range<usize>) -> SourcePosition {
        SourcePosition::range(
            self.lines.line_column(&self.source, span.start),
            self.lines.line_column(&self.source, span.end),
        )
    }

    /// Byte offset of a 1-based line/column.
    pub fn offset_of(&self, line: usize, column: usize) -> Option<usize> {
        self.lines.offset(&self.source, line, column)
    }

    /// Byte offset of the first character on the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        self.lines.line_start(offset)
    }

    /// 0-based line number of `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.lines.line_of(offset)
    }

    /// Innermost element whose span contains `line:column`.
    pub fn element_at(&self, line: usize, column: usize) -> Option<ElementId> {
        let offset = self.offset_of(line, column)?;
        let root = self.root();
        if !self.element(root).span.contains(&offset) {
            return None;
        }
        let mut current = root;
        while let Some(&child) = self
            .children(current)
            .iter()
            .find(|&&child| self.element(child).span.contains(&offset))
        {
            current = child;
        }
        Some(current)
    }

    /// Innermost node at `line:column`: an attribute when the position falls
    /// on one, otherwise the enclosing element.
    pub fn node_at(&self, line: usize, column: usize) -> Option<NodeRef> {
        let element = self.element_at(line, column)?;
        let offset = self.offset_of(line, column)?;
        let attribute = self
            .attribute_ids(element)
            .find(|&id| self.attribute(id).span.contains(&offset));
        Some(attribute.map_or(NodeRef::Element(element), NodeRef::Attribute))
    }

    /// Element whose `<` sits exactly at `offset`.
    pub fn element_starting_at(&self, offset: usize) -> Option<ElementId> {
        self.elements().find(|&id| self.element(id).span.start == offset)
    }
}

struct RawAttribute {
    name: Range<usize>,
    value: Range<usize>,
    span: Range<usize>,
}

struct StartTag {
    name: Range<usize>,
    attributes: Vec<RawAttribute>,
    attributes_end: usize,
}

struct Parser<'a> {
    source: &'a str,
    lines: &'a LineIndex,
    elements: Vec<Element>,
    open: Vec<ElementId>,
    // (prefix, uri) declared per open element; "" is the default namespace
    scopes: Vec<Vec<(String, String)>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, lines: &'a LineIndex) -> Self {
        Self {
            source,
            lines,
            elements: Vec::new(),
            open: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Element>> {
        let mut reader = Reader::from_str(self.source);
        loop {
            let start = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| self.syntax_error(reader.buffer_position() as usize, e.to_string()))?;
            let end = reader.buffer_position() as usize;
            match event {
                Event::Start(_) => self.open_element(start..end, false)?,
                Event::Empty(_) => self.open_element(start..end, true)?,
                Event::End(_) => self.close_element(start..end)?,
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&id) = self.open.last() {
            let el = &self.elements[id.0];
            let (line, column) = self.lines.line_column(self.source, el.span.start);
            return Err(Error::Unclosed {
                name: el.name.clone(),
                line,
                column,
            });
        }
        Ok(self.elements)
    }

    fn syntax_error(&self, offset: usize, message: impl Into<String>) -> Error {
        let (line, column) = self.lines.line_column(self.source, offset.min(self.source.len()));
        Error::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn open_element(&mut self, tag: Range<usize>, self_closing: bool) -> Result<()> {
        let scanned = scan_start_tag(&self.source[tag.clone()], tag.start)
            .map_err(|(offset, message)| self.syntax_error(offset, message))?;
        let name = self.source[scanned.name.clone()].to_string();

        let parent = self.open.last().copied();
        if parent.is_none() && !self.elements.is_empty() {
            let (line, column) = self.lines.line_column(self.source, tag.start);
            return Err(Error::MultipleRoots { name, line, column });
        }

        let mut values = Vec::with_capacity(scanned.attributes.len());
        for raw in &scanned.attributes {
            let value = unescape(&self.source[raw.value.clone()])
                .map_err(|e| self.syntax_error(raw.value.start, e.to_string()))?;
            values.push(value.into_owned());
        }

        let declarations = scanned
            .attributes
            .iter()
            .zip(&values)
            .filter_map(|(raw, value)| {
                let attr_name = &self.source[raw.name.clone()];
                if attr_name == "xmlns" {
                    Some((String::new(), value.clone()))
                } else {
                    attr_name
                        .strip_prefix("xmlns:")
                        .map(|prefix| (prefix.to_string(), value.clone()))
                }
            })
            .collect();
        self.scopes.push(declarations);

        let attributes = scanned
            .attributes
            .into_iter()
            .zip(values)
            .map(|(raw, value)| {
                let attr_name = self.source[raw.name.clone()].to_string();
                let namespace = self.attribute_namespace(&attr_name);
                Attribute {
                    name: attr_name,
                    namespace,
                    value,
                    span: raw.span,
                    value_span: raw.value,
                }
            })
            .collect();

        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            name,
            attributes,
            children: Vec::new(),
            parent,
            span: tag.clone(),
            start_tag: tag,
            end_tag: None,
            attributes_end: scanned.attributes_end,
        });
        if let Some(parent) = parent {
            self.elements[parent.0].children.push(id);
        }

        if self_closing {
            self.scopes.pop();
        } else {
            self.open.push(id);
        }
        Ok(())
    }

    fn close_element(&mut self, tag: Range<usize>) -> Result<()> {
        let Some(id) = self.open.pop() else {
            return Err(self.syntax_error(tag.start, "end tag without matching start tag"));
        };
        self.scopes.pop();
        let el = &mut self.elements[id.0];
        el.span.end = tag.end;
        el.end_tag = Some(tag);
        Ok(())
    }

    fn attribute_namespace(&self, name: &str) -> Option<String> {
        if name == "xmlns" || name.starts_with("xmlns:") {
            return Some(XMLNS_URI.to_string());
        }
        let (prefix, _) = name.split_once(':')?;
        if prefix == "xml" {
            return Some(XML_URI.to_string());
        }
        let resolved = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(declared, _)| declared == prefix)
            .map(|(_, uri)| uri.clone());
        if resolved.is_none() {
            tracing::debug!(
                attribute = name,
                "attribute prefix has no namespace declaration in scope"
            );
        }
        resolved
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Split a raw start tag (`<name a="1" b='2'>` or `.../>`) into spans.
/// Offsets in the result are absolute (`base` added).
fn scan_start_tag(text: &str, base: usize) -> std::result::Result<StartTag, (usize, String)> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let stops_name = |b: u8| is_space(b) || b == b'>' || b == b'/' || b == b'=';

    let mut i = 1;
    while i < len && !stops_name(bytes[i]) {
        i += 1;
    }
    let name = base + 1..base + i;
    let mut attributes = Vec::new();
    let mut attributes_end = base + i;

    loop {
        while i < len && is_space(bytes[i]) {
            i += 1;
        }
        if i >= len || bytes[i] == b'>' || bytes[i] == b'/' {
            break;
        }

        let attr_start = i;
        while i < len && !stops_name(bytes[i]) {
            i += 1;
        }
        let name_end = i;
        while i < len && is_space(bytes[i]) {
            i += 1;
        }
        if i >= len || bytes[i] != b'=' {
            return Err((base + i, "expected '=' after attribute name".to_string()));
        }
        i += 1;
        while i < len && is_space(bytes[i]) {
            i += 1;
        }
        let quote = match bytes.get(i) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => return Err((base + i, "expected quoted attribute value".to_string())),
        };
        i += 1;
        let value_start = i;
        while i < len && bytes[i] != quote {
            i += 1;
        }
        if i >= len {
            return Err((base + value_start, "unterminated attribute value".to_string()));
        }
        let value_end = i;
        i += 1;

        attributes.push(RawAttribute {
            name: base + attr_start..base + name_end,
            value: base + value_start..base + value_end,
            span: base + attr_start..base + i,
        });
        attributes_end = base + i;
    }

    Ok(StartTag {
        name,
        attributes,
        attributes_end,
    })
}
