//! [`Document`] → text

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{Document, Element, Node};
use crate::error::EnsembleError;

/// Controls how documents are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Spaces per nesting level, or `None` for compact output
    pub indent: Option<usize>,
}

impl RenderOptions {
    /// Indented output with the given width
    pub fn indented(width: usize) -> Self {
        Self {
            indent: Some(width),
        }
    }

    /// Everything on one line
    pub fn compact() -> Self {
        Self { indent: None }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::indented(2)
    }
}

pub(super) fn render_document(
    doc: &Document,
    options: &RenderOptions,
) -> Result<String, EnsembleError> {
    let mut writer = Writer::new(Vec::new());

    if let Some(declaration) = &doc.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new(
                &declaration.version,
                declaration.encoding.as_deref(),
                declaration.standalone.as_deref(),
            )))
            .map_err(render_error)?;
        if options.indent.is_some() {
            writer.get_mut().push(b'\n');
        }
    }

    write_element(&mut writer, &doc.root, 0, options.indent)?;
    if options.indent.is_some() {
        writer.get_mut().push(b'\n');
    }

    String::from_utf8(writer.into_inner()).map_err(render_error)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    depth: usize,
    indent: Option<usize>,
) -> Result<(), EnsembleError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(render_error);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(render_error)?;

    // Mixed content is written inline so that its text is left untouched
    let has_text = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Text(_)));
    let block = if has_text { None } else { indent };

    for child in &element.children {
        if let Some(width) = block {
            line_break(writer, width * (depth + 1));
        }
        match child {
            Node::Element(child) => write_element(writer, child, depth + 1, block)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(render_error)?,
            Node::Comment(comment) => writer
                .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
                .map_err(render_error)?,
        }
    }

    if let Some(width) = block {
        line_break(writer, width * depth);
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(render_error)
}

fn line_break(writer: &mut Writer<Vec<u8>>, spaces: usize) {
    let buffer = writer.get_mut();
    buffer.push(b'\n');
    buffer.extend(std::iter::repeat(b' ').take(spaces));
}

fn render_error(err: impl std::fmt::Display) -> EnsembleError {
    EnsembleError::Render(err.to_string())
}
