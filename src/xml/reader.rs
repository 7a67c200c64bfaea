//! quick-xml event stream → [`Document`]

use std::borrow::Cow;
use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;

use super::{Declaration, Document, Element, Node};
use crate::error::EnsembleError;

/// Decode raw file contents to text using the BOM or the declared encoding
///
/// Without either the contents must be UTF-8.
pub(super) fn decode(bytes: &[u8], origin: &Path) -> Result<String, EnsembleError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    // Reading the first event settles the encoding; syntax errors are
    // reported by the parse that follows
    let _ = reader.read_event_into(&mut buf);

    let decoder = reader.decoder();
    let text = decoder.decode(bytes).map_err(|e| {
        EnsembleError::parse(
            origin,
            format!("content is not valid {}: {}", decoder.encoding().name(), e),
        )
    })?;

    let text: &str = &text;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

pub(super) fn parse_document(xml: &str, origin: &Path) -> Result<Document, EnsembleError> {
    let mut reader = Reader::from_str(xml);
    let decoder = reader.decoder();
    let mut declaration = None;
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            EnsembleError::parse(
                origin,
                format!("{} (at byte {})", e, reader.error_position()),
            )
        })?;

        match event {
            Event::Decl(decl) => {
                if root.is_some() || !stack.is_empty() {
                    return Err(EnsembleError::parse(
                        origin,
                        "XML declaration must precede the root element",
                    ));
                }
                declaration = Some(read_declaration(&decl, origin)?);
            }
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(multiple_roots(origin));
                }
                stack.push(open_element(&start, decoder, origin)?);
            }
            Event::Empty(start) => {
                let element = open_element(&start, decoder, origin)?;
                attach(element, &mut stack, &mut root, origin)?;
            }
            Event::End(end) => {
                let mut element = stack.pop().ok_or_else(|| {
                    EnsembleError::parse(
                        origin,
                        format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        ),
                    )
                })?;
                drop_layout_text(&mut element);
                attach(element, &mut stack, &mut root, origin)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| xml_error(origin, e))?;
                push_text(value, &mut stack, origin)?;
            }
            Event::CData(data) => {
                let value = utf8(&data.into_inner(), origin)?;
                push_text(Cow::Owned(value), &mut stack, origin)?;
            }
            Event::Comment(comment) => {
                // Comments outside the root element are not kept
                if let Some(parent) = stack.last_mut() {
                    let value = utf8(&comment, origin)?;
                    parent.children.push(Node::Comment(value));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(EnsembleError::parse(
            origin,
            format!("unclosed element <{}>", open.name),
        ));
    }

    let root = root.ok_or_else(|| EnsembleError::parse(origin, "document has no root element"))?;

    Ok(Document { declaration, root })
}

fn open_element(
    start: &BytesStart,
    decoder: Decoder,
    origin: &Path,
) -> Result<Element, EnsembleError> {
    let mut element = Element::new(utf8(start.name().as_ref(), origin)?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(origin, e))?;
        let key = utf8(attribute.key.as_ref(), origin)?;
        let value = attribute
            .decode_and_unescape_value(decoder)
            .map_err(|e| xml_error(origin, e))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

/// Attach a completed element to its parent, or make it the root
fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    origin: &Path,
) -> Result<(), EnsembleError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => return Err(multiple_roots(origin)),
        None => *root = Some(element),
    }
    Ok(())
}

/// Drop whitespace-only text next to child elements or comments
///
/// Such text is indentation. In a leaf element it is the value and is kept.
fn drop_layout_text(element: &mut Element) {
    let structured = element
        .children
        .iter()
        .any(|node| !matches!(node, Node::Text(_)));
    if structured {
        element
            .children
            .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
    }
}

fn push_text(
    value: Cow<'_, str>,
    stack: &mut [Element],
    origin: &Path,
) -> Result<(), EnsembleError> {
    match stack.last_mut() {
        Some(parent) => {
            // Adjacent text and CDATA sections collapse into one node
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(&value);
            } else {
                parent.children.push(Node::Text(value.into_owned()));
            }
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(EnsembleError::parse(
            origin,
            format!("text outside the root element: '{}'", value.trim()),
        )),
    }
}

fn read_declaration(decl: &BytesDecl, origin: &Path) -> Result<Declaration, EnsembleError> {
    let version = decl.version().map_err(|e| xml_error(origin, e))?;
    let encoding = match decl.encoding() {
        Some(value) => Some(utf8(&value.map_err(|e| xml_error(origin, e))?, origin)?),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(value) => Some(utf8(&value.map_err(|e| xml_error(origin, e))?, origin)?),
        None => None,
    };

    // Documents are held and written as UTF-8
    let encoding = encoding.map(|declared| {
        if declared.eq_ignore_ascii_case("utf-8") {
            return declared;
        }
        tracing::debug!(
            "{}: declared encoding {} is written as UTF-8",
            origin.display(),
            declared
        );
        "UTF-8".to_string()
    });

    Ok(Declaration {
        version: utf8(&version, origin)?,
        encoding,
        standalone,
    })
}

fn utf8(bytes: &[u8], origin: &Path) -> Result<String, EnsembleError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| xml_error(origin, e))
}

fn xml_error(origin: &Path, err: impl std::fmt::Display) -> EnsembleError {
    EnsembleError::parse(origin, err.to_string())
}

fn multiple_roots(origin: &Path) -> EnsembleError {
    EnsembleError::parse(origin, "document has more than one root element")
}
