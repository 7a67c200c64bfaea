//! Owned XML document tree
//!
//! Templates are parsed once into a [`Document`] and every composition works on
//! a clone, so the tree is a plain value type: elements own their children and
//! attribute order is preserved.
//!
//! Whitespace-only text between elements carries no meaning for the model
//! configurations handled here and is dropped when parsing; in a leaf element
//! it is the value and is kept. The writer adds its own indentation, which
//! makes parse → render → parse lossless.
//!
//! Documents are held and written as UTF-8. Files in another encoding are
//! decoded on load and their declaration is rewritten to `UTF-8`.
//!
//! # Example
//!
//! ```rust
//! use ssp_ensemble::xml::{Document, NodePath, RenderOptions};
//!
//! let doc = Document::parse_str(
//!     r#"<Configuration><Strings><Value name="scenarioName">x</Value></Strings></Configuration>"#,
//! )
//! .unwrap();
//!
//! let path: NodePath = "Strings/Value[@name='scenarioName']".parse().unwrap();
//! assert_eq!(path.resolve(&doc.root).unwrap().text(), "x");
//!
//! let text = doc.render(&RenderOptions::compact()).unwrap();
//! assert!(text.starts_with("<Configuration>"));
//! ```

mod path;
mod reader;
mod writer;

use std::path::Path;

use crate::error::EnsembleError;

pub use path::NodePath;
pub use writer::RenderOptions;

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The `<?xml ...?>` declaration, if the source had one
    pub declaration: Option<Declaration>,
    /// The single root element
    pub root: Element,
}

/// Contents of an XML declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Document {
    /// Create a document around a root element, without a declaration
    pub fn new(root: Element) -> Self {
        Self {
            declaration: None,
            root,
        }
    }

    /// Parse a document held in memory
    pub fn parse_str(xml: &str) -> Result<Self, EnsembleError> {
        reader::parse_document(xml, Path::new("<memory>"))
    }

    /// Parse a document, attributing errors to `origin`
    pub fn parse_with_origin(xml: &str, origin: &Path) -> Result<Self, EnsembleError> {
        reader::parse_document(xml, origin)
    }

    /// Read and parse a file in the encoding named by its BOM or declaration
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EnsembleError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| EnsembleError::read(path, e))?;
        let content = reader::decode(&bytes, path)?;
        reader::parse_document(&content, path)
    }

    /// Render the document to text
    pub fn render(&self, options: &RenderOptions) -> Result<String, EnsembleError> {
        writer::render_document(self, options)
    }
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Get an attribute value
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Concatenated text content of the direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace the direct text content, keeping element and comment children
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.retain(|node| !matches!(node, Node::Text(_)));
        if !text.is_empty() {
            self.children.insert(0, Node::Text(text));
        }
    }

    /// Iterate over the child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Iterate over the child elements mutably
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Identity used when merging fragments: tag name plus the `name` attribute
    pub fn merge_key(&self) -> (&str, Option<&str>) {
        (self.name.as_str(), self.attr("name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_text_keeps_structure() {
        let mut element = Element::new("Value")
            .with_attr("name", "scenarioName")
            .with_child(Element::new("nested"));
        element.set_text("SSP1_2p6");
        element.set_text("SSP2_4p5");

        assert_eq!(element.text(), "SSP2_4p5");
        assert_eq!(element.elements().count(), 1);
        assert_eq!(element.children.len(), 2);
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut element = Element::new("socioeconomics")
            .with_attr("ssp", "1")
            .with_attr("source", "iiasa");
        element.set_attr("ssp", "2");

        assert_eq!(
            element.attributes,
            vec![
                ("ssp".to_string(), "2".to_string()),
                ("source".to_string(), "iiasa".to_string())
            ]
        );
    }

    #[test]
    fn test_merge_key_uses_name_attribute() {
        let value = Element::new("Value").with_attr("name", "socioeconomics");
        assert_eq!(value.merge_key(), ("Value", Some("socioeconomics")));

        let bare = Element::new("socioeconomics");
        assert_eq!(bare.merge_key(), ("socioeconomics", None));
    }
}
