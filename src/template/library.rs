//! SSP component fragments
//!
//! Each SSP component file holds the scenario components specific to one
//! pathway, e.g.
//!
//! ```xml
//! <FileSet>
//!     <!-- Socioeconomics -->
//!     <Value name="socioeconomics">../input/gcamdata/xml/socioeconomics_SSP2.xml</Value>
//!     <Value name="land2">../input/gcamdata/xml/land_input_2_SSP2.xml</Value>
//! </FileSet>
//! ```
//!
//! The element and comment children of the root form the fragment that is
//! merged into every scenario of that SSP.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::EnsembleError;
use crate::scenario::Ssp;
use crate::xml::{Document, Element, Node};

/// Default component file name; `{ssp}` is replaced by `SSP1`..`SSP5`
pub const DEFAULT_SSP_PATTERN: &str = "{ssp}_config.xml";

/// The nodes contributed by one SSP component file
#[derive(Debug, Clone, PartialEq)]
pub struct SspFragment {
    ssp: Ssp,
    source: Option<PathBuf>,
    nodes: Vec<Node>,
}

impl SspFragment {
    /// Take the element and comment children of a component document's root
    pub fn from_document(ssp: Ssp, document: Document) -> Self {
        let nodes = document
            .root
            .children
            .into_iter()
            .filter(|node| !matches!(node, Node::Text(_)))
            .collect();
        Self {
            ssp,
            source: None,
            nodes,
        }
    }

    /// Load a component file
    pub fn from_file(ssp: Ssp, path: impl AsRef<Path>) -> Result<Self, EnsembleError> {
        let path = path.as_ref();
        let document = Document::from_file(path)?;
        let mut fragment = Self::from_document(ssp, document);
        fragment.source = Some(path.to_path_buf());
        Ok(fragment)
    }

    pub fn ssp(&self) -> Ssp {
        self.ssp
    }

    /// File the fragment was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Nodes to merge, in document order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The fragment's elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// `(name, value)` of every named element with text, e.g. component files
    pub fn components(&self) -> Vec<(&str, &str)> {
        self.elements()
            .filter_map(|element| {
                let name = element.attr("name")?;
                let value = element
                    .children
                    .iter()
                    .find_map(|node| match node {
                        Node::Text(text) => Some(text.trim()),
                        _ => None,
                    })?;
                Some((name, value))
            })
            .collect()
    }
}

/// Fragments keyed by SSP
#[derive(Debug, Clone, Default)]
pub struct SspLibrary {
    fragments: BTreeMap<Ssp, SspFragment>,
}

impl SspLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one component file per requested SSP from `dir`
    pub fn from_dir(dir: &Path, pattern: &str, ssps: &[Ssp]) -> Result<Self, EnsembleError> {
        let mut library = Self::new();
        library.load_dir(dir, pattern, ssps)?;
        Ok(library)
    }

    /// Load one component file per requested SSP into this library
    ///
    /// Every requested file must exist: a missing one is a `NotFound` error.
    pub fn load_dir(
        &mut self,
        dir: &Path,
        pattern: &str,
        ssps: &[Ssp],
    ) -> Result<(), EnsembleError> {
        if !pattern.contains("{ssp}") {
            return Err(EnsembleError::Config(format!(
                "SSP file pattern '{}' must contain '{{ssp}}'",
                pattern
            )));
        }
        if !dir.is_dir() {
            return Err(EnsembleError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        for &ssp in ssps {
            let path = dir.join(pattern.replace("{ssp}", &ssp.to_string()));
            self.load_file(ssp, &path)?;
        }

        Ok(())
    }

    /// Load a single component file for `ssp`, replacing any earlier one
    pub fn load_file(&mut self, ssp: Ssp, path: &Path) -> Result<(), EnsembleError> {
        let fragment = SspFragment::from_file(ssp, path)?;
        tracing::info!(
            "Extracted {} components for {} from {}",
            fragment.nodes().len(),
            ssp,
            path.display()
        );
        self.insert(fragment);
        Ok(())
    }

    /// Add a fragment to the library
    pub fn insert(&mut self, fragment: SspFragment) {
        self.fragments.insert(fragment.ssp(), fragment);
    }

    /// Get the fragment for an SSP
    pub fn get(&self, ssp: Ssp) -> Option<&SspFragment> {
        self.fragments.get(&ssp)
    }

    /// Get the fragment for an SSP, failing with a `Merge` error
    pub fn require(&self, ssp: Ssp) -> Result<&SspFragment, EnsembleError> {
        self.get(ssp).ok_or_else(|| EnsembleError::Merge {
            ssp: ssp.to_string(),
        })
    }

    /// Check if a fragment is loaded
    pub fn contains(&self, ssp: Ssp) -> bool {
        self.fragments.contains_key(&ssp)
    }

    /// Loaded SSPs in ascending order
    pub fn list(&self) -> Vec<Ssp> {
        self.fragments.keys().copied().collect()
    }

    /// Get the number of fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if the library is empty
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
