//! Template loading
//!
//! The base template and the SSP component files are parsed once and never
//! mutated afterwards; composition clones the base document per scenario.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ssp_ensemble::scenario::Ssp;
//! use ssp_ensemble::template::{SspLibrary, Template};
//!
//! let template = Template::from_file("configuration_reuse100.xml")?;
//! let library = SspLibrary::from_dir(Path::new("./ssp"), "{ssp}_config.xml", Ssp::ALL)?;
//! assert_eq!(library.len(), 5);
//! # Ok::<(), ssp_ensemble::EnsembleError>(())
//! ```

mod library;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::compose::FieldMap;
use crate::error::EnsembleError;
use crate::xml::Document;

pub use library::{SspFragment, SspLibrary, DEFAULT_SSP_PATTERN};

/// The base configuration every scenario starts from
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: Option<PathBuf>,
    document: Document,
}

impl Template {
    /// Wrap an already parsed document
    pub fn new(document: Document) -> Self {
        Self {
            source: None,
            document,
        }
    }

    /// Load and parse the base template
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EnsembleError> {
        let path = path.as_ref();
        let document = Document::from_file(path)?;
        tracing::info!("Loaded base template {}", path.display());
        Ok(Self {
            source: Some(path.to_path_buf()),
            document,
        })
    }

    /// The parsed template
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// File the template was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Check that every configured substitution point exists
    pub fn validate(&self, fields: &FieldMap) -> Result<(), EnsembleError> {
        fields.check(&self.document.root)
    }

    /// A fresh copy of the template for one scenario
    pub fn instantiate(&self) -> Document {
        self.document.clone()
    }
}

impl FromStr for Template {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Document::parse_str(s).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GCAM_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Configuration>
    <Files>
        <Value name="xmldb-location">../output/database_basexdb</Value>
        <Value name="policy-target-file">../input/policy/policy_target.xml</Value>
    </Files>
    <Strings>
        <Value name="scenarioName">Reference</Value>
    </Strings>
    <ScenarioComponents>
        <Value name="energy">../input/energy.xml</Value>
    </ScenarioComponents>
</Configuration>"#;

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GCAM_TEMPLATE.as_bytes()).unwrap();

        let template = Template::from_file(file.path()).unwrap();
        assert_eq!(template.source(), Some(file.path()));
        assert_eq!(template.document().root.name, "Configuration");
        assert!(template.validate(&FieldMap::default()).is_ok());
    }

    #[test]
    fn test_missing_and_malformed() {
        let missing = Template::from_file("/nonexistent/configuration.xml");
        assert!(matches!(missing, Err(EnsembleError::NotFound { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<Configuration><Files></Configuration>")
            .unwrap();
        let malformed = Template::from_file(file.path());
        assert!(matches!(malformed, Err(EnsembleError::Parse { .. })));
    }

    #[test]
    fn test_from_file_latin1() {
        let latin1 = GCAM_TEMPLATE
            .replace("UTF-8", "ISO-8859-1")
            .replace("Reference", "R\u{e9}f\u{e9}rence");
        // Every character of the template is below U+0100, so one byte each
        let bytes: Vec<u8> = latin1.chars().map(|c| c as u8).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let template = Template::from_file(file.path()).unwrap();
        let document = template.document();
        let name: crate::xml::NodePath = "Strings/Value[@name='scenarioName']".parse().unwrap();
        assert_eq!(
            name.resolve(&document.root).unwrap().text(),
            "R\u{e9}f\u{e9}rence"
        );
        assert_eq!(
            document.declaration.as_ref().unwrap().encoding.as_deref(),
            Some("UTF-8")
        );
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let template: Template = "<Configuration><ScenarioComponents/></Configuration>"
            .parse()
            .unwrap();
        let result = template.validate(&FieldMap::default());
        assert!(matches!(result, Err(EnsembleError::MissingField { .. })));
    }

    #[test]
    fn test_instantiate_is_independent() {
        let template: Template = GCAM_TEMPLATE.parse().unwrap();
        let mut copy = template.instantiate();
        copy.root.children.clear();
        assert_eq!(template.document().root.elements().count(), 3);
    }
}
