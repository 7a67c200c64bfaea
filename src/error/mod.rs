//! Error types for template loading, composition and output

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while generating an ensemble
#[derive(Debug, Error)]
pub enum EnsembleError {
    // ─────────────────────────────────────────────────────────────────────────
    // Input Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Input file does not exist
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Input file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML
    #[error("Invalid XML in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Composition Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// No fragment is loaded for the requested SSP
    #[error("No SSP fragment loaded for {ssp}")]
    Merge { ssp: String },

    /// The base template lacks an expected substitution point
    #[error("Template is missing the {field} node at '{path}'")]
    MissingField { field: String, path: String },

    /// A parameter value could not be parsed or is out of range
    #[error("Invalid {axis} value: '{value}'")]
    InvalidParameter { axis: String, value: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Output Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Filesystem failure while writing a configuration
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure rendering a document to text
    #[error("Failed to render XML: {0}")]
    Render(String),

    /// Failure exporting the run summary
    #[error("Failed to export run summary: {0}")]
    Summary(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Run Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid generator configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A batch run was aborted on the named scenario
    #[error("Generation aborted at {scenario}: {source}")]
    Scenario {
        scenario: String,
        #[source]
        source: Box<EnsembleError>,
    },
}

impl EnsembleError {
    /// Create a parse error for the given file
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            path: path.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(axis: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            axis: axis.into(),
            value: value.into(),
        }
    }

    /// Classify an I/O error raised while reading an input file
    pub fn read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Read { path, source }
        }
    }

    /// Create a write error
    pub fn write(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
