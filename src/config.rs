//! Generator configuration
//!
//! A run is described by a JSON document; every field is optional and falls
//! back to the GCAM defaults:
//!
//! ```json
//! {
//!     "template": "configuration_reuse100.xml",
//!     "sspDir": "./",
//!     "sspFilePattern": "{ssp}_config.xml",
//!     "space": {
//!         "ssps": ["SSP1", "SSP2", "SSP3", "SSP4", "SSP5"],
//!         "rcps": ["2p6", "4p5", "6p0", "Baseline"],
//!         "techs": ["Basic", "Tech"],
//!         "supplies": ["L", "H"],
//!         "allocations": ["Mkt", "Reg"],
//!         "rates": [0, 25, 50, 75, 100]
//!     },
//!     "output": { "sampleDir": "configs_sample", "ensembleDir": "configs_ensemble_complete", "sampleSize": 10 },
//!     "onError": "continue",
//!     "indent": 2
//! }
//! ```
//!
//! Relative paths in a configuration file are resolved against the directory
//! containing that file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compose::{FieldMap, Patterns};
use crate::error::EnsembleError;
use crate::scenario::ParameterSpace;
use crate::xml::RenderOptions;

/// What to do when one scenario fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the failure and move on to the next scenario
    #[default]
    Continue,
    /// Stop the run at the first failure
    Abort,
}

/// Which scenarios to generate and where
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// A small, evenly spread subset written to the sample directory
    #[default]
    Sample,
    /// The complete Cartesian product written to the ensemble directory
    Full,
}

impl FromStr for RunMode {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sample" => Ok(RunMode::Sample),
            "full" | "ensemble" => Ok(RunMode::Full),
            _ => Err(EnsembleError::invalid_param("run mode", s)),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Sample => f.write_str("sample"),
            RunMode::Full => f.write_str("full"),
        }
    }
}

/// Output destinations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct OutputConfig {
    pub sample_dir: PathBuf,
    pub ensemble_dir: PathBuf,
    /// Number of scenarios in a sample run
    pub sample_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_dir: PathBuf::from("configs_sample"),
            ensemble_dir: PathBuf::from("configs_ensemble_complete"),
            sample_size: 10,
        }
    }
}

/// Everything needed to load the inputs and run a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Base template file
    pub template: PathBuf,
    /// Directory holding the SSP component files
    pub ssp_dir: PathBuf,
    /// Component file name, `{ssp}` is replaced by the SSP id
    pub ssp_file_pattern: String,
    pub space: ParameterSpace,
    pub fields: FieldMap,
    pub patterns: Patterns,
    pub output: OutputConfig,
    pub on_error: ErrorPolicy,
    /// Spaces per nesting level in the written files, `null` for compact
    pub indent: Option<usize>,
    pub show_progress: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("configuration_reuse100.xml"),
            ssp_dir: PathBuf::from("."),
            ssp_file_pattern: crate::template::DEFAULT_SSP_PATTERN.to_string(),
            space: ParameterSpace::full(),
            fields: FieldMap::default(),
            patterns: Patterns::default(),
            output: OutputConfig::default(),
            on_error: ErrorPolicy::default(),
            indent: Some(2),
            show_progress: true,
        }
    }
}

impl GeneratorConfig {
    /// Read a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EnsembleError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| EnsembleError::read(path, e))?;
        let mut config: Self = content
            .parse()
            .map_err(|e| EnsembleError::Config(format!("{}: {}", path.display(), e)))?;

        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Resolve relative input and output paths against `base`
    pub fn rebase(&mut self, base: &Path) {
        for path in [
            &mut self.template,
            &mut self.ssp_dir,
            &mut self.output.sample_dir,
            &mut self.output.ensemble_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Check everything that can be checked without reading the inputs
    pub fn validate(&self) -> Result<(), EnsembleError> {
        self.space.validate()?;
        self.patterns.validate()?;

        if !self.ssp_file_pattern.contains("{ssp}") {
            return Err(EnsembleError::Config(format!(
                "sspFilePattern '{}' must contain '{{ssp}}'",
                self.ssp_file_pattern
            )));
        }
        if self.output.sample_size == 0 {
            return Err(EnsembleError::Config(
                "output.sampleSize must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Rendering options for the written files
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            indent: self.indent,
        }
    }

    /// Output directory for a run mode
    pub fn output_dir(&self, mode: RunMode) -> &Path {
        match mode {
            RunMode::Sample => &self.output.sample_dir,
            RunMode::Full => &self.output.ensemble_dir,
        }
    }
}

impl FromStr for GeneratorConfig {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| EnsembleError::Config(e.to_string()))
    }
}
