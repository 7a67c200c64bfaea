//! Batch generation over the parameter space
//!
//! [`Ensemble`] owns the loaded inputs and writes one configuration file per
//! scenario tuple, in enumeration order.
//!
//! # Example
//!
//! ```rust,no_run
//! use ssp_ensemble::config::{GeneratorConfig, RunMode};
//! use ssp_ensemble::ensemble::Ensemble;
//!
//! let config = GeneratorConfig::from_file("ensemble.json")?;
//! let ensemble = Ensemble::load(config)?;
//! let summary = ensemble.run(RunMode::Sample)?;
//! println!("{}", summary.report());
//! # Ok::<(), ssp_ensemble::EnsembleError>(())
//! ```

mod summary;

use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::compose::Composer;
use crate::config::{ErrorPolicy, GeneratorConfig, RunMode};
use crate::error::EnsembleError;
use crate::output;
use crate::scenario::ScenarioParams;
use crate::template::{SspLibrary, Template};

pub use summary::{FailedScenario, RunSummary, WrittenConfig};

const PROGRESS_TEMPLATE: &str =
    "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Loaded inputs plus the settings of a run
#[derive(Debug, Clone)]
pub struct Ensemble {
    config: GeneratorConfig,
    template: Template,
    library: SspLibrary,
}

impl Ensemble {
    /// Read the template and every SSP fragment named by the configuration
    ///
    /// Any missing or malformed input aborts before a file is written.
    pub fn load(config: GeneratorConfig) -> Result<Self, EnsembleError> {
        config.validate()?;

        let template = Template::from_file(&config.template)?;
        let library =
            SspLibrary::from_dir(&config.ssp_dir, &config.ssp_file_pattern, &config.space.ssps)?;

        Self::new(config, template, library)
    }

    /// Build from inputs that are already in memory
    pub fn new(
        config: GeneratorConfig,
        template: Template,
        library: SspLibrary,
    ) -> Result<Self, EnsembleError> {
        config.validate()?;
        template.validate(&config.fields)?;

        if config.fields.policy_target.is_none() {
            tracing::warn!("No policy target field configured, template value kept");
        }
        if config.fields.database_location.is_none() {
            tracing::warn!("No database location field configured, template value kept");
        }

        Ok(Self {
            config,
            template,
            library,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn library(&self) -> &SspLibrary {
        &self.library
    }

    /// A composer borrowing this ensemble's inputs
    pub fn composer(&self) -> Composer<'_> {
        Composer::new(
            &self.template,
            &self.library,
            &self.config.fields,
            &self.config.patterns,
        )
    }

    /// Scenarios generated by a run mode
    pub fn tuples(&self, mode: RunMode) -> Vec<ScenarioParams> {
        match mode {
            RunMode::Full => self.config.space.iter().collect(),
            RunMode::Sample => self.config.space.sample(self.config.output.sample_size),
        }
    }

    /// Generate every scenario of a run mode into its configured directory
    pub fn run(&self, mode: RunMode) -> Result<RunSummary, EnsembleError> {
        let tuples = self.tuples(mode);
        tracing::info!(
            "{} run: {} of {} scenarios",
            mode,
            tuples.len(),
            self.config.space.total()
        );
        self.generate(&tuples, self.config.output_dir(mode))
    }

    /// Generate the given scenarios into `dir`
    ///
    /// With [`ErrorPolicy::Continue`] a failing scenario is logged and recorded
    /// in the summary; with [`ErrorPolicy::Abort`] it ends the run.
    pub fn generate(
        &self,
        tuples: &[ScenarioParams],
        dir: &Path,
    ) -> Result<RunSummary, EnsembleError> {
        output::ensure_dir(dir)?;

        let start = Instant::now();
        let mut summary = RunSummary::new(dir);
        let pb = self.progress_bar(tuples.len());

        tracing::info!(
            "Generating {} configuration files in {}",
            tuples.len(),
            dir.display()
        );

        for params in tuples {
            pb.set_message(params.scenario_name());
            match self.generate_one(params, dir) {
                Ok(path) => summary.record_written(*params, path),
                Err(error) => match self.config.on_error {
                    ErrorPolicy::Continue => {
                        pb.suspend(|| {
                            tracing::error!("Failed to generate {}: {}", params, error)
                        });
                        summary.record_failure(*params, &error);
                    }
                    ErrorPolicy::Abort => {
                        pb.abandon();
                        return Err(EnsembleError::Scenario {
                            scenario: params.scenario_name(),
                            source: Box::new(error),
                        });
                    }
                },
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        summary.elapsed = start.elapsed();

        if summary.is_success() {
            tracing::info!(
                "Generated {} files in {:.2}s",
                summary.written.len(),
                summary.elapsed.as_secs_f64()
            );
        } else {
            tracing::warn!(
                "Generated {} files, {} scenarios failed",
                summary.written.len(),
                summary.failed.len()
            );
        }

        Ok(summary)
    }

    /// Compose and write a single scenario
    pub fn generate_one(
        &self,
        params: &ScenarioParams,
        dir: &Path,
    ) -> Result<PathBuf, EnsembleError> {
        let composed = self.composer().compose(params)?;
        output::write_config(&composed, dir, &self.config.render_options())
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
