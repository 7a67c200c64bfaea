//! Scenario ensemble generation for GCAM-style XML configurations
//!
//! A base configuration template is combined with one SSP component file per
//! socio-economic pathway, then specialised for every point of the parameter
//! space (SSP × RCP × technology × supply × allocation × policy rate). Each
//! point yields one standalone configuration file named after its scenario.
//!
//! # Example
//!
//! ```rust,no_run
//! use ssp_ensemble::prelude::*;
//!
//! let config = GeneratorConfig::default();
//! let ensemble = Ensemble::load(config)?;
//! let summary = ensemble.run(RunMode::Full)?;
//! println!("{}", summary.report());
//! # Ok::<(), EnsembleError>(())
//! ```

pub mod compose;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod output;
pub mod scenario;
pub mod template;
pub mod xml;

pub use compose::{ComposedConfig, Composer, FieldMap, Patterns};
pub use config::{ErrorPolicy, GeneratorConfig, RunMode};
pub use ensemble::{Ensemble, RunSummary};
pub use error::EnsembleError;
pub use scenario::{ParameterSpace, ScenarioParams};
pub use template::{SspFragment, SspLibrary, Template};

pub mod prelude {
    pub mod scenario {
        pub use crate::scenario::{
            Allocation, ParameterSpace, PolicyRate, Rcp, ScenarioParams, Ssp, Supply, Technology,
        };
    }
    pub mod xml {
        pub use crate::xml::{Document, Element, Node, NodePath, RenderOptions};
    }

    pub use crate::compose::{ComposedConfig, Composer, FieldMap, Patterns};
    pub use crate::config::{ErrorPolicy, GeneratorConfig, OutputConfig, RunMode};
    pub use crate::ensemble::{Ensemble, RunSummary};
    pub use crate::error::EnsembleError;
    pub use crate::scenario::*;
    pub use crate::template::{SspFragment, SspLibrary, Template};
}
