//! Scenario parameters and the parameter space
//!
//! A scenario is identified by one value on each of six axes. Its name,
//! `{SSP}_{RCP}_{Tech}_{Supply}_{Allocation}_PR{Rate}`, doubles as the output
//! filename stem and is injective over the axis domains.
//!
//! ```rust
//! use ssp_ensemble::scenario::*;
//!
//! let params = ScenarioParams::new(
//!     Ssp::SSP1,
//!     Rcp::Rcp2p6,
//!     Technology::Basic,
//!     Supply::Low,
//!     Allocation::Market,
//!     PolicyRate::new(0).unwrap(),
//! );
//! assert_eq!(params.file_name(), "SSP1_2p6_Basic_L_Mkt_PR0.xml");
//! ```

mod axes;
mod space;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;

pub use axes::{Allocation, PolicyRate, Rcp, Ssp, Supply, Technology};
pub use space::ParameterSpace;

/// One point of the parameter space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub ssp: Ssp,
    pub rcp: Rcp,
    pub tech: Technology,
    pub supply: Supply,
    pub allocation: Allocation,
    pub policy_rate: PolicyRate,
}

impl ScenarioParams {
    pub fn new(
        ssp: Ssp,
        rcp: Rcp,
        tech: Technology,
        supply: Supply,
        allocation: Allocation,
        policy_rate: PolicyRate,
    ) -> Self {
        Self {
            ssp,
            rcp,
            tech,
            supply,
            allocation,
            policy_rate,
        }
    }

    /// Scenario name, e.g. `SSP2_4p5_Basic_L_Mkt_PR0`
    pub fn scenario_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}_PR{}",
            self.ssp, self.rcp, self.tech, self.supply, self.allocation, self.policy_rate
        )
    }

    /// Output filename, the scenario name with an `.xml` extension
    pub fn file_name(&self) -> String {
        format!("{}.xml", self.scenario_name())
    }

    /// Shared policy assumption code of the SSP/RCP pair
    ///
    /// Selects which policy target file applies. RCP 6.0 groups SSP2 and SSP3
    /// under `235` and has no SSP5 variant, which falls back to `0`.
    pub fn spa_code(&self) -> &'static str {
        match (self.rcp, self.ssp.id()) {
            (_, 1) => "1",
            (Rcp::Rcp6p0, 2 | 3) => "235",
            (_, 2 | 3) => "23",
            (_, 4) => "4",
            (Rcp::Rcp6p0, 5) => "0",
            (_, 5) => "5",
            _ => "0",
        }
    }
}

impl fmt::Display for ScenarioParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scenario_name())
    }
}

/// Parses a scenario name (with or without the `.xml` extension)
impl FromStr for ScenarioParams {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stem = s.trim().trim_end_matches(".xml");
        let parts: Vec<&str> = stem.split('_').collect();
        let [ssp, rcp, tech, supply, allocation, rate] = parts.as_slice() else {
            return Err(EnsembleError::invalid_param("scenario name", s));
        };
        if !rate.starts_with("PR") {
            return Err(EnsembleError::invalid_param("scenario name", s));
        }

        Ok(Self {
            ssp: ssp.parse()?,
            rcp: rcp.parse()?,
            tech: tech.parse()?,
            supply: supply.parse()?,
            allocation: allocation.parse()?,
            policy_rate: rate.parse()?,
        })
    }
}
