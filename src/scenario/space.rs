//! Cartesian product of the scenario axes

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::{Allocation, PolicyRate, Rcp, ScenarioParams, Ssp, Supply, Technology};
use crate::error::EnsembleError;

/// Ordered value lists for each axis
///
/// Enumeration is nested in the fixed axis order SSP, RCP, Tech, Supply,
/// Allocation, Policy-Rate, with the policy rate varying fastest, so index
/// `i` always denotes the same tuple for the same space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSpace {
    pub ssps: Vec<Ssp>,
    pub rcps: Vec<Rcp>,
    pub techs: Vec<Technology>,
    pub supplies: Vec<Supply>,
    pub allocations: Vec<Allocation>,
    pub rates: Vec<PolicyRate>,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::full()
    }
}

impl ParameterSpace {
    /// Default policy rates in percent
    pub const DEFAULT_RATES: [u8; 5] = [0, 25, 50, 75, 100];

    /// The stated axis domains: 5 × 4 × 2 × 2 × 2 × 5 = 800 scenarios
    pub fn full() -> Self {
        Self {
            ssps: Ssp::ALL.to_vec(),
            rcps: vec![Rcp::Rcp2p6, Rcp::Rcp4p5, Rcp::Rcp6p0, Rcp::Baseline],
            techs: vec![Technology::Basic, Technology::Advanced],
            supplies: vec![Supply::Low, Supply::High],
            allocations: vec![Allocation::Market, Allocation::Regulatory],
            rates: Self::DEFAULT_RATES
                .iter()
                .copied()
                .map(PolicyRate)
                .collect(),
        }
    }

    /// A space containing only the given tuple
    pub fn single(params: ScenarioParams) -> Self {
        Self {
            ssps: vec![params.ssp],
            rcps: vec![params.rcp],
            techs: vec![params.tech],
            supplies: vec![params.supply],
            allocations: vec![params.allocation],
            rates: vec![params.policy_rate],
        }
    }

    /// Restrict the SSP axis to `filter`, keeping this space's order
    pub fn with_ssps(&self, filter: &[Ssp]) -> Self {
        Self {
            ssps: self
                .ssps
                .iter()
                .copied()
                .filter(|ssp| filter.contains(ssp))
                .collect(),
            ..self.clone()
        }
    }

    /// Number of tuples in the product
    pub fn total(&self) -> usize {
        self.lengths().iter().product()
    }

    /// Whether the product is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn lengths(&self) -> [usize; 6] {
        [
            self.ssps.len(),
            self.rcps.len(),
            self.techs.len(),
            self.supplies.len(),
            self.allocations.len(),
            self.rates.len(),
        ]
    }

    /// The tuple at an enumeration index
    pub fn get(&self, index: usize) -> Option<ScenarioParams> {
        if index >= self.total() {
            return None;
        }
        let [_, n_rcp, n_tech, n_supply, n_alloc, n_rate] = self.lengths();

        let mut rest = index;
        let rate = self.rates[rest % n_rate];
        rest /= n_rate;
        let allocation = self.allocations[rest % n_alloc];
        rest /= n_alloc;
        let supply = self.supplies[rest % n_supply];
        rest /= n_supply;
        let tech = self.techs[rest % n_tech];
        rest /= n_tech;
        let rcp = self.rcps[rest % n_rcp];
        rest /= n_rcp;
        let ssp = self.ssps[rest];

        Some(ScenarioParams::new(ssp, rcp, tech, supply, allocation, rate))
    }

    /// Iterate over every tuple in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = ScenarioParams> + '_ {
        (0..self.total()).filter_map(move |index| self.get(index))
    }

    /// `n` tuples spread evenly over the enumeration
    ///
    /// Returns every tuple when `n` is at least the total.
    pub fn sample(&self, n: usize) -> Vec<ScenarioParams> {
        let total = self.total();
        if n >= total {
            return self.iter().collect();
        }
        (0..n)
            .filter_map(|i| self.get(i * total / n))
            .collect()
    }

    /// Reject duplicate values on any axis
    pub fn validate(&self) -> Result<(), EnsembleError> {
        check_unique("ssps", &self.ssps)?;
        check_unique("rcps", &self.rcps)?;
        check_unique("techs", &self.techs)?;
        check_unique("supplies", &self.supplies)?;
        check_unique("allocations", &self.allocations)?;
        check_unique("rates", &self.rates)?;
        Ok(())
    }
}

fn check_unique<T: Eq + Hash + Display>(axis: &str, values: &[T]) -> Result<(), EnsembleError> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(EnsembleError::Config(format!(
                "duplicate value '{}' on the {} axis",
                value, axis
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_space_total() {
        let space = ParameterSpace::full();
        assert_eq!(space.total(), 800);
        assert_eq!(space.iter().count(), 800);
    }

    #[test]
    fn test_enumeration_order() {
        let space = ParameterSpace::full();
        let names: Vec<String> = space.iter().take(6).map(|p| p.scenario_name()).collect();
        assert_eq!(
            names,
            vec![
                "SSP1_2p6_Basic_L_Mkt_PR0",
                "SSP1_2p6_Basic_L_Mkt_PR25",
                "SSP1_2p6_Basic_L_Mkt_PR50",
                "SSP1_2p6_Basic_L_Mkt_PR75",
                "SSP1_2p6_Basic_L_Mkt_PR100",
                "SSP1_2p6_Basic_L_Reg_PR0",
            ]
        );
        assert_eq!(
            space.get(space.total() - 1).unwrap().scenario_name(),
            "SSP5_Baseline_Tech_H_Reg_PR100"
        );
        assert!(space.get(space.total()).is_none());
    }

    #[test]
    fn test_with_ssps_keeps_order() {
        let space = ParameterSpace::full().with_ssps(&[Ssp::SSP4, Ssp::SSP2]);
        assert_eq!(space.ssps, vec![Ssp::SSP2, Ssp::SSP4]);
        assert_eq!(space.total(), 320);
    }

    #[test]
    fn test_sample_is_spread_and_deterministic() {
        let space = ParameterSpace::full();
        let sample = space.sample(4);
        assert_eq!(sample.len(), 4);
        assert_eq!(sample, space.sample(4));

        let ssps: Vec<Ssp> = sample.iter().map(|p| p.ssp).collect();
        assert_eq!(ssps, vec![Ssp::SSP1, Ssp::SSP2, Ssp::SSP3, Ssp::SSP4]);

        let single = ParameterSpace::single(sample[1]);
        assert_eq!(single.sample(10), vec![sample[1]]);
        assert!(space.sample(0).is_empty());
    }

    #[test]
    fn test_empty_axis() {
        let mut space = ParameterSpace::full();
        space.techs.clear();
        assert!(space.is_empty());
        assert_eq!(space.iter().count(), 0);
        assert!(space.get(0).is_none());
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut space = ParameterSpace::full();
        space.rcps.push(Rcp::Rcp2p6);
        assert!(matches!(space.validate(), Err(EnsembleError::Config(_))));
        assert!(ParameterSpace::full().validate().is_ok());
    }
}
