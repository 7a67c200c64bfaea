//! Substitution points and value patterns

use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;
use crate::scenario::ScenarioParams;
use crate::xml::{Element, NodePath};

pub const SCENARIO_NAME: &str = "scenario name";
pub const POLICY_TARGET: &str = "policy target";
pub const DATABASE_LOCATION: &str = "database location";
pub const POLICY_RATE: &str = "policy rate";
pub const COMPONENTS: &str = "scenario components";

/// Where the parameter-dependent nodes live in the base template
///
/// The defaults follow the GCAM configuration layout:
///
/// | Field | Default path |
/// |-------|--------------|
/// | `scenario_name` | `Strings/Value[@name='scenarioName']` |
/// | `policy_target` | `Files/Value[@name='policy-target-file']` |
/// | `database_location` | `Files/Value[@name='xmldb-location']` |
/// | `policy_rate` | unset |
/// | `components` | `ScenarioComponents` |
///
/// Optional fields set to `None` are left untouched. A configured path that
/// does not resolve is a `MissingField` error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FieldMap {
    /// Receives the scenario name
    pub scenario_name: NodePath,
    /// Receives the rendered policy target pattern
    pub policy_target: Option<NodePath>,
    /// Receives the rendered database pattern
    pub database_location: Option<NodePath>,
    /// Receives the numeric policy rate
    pub policy_rate: Option<NodePath>,
    /// Element the SSP fragment is merged into
    pub components: NodePath,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::gcam()
    }
}

impl FieldMap {
    /// The GCAM configuration layout
    pub fn gcam() -> Self {
        Self {
            scenario_name: NodePath::root()
                .child("Strings")
                .child_where("Value", "name", "scenarioName"),
            policy_target: Some(
                NodePath::root()
                    .child("Files")
                    .child_where("Value", "name", "policy-target-file"),
            ),
            database_location: Some(
                NodePath::root()
                    .child("Files")
                    .child_where("Value", "name", "xmldb-location"),
            ),
            policy_rate: None,
            components: NodePath::root().child("ScenarioComponents"),
        }
    }

    /// Every configured field with its description
    pub fn entries(&self) -> Vec<(&'static str, &NodePath)> {
        let mut entries = vec![(SCENARIO_NAME, &self.scenario_name)];
        if let Some(path) = &self.policy_target {
            entries.push((POLICY_TARGET, path));
        }
        if let Some(path) = &self.database_location {
            entries.push((DATABASE_LOCATION, path));
        }
        if let Some(path) = &self.policy_rate {
            entries.push((POLICY_RATE, path));
        }
        entries.push((COMPONENTS, &self.components));
        entries
    }

    /// Fail with `MissingField` on the first path that does not resolve
    pub fn check(&self, root: &Element) -> Result<(), EnsembleError> {
        for (field, path) in self.entries() {
            if path.resolve(root).is_none() {
                return Err(EnsembleError::missing_field(field, path.as_str()));
            }
        }
        Ok(())
    }
}

/// Value patterns for path-like fields
///
/// Placeholders: `{scenario}`, `{ssp}`, `{rcp}`, `{tech}`, `{supply}`,
/// `{allocation}`, `{rate}` and `{spa}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Patterns {
    pub policy_target: String,
    pub database: String,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            policy_target: "../input/policy/policy_target_{rcp}_spa{spa}.xml".to_string(),
            database: "../output/db_{scenario}".to_string(),
        }
    }
}

impl Patterns {
    /// Check every pattern for unknown placeholders
    pub fn validate(&self) -> Result<(), EnsembleError> {
        for pattern in [&self.policy_target, &self.database] {
            substitute(pattern, |name| lookup(name, None))?;
        }
        Ok(())
    }

    pub fn policy_target(&self, params: &ScenarioParams) -> Result<String, EnsembleError> {
        render(&self.policy_target, params)
    }

    pub fn database(&self, params: &ScenarioParams) -> Result<String, EnsembleError> {
        render(&self.database, params)
    }
}

/// Fill a pattern's placeholders from a scenario
pub fn render(pattern: &str, params: &ScenarioParams) -> Result<String, EnsembleError> {
    substitute(pattern, |name| lookup(name, Some(params)))
}

/// Resolve a placeholder; without a scenario only checks the name
fn lookup(name: &str, params: Option<&ScenarioParams>) -> Option<String> {
    let known = matches!(
        name,
        "scenario" | "ssp" | "rcp" | "tech" | "supply" | "allocation" | "rate" | "spa"
    );
    if !known {
        return None;
    }
    let Some(p) = params else {
        return Some(String::new());
    };
    Some(match name {
        "scenario" => p.scenario_name(),
        "ssp" => p.ssp.to_string(),
        "rcp" => p.rcp.to_string(),
        "tech" => p.tech.to_string(),
        "supply" => p.supply.to_string(),
        "allocation" => p.allocation.to_string(),
        "rate" => p.policy_rate.to_string(),
        _ => p.spa_code().to_string(),
    })
}

fn substitute(
    pattern: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, EnsembleError> {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            EnsembleError::Config(format!("unterminated placeholder in '{}'", pattern))
        })?;
        let name = &after[..close];
        let value = lookup(name).ok_or_else(|| {
            EnsembleError::Config(format!("unknown placeholder '{{{}}}' in '{}'", name, pattern))
        })?;
        out.push_str(&value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
