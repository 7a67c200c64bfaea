//! End-of-run summary
//!
//! Lists every scenario that was written and every scenario that failed,
//! with the failing scenario's parameters so the run can be reproduced.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::error::EnsembleError;
use crate::scenario::ScenarioParams;

/// Number of written files listed by [`RunSummary::report`]
const REPORT_FILES: usize = 10;

/// A configuration that was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenConfig {
    pub params: ScenarioParams,
    pub path: PathBuf,
}

/// A scenario that could not be generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedScenario {
    pub params: ScenarioParams,
    pub error: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub written: Vec<WrittenConfig>,
    pub failed: Vec<FailedScenario>,
    pub elapsed: Duration,
}

/// One row of the CSV export
#[derive(Serialize)]
struct SummaryRow<'a> {
    scenario: String,
    ssp: String,
    rcp: &'a str,
    tech: &'a str,
    supply: &'a str,
    allocation: &'a str,
    policy_rate: u8,
    status: &'a str,
    path: String,
    error: &'a str,
}

impl<'a> SummaryRow<'a> {
    fn new(params: &ScenarioParams, status: &'a str, path: String, error: &'a str) -> Self {
        Self {
            scenario: params.scenario_name(),
            ssp: params.ssp.to_string(),
            rcp: params.rcp.code(),
            tech: params.tech.code(),
            supply: params.supply.code(),
            allocation: params.allocation.code(),
            policy_rate: params.policy_rate.percent(),
            status,
            path,
            error,
        }
    }
}

impl RunSummary {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub(crate) fn record_written(&mut self, params: ScenarioParams, path: PathBuf) {
        self.written.push(WrittenConfig { params, path });
    }

    pub(crate) fn record_failure(&mut self, params: ScenarioParams, error: &EnsembleError) {
        self.failed.push(FailedScenario {
            params,
            error: error.to_string(),
        });
    }

    /// Number of scenarios attempted
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// Whether every attempted scenario was written
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Paths of the written files, in generation order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.written.iter().map(|w| w.path.as_path())
    }

    /// Human-readable summary of the run
    pub fn report(&self) -> String {
        let mut out = String::new();
        let secs = self.elapsed.as_secs_f64();

        let _ = writeln!(
            out,
            "Generated {} of {} configuration files in {:.2}s",
            self.written.len(),
            self.total(),
            secs
        );
        if !self.written.is_empty() {
            let _ = writeln!(
                out,
                "Average: {:.3} seconds per file",
                secs / self.written.len() as f64
            );
        }
        let _ = writeln!(out, "Output directory: {}", self.output_dir.display());

        if !self.written.is_empty() {
            let _ = writeln!(out, "\nSample generated files:");
            for (i, written) in self.written.iter().take(REPORT_FILES).enumerate() {
                let _ = writeln!(out, "  {:2}. {}", i + 1, written.params.file_name());
            }
            if self.written.len() > REPORT_FILES {
                let _ = writeln!(
                    out,
                    "  ... and {} more files",
                    self.written.len() - REPORT_FILES
                );
            }
        }

        if !self.failed.is_empty() {
            let _ = writeln!(out, "\nFailed scenarios ({}):", self.failed.len());
            for failed in &self.failed {
                let p = &failed.params;
                let _ = writeln!(
                    out,
                    "  {} (ssp={}, rcp={}, tech={}, supply={}, allocation={}, rate={}): {}",
                    p.scenario_name(),
                    p.ssp,
                    p.rcp,
                    p.tech,
                    p.supply,
                    p.allocation,
                    p.policy_rate,
                    failed.error
                );
            }
        }

        out
    }

    /// Export one row per attempted scenario
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), EnsembleError> {
        let mut writer =
            csv::Writer::from_path(path.as_ref()).map_err(|e| EnsembleError::Summary(e.to_string()))?;

        for written in &self.written {
            let row = SummaryRow::new(
                &written.params,
                "written",
                written.path.display().to_string(),
                "",
            );
            writer
                .serialize(row)
                .map_err(|e| EnsembleError::Summary(e.to_string()))?;
        }
        for failed in &self.failed {
            let row = SummaryRow::new(&failed.params, "failed", String::new(), &failed.error);
            writer
                .serialize(row)
                .map_err(|e| EnsembleError::Summary(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| EnsembleError::Summary(e.to_string()))
    }

    /// Export the summary as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, EnsembleError> {
        serde_json::to_string_pretty(self).map_err(|e| EnsembleError::Summary(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ParameterSpace;

    fn summary(written: usize, failed: usize) -> RunSummary {
        let space = ParameterSpace::full();
        let mut summary = RunSummary::new("out");
        for params in space.iter().take(written) {
            summary.record_written(params, PathBuf::from("out").join(params.file_name()));
        }
        for params in space.iter().skip(written).take(failed) {
            summary.record_failure(
                params,
                &EnsembleError::Merge {
                    ssp: params.ssp.to_string(),
                },
            );
        }
        summary
    }

    #[test]
    fn test_report_lists_first_files_and_failures() {
        let report = summary(12, 1).report();
        assert!(report.contains("Generated 12 of 13 configuration files"));
        assert!(report.contains(" 1. SSP1_2p6_Basic_L_Mkt_PR0.xml"));
        assert!(report.contains("... and 2 more files"));
        assert!(report.contains("Failed scenarios (1):"));
        assert!(report.contains("ssp=SSP1, rcp=2p6"));
        assert!(report.contains("No SSP fragment loaded for SSP1"));
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        summary(2, 1).write_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "scenario");
        assert_eq!(&headers[7], "status");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "SSP1_2p6_Basic_L_Mkt_PR0");
        assert_eq!(&rows[2][7], "failed");
        assert!(rows[2][9].contains("SSP1"));
    }

    #[test]
    fn test_json_export() {
        let json = summary(1, 0).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["written"][0]["params"]["rcp"], "2p6");
        assert_eq!(value["written"][0]["params"]["policy_rate"], 0);
        assert!(value["failed"].as_array().unwrap().is_empty());
    }
}
