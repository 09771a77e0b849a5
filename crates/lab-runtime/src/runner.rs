//! Runs the scenario catalogue and aggregates the reports.

use crate::config::LabConfig;
use cf_02_adversaries::harness::{run_variant, ScenarioReport};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything one run produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabReport {
    /// Runtime version.
    pub version: String,
    /// Reports in run order.
    pub scenarios: Vec<ScenarioReport>,
    /// Reports whose checks all held.
    pub passed: usize,
    /// Reports with at least one failed check.
    pub failed: usize,
}

impl LabReport {
    /// Aggregates `scenarios`.
    #[must_use]
    pub fn new(scenarios: Vec<ScenarioReport>) -> Self {
        let passed = scenarios.iter().filter(|r| r.passed()).count();
        Self {
            version: crate::VERSION.to_string(),
            failed: scenarios.len() - passed,
            passed,
            scenarios,
        }
    }

    /// True when every scenario passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs every scenario on every configured variant.
///
/// A scenario the configuration cannot set up shows up as a failed report;
/// the remaining scenarios still run.
#[must_use]
pub fn run(config: &LabConfig) -> LabReport {
    let mut scenarios = Vec::new();
    for variant in &config.variants {
        for report in run_variant(*variant, &config.harness) {
            if report.passed() {
                info!(scenario = %report.name, %variant, "Scenario passed");
            } else {
                for check in report.failures() {
                    warn!(scenario = %report.name, %variant, check = %check.name, detail = %check.detail, "Check failed");
                }
            }
            scenarios.push(report);
        }
    }
    LabReport::new(scenarios)
}
