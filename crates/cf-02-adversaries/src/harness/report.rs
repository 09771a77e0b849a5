//! Scenario reports.

use cf_01_ledger::domain::entities::LedgerVariant;
use cf_01_ledger::domain::invariants::InvariantCheckResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named post-condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// What was checked.
    pub name: String,
    /// Whether it held.
    pub passed: bool,
    /// Observed values.
    pub detail: String,
}

impl Check {
    /// Records one post-condition.
    pub fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

/// Result of one scenario on one variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Variant it ran against.
    pub variant: LedgerVariant,
    /// Post-conditions in evaluation order.
    pub checks: Vec<Check>,
    /// Ledger invariants at the end of the scenario.
    pub invariants: InvariantCheckResult,
}

impl ScenarioReport {
    /// Empty report.
    pub fn new(name: impl Into<String>, variant: LedgerVariant) -> Self {
        Self {
            name: name.into(),
            variant,
            checks: Vec::new(),
            invariants: InvariantCheckResult::Valid,
        }
    }

    /// Appends a check.
    pub fn check(&mut self, name: impl Into<String>, passed: bool, detail: impl Into<String>) {
        self.checks.push(Check::new(name, passed, detail));
    }

    /// True when every check held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Checks that did not hold.
    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        writeln!(f, "[{status}] {} ({})", self.name, self.variant)?;
        for check in &self.checks {
            let mark = if check.passed { "ok" } else { "FAILED" };
            writeln!(f, "  {mark:>6}  {}: {}", check.name, check.detail)?;
        }
        for violation in self.invariants.violations() {
            writeln!(f, "  broken  {violation}")?;
        }
        Ok(())
    }
}
