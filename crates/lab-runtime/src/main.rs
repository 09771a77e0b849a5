//! # Lab Runtime
//!
//! Runs every attack scenario against the configured ledger variants and
//! prints the aggregated report as JSON on stdout. Logs go to stderr.
//!
//! Exit status is non-zero when any scenario check fails.

use anyhow::{bail, Context, Result};
use lab_runtime::{init_tracing, load_config, run};
use tracing::{info, warn};

fn main() -> Result<()> {
    let (config, warnings) = load_config();
    init_tracing(&config.logging).context("failed to initialise logging")?;
    for warning in &warnings {
        warn!(%warning, "Ignoring configuration value");
    }
    config.validate().context("invalid configuration")?;

    info!(
        version = lab_runtime::VERSION,
        variants = ?config.variants,
        goal = %config.harness.ledger.goal,
        policy = ?config.harness.ledger.over_goal_policy,
        "Running crowdfund scenarios"
    );
    let report = run(&config);

    let json = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
    println!("{json}");

    if !report.all_passed() {
        bail!("{} of {} scenarios failed", report.failed, report.scenarios.len());
    }
    info!(passed = report.passed, "All scenarios passed");
    Ok(())
}
