//! # Scenarios
//!
//! Each scenario builds a fresh [`Fixture`], runs one flow and records the
//! post-conditions expected of the variant it ran against. Expectations
//! differ by variant: a passing vulnerable report means the flaw was
//! reproduced, a passing secure report means it was resisted.

use super::fixture::Fixture;
use super::report::ScenarioReport;
use crate::config::HarnessConfig;
use crate::errors::AttackError;
use crate::ports::AttackerContract;
use crate::service::AccessControlProbe;
use cf_01_ledger::domain::entities::LedgerVariant;
use cf_01_ledger::domain::invariants::check_all_invariants;
use cf_01_ledger::domain::value_objects::units::{ether, format_ether, milli_ether};
use cf_01_ledger::domain::value_objects::U256;
use cf_01_ledger::ports::inbound::OperationOutcome;
use cf_01_ledger::ports::outbound::ChainAccess;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument, warn};

/// The scenario catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Bulk refund with only externally owned contributors.
    EoaRefundAll,
    /// Reentrant refund drain.
    Reentrancy,
    /// Bulk refund blocked by a declining contributor.
    RefundAllDos,
    /// Withdrawal by a non-owner.
    AccessControl,
    /// Contribute then refund restores the ledger.
    RoundTrip,
}

impl Scenario {
    /// Every scenario, in run order.
    pub const ALL: [Self; 5] = [
        Self::EoaRefundAll,
        Self::Reentrancy,
        Self::RefundAllDos,
        Self::AccessControl,
        Self::RoundTrip,
    ];

    /// Report name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EoaRefundAll => "eoa_refund_all",
            Self::Reentrancy => "reentrancy",
            Self::RefundAllDos => "refund_all_dos",
            Self::AccessControl => "access_control",
            Self::RoundTrip => "round_trip",
        }
    }

    /// Runs this scenario on a fresh fixture.
    ///
    /// A setup step that fails (fixture funding, an honest contribution the
    /// ledger configuration refuses) is recorded as a failed check rather
    /// than aborting the run.
    #[instrument(skip(config), fields(scenario = self.name()))]
    pub fn run(self, variant: LedgerVariant, config: &HarnessConfig) -> ScenarioReport {
        let mut report = ScenarioReport::new(self.name(), variant);
        let fixture = match Fixture::new(variant, config) {
            Ok(fixture) => fixture,
            Err(err) => {
                warn!(error = %err, "Fixture setup failed");
                report.check("fixture ready", false, err.to_string());
                return report;
            }
        };

        let flow = match self {
            Self::EoaRefundAll => eoa_refund_all(&fixture, &mut report),
            Self::Reentrancy => reentrancy(&fixture, &mut report),
            Self::RefundAllDos => refund_all_dos(&fixture, config, &mut report),
            Self::AccessControl => access_control(&fixture, &mut report),
            Self::RoundTrip => round_trip(&fixture, &mut report),
        };
        if let Err(err) = flow {
            warn!(error = %err, "Scenario setup failed");
            report.check("scenario setup", false, err.to_string());
        }

        report.invariants = check_all_invariants(&fixture.ledger.snapshot());
        info!(passed = report.passed(), checks = report.checks.len(), "Scenario finished");
        report
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs every scenario on `variant`.
#[must_use]
pub fn run_variant(variant: LedgerVariant, config: &HarnessConfig) -> Vec<ScenarioReport> {
    Scenario::ALL
        .iter()
        .map(|scenario| scenario.run(variant, config))
        .collect()
}

/// Runs every scenario on both variants, vulnerable first.
#[must_use]
pub fn run_all(config: &HarnessConfig) -> Vec<ScenarioReport> {
    LedgerVariant::ALL
        .iter()
        .flat_map(|variant| run_variant(*variant, config))
        .collect()
}

fn eth(amount: U256) -> String {
    format!("{} ETH", format_ether(amount))
}

// -----------------------------------------------------------------------------
// Flows
// -----------------------------------------------------------------------------

fn eoa_refund_all(f: &Fixture, report: &mut ScenarioReport) -> Result<(), AttackError> {
    f.ledger.contribute(f.honest1, ether(1))?;
    f.ledger.contribute(f.honest2, ether(2))?;

    let result = f.ledger.refund_all(f.deployer);
    report.check("refund_all accepted", result.is_ok(), OperationOutcome::from_result(&result).to_string());

    for (label, id) in [("honest1", f.honest1), ("honest2", f.honest2)] {
        let left = f.ledger.contributions(id);
        report.check(format!("{label} contribution cleared"), left.is_zero(), eth(left));
    }
    let total = f.ledger.total_raised();
    report.check("total_raised is zero", total.is_zero(), eth(total));
    let balance = f.ledger.get_balance();
    report.check("ledger balance is zero", balance.is_zero(), eth(balance));
    Ok(())
}

fn reentrancy(f: &Fixture, report: &mut ScenarioReport) -> Result<(), AttackError> {
    f.ledger.contribute(f.honest1, ether(5))?;
    let outcome = f.orchestrator().reentrancy(&f.reentrant, f.attacker1, ether(1))?;
    let honest_left = f.ledger.contributions(f.honest1);

    report.check("attack call accepted", outcome.attack.is_accepted(), outcome.attack.to_string());
    match f.ledger.variant() {
        LedgerVariant::Vulnerable => {
            report.check(
                "ledger drained",
                outcome.ledger_balance.after.is_zero(),
                eth(outcome.ledger_balance.after),
            );
            report.check(
                "total_raised is zero",
                outcome.total_raised_after.is_zero(),
                eth(outcome.total_raised_after),
            );
            report.check(
                "attacker contribution is zero",
                outcome.attacker_contribution_after.is_zero(),
                eth(outcome.attacker_contribution_after),
            );
            report.check(
                "attacker took at least the pre-attack balance",
                outcome.drained(),
                format!(
                    "took {} of {}",
                    eth(outcome.attacker_held.after),
                    eth(outcome.ledger_balance.before)
                ),
            );
            let invariants = check_all_invariants(&f.ledger.snapshot());
            report.check(
                "accounting invariant broken",
                invariants.breaks_accounting(),
                format!("honest entry {} still recorded", eth(honest_left)),
            );
        }
        LedgerVariant::Secure => {
            report.check(
                "ledger keeps honest funds",
                outcome.ledger_balance.after == honest_left && honest_left == ether(5),
                eth(outcome.ledger_balance.after),
            );
            report.check(
                "no extra drain",
                outcome.extra_drain().is_zero(),
                format!("received {} for a stake of {}", eth(outcome.attacker_held.gained()), eth(outcome.stake)),
            );
            report.check(
                "re-entry refused by guard",
                outcome.blocked_reentries > 0,
                format!("{} blocked", outcome.blocked_reentries),
            );
            report.check(
                "stake refunded once",
                outcome.loot == outcome.stake,
                eth(outcome.loot),
            );
        }
    }
    Ok(())
}

fn refund_all_dos(f: &Fixture, config: &HarnessConfig, report: &mut ScenarioReport) -> Result<(), AttackError> {
    f.ledger.contribute(f.honest1, ether(1))?;
    let stake = milli_ether(100);
    let outcome = f
        .orchestrator()
        .refund_all_dos(&f.dos, f.attacker2, milli_ether(200), stake)?;

    let honest = outcome.contribution_of(&f.honest1).copied().unwrap_or_default();
    let attacker = outcome.contribution_of(&f.dos.identity()).copied().unwrap_or_default();
    report.check(
        "attacker contribution still recorded",
        attacker.after == stake,
        eth(attacker.after),
    );

    match f.ledger.variant() {
        LedgerVariant::Vulnerable => {
            report.check("refund_all reverted", outcome.blocked(), outcome.refund_all.to_string());
            report.check(
                "revert names the blocking contributor",
                outcome
                    .refund_all
                    .reason()
                    .is_some_and(|reason| reason.starts_with("refund blocked by contributor")),
                outcome.refund_all.reason().unwrap_or_default().to_string(),
            );
            report.check(
                "honest contribution rolled back",
                honest.unchanged() && honest.after == ether(1),
                eth(honest.after),
            );
            report.check(
                "ledger balance unchanged",
                outcome.ledger_balance.unchanged(),
                eth(outcome.ledger_balance.after),
            );
        }
        LedgerVariant::Secure => {
            report.check("refund_all completed", !outcome.blocked(), outcome.refund_all.to_string());
            let restored = f.chain.balance_of(f.honest1);
            report.check(
                "honest contributor refunded",
                honest.after.is_zero() && restored == config.initial_funds,
                format!("entry {}, wallet {}", eth(honest.after), eth(restored)),
            );
            let failed = f.ledger.failed_refunds();
            report.check(
                "attacker recorded as failed refund",
                failed.iter().any(|(id, amount)| *id == f.dos.identity() && *amount == stake),
                format!("{} failed", failed.len()),
            );
        }
    }
    Ok(())
}

fn access_control(f: &Fixture, report: &mut ScenarioReport) -> Result<(), AttackError> {
    f.ledger.contribute(f.honest1, ether(5))?;
    let outcome = f.orchestrator().access_control(&AccessControlProbe::new(f.attacker1));

    match f.ledger.variant() {
        LedgerVariant::Vulnerable => {
            report.check("non-owner withdraw accepted", outcome.succeeded(), outcome.withdraw.to_string());
            report.check(
                "balance emptied",
                outcome.ledger_balance.after.is_zero() && outcome.taken() == ether(5),
                format!("took {}", eth(outcome.taken())),
            );
            report.check(
                "total_raised still positive",
                outcome.total_raised_after == ether(5),
                eth(outcome.total_raised_after),
            );
            report.check(
                "custody invariant broken",
                check_all_invariants(&f.ledger.snapshot()).breaks_custody(),
                "balance no longer backs total_raised",
            );
        }
        LedgerVariant::Secure => {
            report.check(
                "non-owner withdraw refused",
                outcome
                    .withdraw
                    .reason()
                    .is_some_and(|reason| reason.starts_with("unauthorized")),
                outcome.withdraw.to_string(),
            );
            report.check(
                "balance unchanged",
                outcome.ledger_balance.unchanged(),
                eth(outcome.ledger_balance.after),
            );
            report.check("caller gained nothing", outcome.taken().is_zero(), eth(outcome.taken()));
        }
    }
    Ok(())
}

fn round_trip(f: &Fixture, report: &mut ScenarioReport) -> Result<(), AttackError> {
    let before = f.ledger.snapshot();
    let wallet_before = f.chain.balance_of(f.honest1);

    f.ledger.contribute(f.honest1, ether(3))?;
    let refunded = f.ledger.request_refund(f.honest1)?;
    let after = f.ledger.snapshot();

    report.check("full amount refunded", refunded == ether(3), eth(refunded));
    report.check("ledger balance restored", after.balance == before.balance, eth(after.balance));
    report.check(
        "total_raised restored",
        after.total_raised == before.total_raised,
        eth(after.total_raised),
    );
    report.check(
        "contributions restored",
        after.contributions == before.contributions,
        format!("{} entries", after.contributions.len()),
    );
    let wallet_after = f.chain.balance_of(f.honest1);
    report.check("contributor wallet restored", wallet_after == wallet_before, eth(wallet_after));
    Ok(())
}
