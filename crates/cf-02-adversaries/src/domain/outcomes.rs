//! # Attack Outcomes
//!
//! Before/after observations captured by the orchestrator around each
//! attack. None of these types judge whether an attack "should" have worked;
//! the scenario harness does that per ledger variant.

use cf_01_ledger::domain::entities::{LedgerVariant, RefundReport};
use cf_01_ledger::domain::value_objects::{Identity, U256};
use cf_01_ledger::ports::inbound::OperationOutcome;
use serde::{Deserialize, Serialize};

/// A balance observed before and after an attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    /// Value before.
    pub before: U256,
    /// Value after.
    pub after: U256,
}

impl BalanceDelta {
    /// Pairs two observations.
    #[must_use]
    pub fn new(before: U256, after: U256) -> Self {
        Self { before, after }
    }

    /// Increase, or zero.
    #[must_use]
    pub fn gained(&self) -> U256 {
        self.after.saturating_sub(self.before)
    }

    /// Decrease, or zero.
    #[must_use]
    pub fn lost(&self) -> U256 {
        self.before.saturating_sub(self.after)
    }

    /// True if nothing moved.
    #[must_use]
    pub fn unchanged(&self) -> bool {
        self.before == self.after
    }
}

/// A contributor's recorded entry around a bulk refund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDelta {
    /// Contributor.
    pub contributor: Identity,
    /// Recorded entry.
    pub contribution: BalanceDelta,
}

/// What the reentrancy attack achieved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReentrancyOutcome {
    /// Attacked variant.
    pub variant: LedgerVariant,
    /// Amount contributed by the attacker contract.
    pub stake: U256,
    /// Result of `run_attack`.
    pub attack: OperationOutcome,
    /// Value held by the ledger.
    pub ledger_balance: BalanceDelta,
    /// Value held by the attacker contract.
    pub attacker_held: BalanceDelta,
    /// `total_raised` after the attack.
    pub total_raised_after: U256,
    /// Attacker contract's recorded contribution after the attack.
    pub attacker_contribution_after: U256,
    /// Nested refunds issued from the hook.
    pub reentries: usize,
    /// Nested refunds refused by the ledger's guard.
    pub blocked_reentries: usize,
    /// Swept to the controlling identity afterwards.
    pub loot: U256,
}

impl ReentrancyOutcome {
    /// The attack emptied the ledger and took at least what it held.
    #[must_use]
    pub fn drained(&self) -> bool {
        self.attack.is_accepted()
            && self.ledger_balance.after.is_zero()
            && self.attacker_held.after >= self.ledger_balance.before
    }

    /// Value received beyond the attacker's own stake.
    #[must_use]
    pub fn extra_drain(&self) -> U256 {
        self.attacker_held.gained().saturating_sub(self.stake)
    }
}

/// What the refund DoS achieved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosOutcome {
    /// Attacked variant.
    pub variant: LedgerVariant,
    /// Attacker contract identity.
    pub attacker: Identity,
    /// Result of the bulk refund.
    pub refund_all: OperationOutcome,
    /// Report of the bulk refund, when it completed.
    pub report: Option<RefundReport>,
    /// Value held by the ledger.
    pub ledger_balance: BalanceDelta,
    /// Every roster entry around the bulk refund.
    pub contributions: Vec<ContributionDelta>,
}

impl DosOutcome {
    /// The bulk refund failed as a whole.
    #[must_use]
    pub fn blocked(&self) -> bool {
        !self.refund_all.is_accepted()
    }

    /// Entry of `id`, if it was on the roster.
    #[must_use]
    pub fn contribution_of(&self, id: &Identity) -> Option<&BalanceDelta> {
        self.contributions
            .iter()
            .find(|delta| delta.contributor == *id)
            .map(|delta| &delta.contribution)
    }

    /// Roster entries other than the attacker's that were cleared.
    #[must_use]
    pub fn honest_refunded(&self) -> usize {
        self.contributions
            .iter()
            .filter(|delta| delta.contributor != self.attacker)
            .filter(|delta| !delta.contribution.before.is_zero() && delta.contribution.after.is_zero())
            .count()
    }
}

/// What a non-owner withdrawal attempt achieved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Probed variant.
    pub variant: LedgerVariant,
    /// Identity that called `withdraw`.
    pub caller: Identity,
    /// Result of `withdraw`.
    pub withdraw: OperationOutcome,
    /// Value held by the ledger.
    pub ledger_balance: BalanceDelta,
    /// Value held by the caller.
    pub caller_balance: BalanceDelta,
    /// `total_raised` after the attempt.
    pub total_raised_after: U256,
}

impl ProbeOutcome {
    /// The withdrawal went through.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.withdraw.is_accepted()
    }

    /// Value the caller gained.
    #[must_use]
    pub fn taken(&self) -> U256 {
        self.caller_balance.gained()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_delta() {
        let delta = BalanceDelta::new(U256::from(6), U256::from(1));
        assert_eq!(delta.lost(), U256::from(5));
        assert_eq!(delta.gained(), U256::zero());
        assert!(!delta.unchanged());
    }

    #[test]
    fn test_extra_drain() {
        let outcome = ReentrancyOutcome {
            variant: LedgerVariant::Vulnerable,
            stake: U256::from(1),
            attack: OperationOutcome::Accepted,
            ledger_balance: BalanceDelta::new(U256::from(6), U256::zero()),
            attacker_held: BalanceDelta::new(U256::zero(), U256::from(6)),
            total_raised_after: U256::zero(),
            attacker_contribution_after: U256::zero(),
            reentries: 5,
            blocked_reentries: 0,
            loot: U256::from(6),
        };
        assert!(outcome.drained());
        assert_eq!(outcome.extra_drain(), U256::from(5));
    }

    #[test]
    fn test_dos_outcome_serializes() {
        let outcome = DosOutcome {
            variant: LedgerVariant::Secure,
            attacker: Identity::from_label("dos"),
            refund_all: OperationOutcome::Accepted,
            report: Some(RefundReport::default()),
            ledger_balance: BalanceDelta::default(),
            contributions: Vec::new(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["variant"], "secure");
        assert_eq!(json["refund_all"]["status"], "accepted");
    }
}
