//! # Attack Orchestrator
//!
//! Sequences each multi-step attack against one ledger and captures the
//! balances around it.
//!
//! Setup steps (funding, contributing) propagate their errors: a flow that
//! cannot be set up has not been attempted. The exploit step itself never
//! fails the flow; its result is recorded as an [`OperationOutcome`].

use crate::adapters::{DosAttacker, ReentrantAttacker};
use crate::domain::outcomes::{
    BalanceDelta, ContributionDelta, DosOutcome, ProbeOutcome, ReentrancyOutcome,
};
use crate::errors::AttackError;
use crate::ports::AttackerContract;
use crate::service::probe::AccessControlProbe;
use cf_01_ledger::domain::value_objects::{Identity, U256};
use cf_01_ledger::ports::inbound::{CrowdfundApi, OperationOutcome};
use cf_01_ledger::ports::outbound::SharedChain;
use std::sync::Arc;
use tracing::{info, instrument};

/// Runs attacks against one ledger.
pub struct AttackOrchestrator {
    chain: SharedChain,
    ledger: Arc<dyn CrowdfundApi>,
}

impl AttackOrchestrator {
    /// Orchestrator for `ledger` on `chain`.
    pub fn new(chain: SharedChain, ledger: Arc<dyn CrowdfundApi>) -> Self {
        Self { chain, ledger }
    }

    /// Target ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<dyn CrowdfundApi> {
        &self.ledger
    }

    /// fund -> contribute -> attack -> sweep, with `controller` driving
    /// `attacker` and staking `stake`.
    #[instrument(skip(self, attacker), fields(variant = %self.ledger.variant()))]
    pub fn reentrancy(
        &self,
        attacker: &ReentrantAttacker,
        controller: Identity,
        stake: U256,
    ) -> Result<ReentrancyOutcome, AttackError> {
        attacker.fund_attacker(controller, stake)?;
        let stake = attacker.contribute_from_contract(controller, stake)?;

        let ledger_before = self.ledger.get_balance();
        let held_before = attacker.held_balance();

        let result = attacker.run_attack(controller, stake);
        let attack = OperationOutcome::from_result(&result);

        let ledger_after = self.ledger.get_balance();
        let held_after = attacker.held_balance();
        let loot = if held_after.is_zero() {
            U256::zero()
        } else {
            attacker.withdraw_loot(controller)?
        };

        let outcome = ReentrancyOutcome {
            variant: self.ledger.variant(),
            stake,
            attack,
            ledger_balance: BalanceDelta::new(ledger_before, ledger_after),
            attacker_held: BalanceDelta::new(held_before, held_after),
            total_raised_after: self.ledger.total_raised(),
            attacker_contribution_after: self.ledger.contributions(attacker.identity()),
            reentries: attacker.reentries(),
            blocked_reentries: attacker.blocked_reentries(),
            loot,
        };
        info!(
            drained = outcome.drained(),
            extra = %outcome.extra_drain(),
            reentries = outcome.reentries,
            blocked = outcome.blocked_reentries,
            "Reentrancy flow finished"
        );
        Ok(outcome)
    }

    /// fund -> join -> trigger bulk refund, with `controller` driving
    /// `attacker`. The contract is funded with `funding` and contributes
    /// `stake` of it.
    #[instrument(skip(self, attacker), fields(variant = %self.ledger.variant()))]
    pub fn refund_all_dos(
        &self,
        attacker: &DosAttacker,
        controller: Identity,
        funding: U256,
        stake: U256,
    ) -> Result<DosOutcome, AttackError> {
        attacker.fund_attack(controller, funding)?;
        attacker.join_crowdfund(controller, stake)?;

        let roster = self.ledger.get_contributors();
        let entries_before: Vec<U256> = roster.iter().map(|id| self.ledger.contributions(*id)).collect();
        let ledger_before = self.ledger.get_balance();

        let result = attacker.trigger_refund_all(controller);
        let refund_all = OperationOutcome::from_result(&result);

        let contributions = roster
            .iter()
            .zip(entries_before)
            .map(|(id, before)| ContributionDelta {
                contributor: *id,
                contribution: BalanceDelta::new(before, self.ledger.contributions(*id)),
            })
            .collect();

        let outcome = DosOutcome {
            variant: self.ledger.variant(),
            attacker: attacker.identity(),
            refund_all,
            report: result.ok(),
            ledger_balance: BalanceDelta::new(ledger_before, self.ledger.get_balance()),
            contributions,
        };
        info!(
            blocked = outcome.blocked(),
            honest_refunded = outcome.honest_refunded(),
            "Refund DoS flow finished"
        );
        Ok(outcome)
    }

    /// A non-owner `withdraw` attempt by `probe`.
    pub fn access_control(&self, probe: &AccessControlProbe) -> ProbeOutcome {
        probe.probe_withdraw(&self.chain, self.ledger.as_ref())
    }
}
