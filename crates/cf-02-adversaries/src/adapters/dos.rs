//! # Refund DoS Attacker
//!
//! A contributor that cannot receive value. Its receipt hook declines every
//! transfer, so any bulk refund that treats one declined transfer as fatal
//! is blocked for every contributor.

use super::account::ContractAccount;
use crate::errors::AttackError;
use crate::ports::AttackerContract;
use cf_01_ledger::domain::entities::RefundReport;
use cf_01_ledger::domain::value_objects::{Identity, U256};
use cf_01_ledger::errors::ReceiveError;
use cf_01_ledger::ports::inbound::CrowdfundApi;
use cf_01_ledger::ports::outbound::{SharedChain, ValueReceiver};
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument};

/// Reason given by the hook.
pub const REJECTION_REASON: &str = "attacker contract rejects all incoming value";

/// Contract whose receipt hook always fails.
pub struct DosAttacker {
    account: ContractAccount,
}

impl DosAttacker {
    /// Deploys an attacker controlled by `owner` and aimed at `target`.
    pub fn deploy(chain: SharedChain, owner: Identity, target: &Arc<dyn CrowdfundApi>) -> Arc<Self> {
        let attacker = Arc::new(Self {
            account: ContractAccount::deploy(chain, owner, target),
        });
        attacker
            .account
            .install(Arc::downgrade(&attacker) as Weak<dyn ValueReceiver>);
        info!(
            contract = %attacker.account.identity,
            %owner,
            target = %target.identity(),
            "Deployed refund DoS attacker"
        );
        attacker
    }

    /// The controller attaches `amount` to the contract.
    pub fn fund_attack(&self, caller: Identity, amount: U256) -> Result<(), AttackError> {
        self.account.accept_from_owner(caller, amount)
    }

    /// Contributes `amount` so the contract lands on the roster.
    #[instrument(skip(self), fields(contract = %self.account.identity))]
    pub fn join_crowdfund(&self, caller: Identity, amount: U256) -> Result<U256, AttackError> {
        self.account.only_owner(caller)?;
        self.account.require_held(amount)?;
        let ledger = self.account.ledger()?;
        let recorded = ledger.contribute(self.account.identity, amount)?;
        debug!(%recorded, "Joined crowdfund");
        Ok(recorded)
    }

    /// Triggers the bulk refund from the contract.
    #[instrument(skip(self), fields(contract = %self.account.identity))]
    pub fn trigger_refund_all(&self, caller: Identity) -> Result<RefundReport, AttackError> {
        self.account.only_owner(caller)?;
        let ledger = self.account.ledger()?;
        Ok(ledger.refund_all(self.account.identity)?)
    }
}

impl ValueReceiver for DosAttacker {
    fn on_value_received(&self, from: Identity, amount: U256) -> Result<(), ReceiveError> {
        debug!(contract = %self.account.identity, %from, %amount, "Declining incoming value");
        Err(ReceiveError::new(REJECTION_REASON))
    }
}

impl AttackerContract for DosAttacker {
    fn identity(&self) -> Identity {
        self.account.identity
    }

    fn owner(&self) -> Identity {
        self.account.owner
    }

    fn held_balance(&self) -> U256 {
        self.account.held()
    }

    /// Fails with [`AttackError::NothingToWithdraw`] when the contract is empty.
    #[instrument(skip(self), fields(contract = %self.account.identity))]
    fn withdraw_loot(&self, caller: Identity) -> Result<U256, AttackError> {
        self.account.only_owner(caller)?;
        if self.account.held().is_zero() {
            return Err(AttackError::NothingToWithdraw);
        }
        self.account.sweep_to_owner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_01_ledger::adapters::InMemoryChain;
    use cf_01_ledger::domain::entities::{LedgerConfig, LedgerVariant};
    use cf_01_ledger::domain::value_objects::units::{ether, milli_ether};
    use cf_01_ledger::errors::LedgerError;
    use cf_01_ledger::ports::outbound::ChainAccess;
    use cf_01_ledger::service::deploy;

    fn id(label: &str) -> Identity {
        Identity::from_label(label)
    }

    fn setup(variant: LedgerVariant) -> (Arc<InMemoryChain>, Arc<dyn CrowdfundApi>, Arc<DosAttacker>) {
        let chain = Arc::new(InMemoryChain::new());
        for who in ["deployer", "honest", "mallory"] {
            chain.fund(id(who), ether(100)).unwrap();
        }
        let ledger = deploy(chain.clone(), id("deployer"), LedgerConfig::default(), variant);
        let attacker = DosAttacker::deploy(chain.clone(), id("mallory"), &ledger);
        ledger.contribute(id("honest"), ether(1)).unwrap();
        attacker.fund_attack(id("mallory"), milli_ether(200)).unwrap();
        attacker.join_crowdfund(id("mallory"), milli_ether(100)).unwrap();
        (chain, ledger, attacker)
    }

    #[test]
    fn test_joins_roster() {
        let (_, ledger, attacker) = setup(LedgerVariant::Vulnerable);
        assert_eq!(ledger.get_contributors(), vec![id("honest"), attacker.identity()]);
        assert_eq!(attacker.held_balance(), milli_ether(100));
    }

    #[test]
    fn test_blocks_vulnerable_refund_all() {
        let (_, ledger, attacker) = setup(LedgerVariant::Vulnerable);

        let err = attacker.trigger_refund_all(id("mallory")).unwrap_err();

        assert!(matches!(
            err.ledger_error(),
            Some(LedgerError::TransferRejected { recipient, .. }) if *recipient == attacker.identity()
        ));
        assert_eq!(ledger.contributions(id("honest")), ether(1));
        assert_eq!(ledger.contributions(attacker.identity()), milli_ether(100));
    }

    #[test]
    fn test_secure_refund_all_skips_attacker() {
        let (chain, ledger, attacker) = setup(LedgerVariant::Secure);

        let report = attacker.trigger_refund_all(id("mallory")).unwrap();

        assert!(report.was_refunded(&id("honest")));
        assert!(report.has_failed(&attacker.identity()));
        assert_eq!(chain.balance_of(id("honest")), ether(100));
        assert_eq!(ledger.contributions(attacker.identity()), milli_ether(100));
    }

    #[test]
    fn test_withdraw_loot() {
        let (chain, _, attacker) = setup(LedgerVariant::Secure);

        assert_eq!(attacker.withdraw_loot(id("mallory")).unwrap(), milli_ether(100));
        assert_eq!(chain.balance_of(id("mallory")), ether(100) - milli_ether(100));
        assert_eq!(attacker.withdraw_loot(id("mallory")), Err(AttackError::NothingToWithdraw));
    }

    #[test]
    fn test_hook_rejects_direct_send() {
        let (chain, _, attacker) = setup(LedgerVariant::Secure);
        let err = chain
            .send_value(id("honest"), attacker.identity(), U256::one())
            .unwrap_err();
        assert!(err.to_string().contains(REJECTION_REASON));
    }
}
