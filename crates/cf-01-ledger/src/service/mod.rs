//! # Ledger Service
//!
//! The two ledger variants and the core they share.
//!
//! ## Execution Model
//!
//! - Every operation runs under the ledger's serialization point, a
//!   re-entrant mutex: calls from other threads wait, while a nested call
//!   made on the same thread from inside an outbound transfer goes through.
//! - Every mutating operation is atomic. A checkpoint of ledger storage and
//!   chain balances is taken on entry and restored on error.
//! - The outbound transfer (`ChainAccess::send_value`) is the only point
//!   where foreign code runs. No storage lock is held across it.

use crate::domain::entities::{
    GuardState, LedgerConfig, LedgerSnapshot, LedgerState, LedgerVariant, OverGoalPolicy,
};
use crate::domain::services::admit_contribution;
use crate::domain::value_objects::{Identity, U256};
use crate::errors::LedgerError;
use crate::ports::inbound::CrowdfundApi;
use crate::ports::outbound::{BalanceSnapshot, SharedChain};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

/// Implements the read half of [`CrowdfundApi`] by delegating to `self.core`.
macro_rules! impl_ledger_reads {
    () => {
        fn variant(&self) -> $crate::domain::entities::LedgerVariant {
            self.core.variant()
        }

        fn identity(&self) -> $crate::domain::value_objects::Identity {
            self.core.identity()
        }

        fn owner(&self) -> $crate::domain::value_objects::Identity {
            self.core.owner()
        }

        fn goal(&self) -> $crate::domain::value_objects::U256 {
            self.core.goal()
        }

        fn deadline(&self) -> Option<u64> {
            self.core.deadline()
        }

        fn total_raised(&self) -> $crate::domain::value_objects::U256 {
            self.core.total_raised()
        }

        fn get_balance(&self) -> $crate::domain::value_objects::U256 {
            self.core.balance()
        }

        fn contributions(
            &self,
            id: $crate::domain::value_objects::Identity,
        ) -> $crate::domain::value_objects::U256 {
            self.core.contribution_of(&id)
        }

        fn get_contributors(&self) -> Vec<$crate::domain::value_objects::Identity> {
            self.core.contributors()
        }

        fn failed_refunds(
            &self,
        ) -> Vec<(
            $crate::domain::value_objects::Identity,
            $crate::domain::value_objects::U256,
        )> {
            self.core.failed_refunds()
        }

        fn events(&self) -> Vec<$crate::events::LedgerEvent> {
            self.core.events()
        }

        fn contribute(
            &self,
            caller: $crate::domain::value_objects::Identity,
            amount: $crate::domain::value_objects::U256,
        ) -> Result<$crate::domain::value_objects::U256, $crate::errors::LedgerError> {
            self.core.contribute(caller, amount)
        }

        fn receive_direct(
            &self,
            caller: $crate::domain::value_objects::Identity,
            amount: $crate::domain::value_objects::U256,
        ) -> Result<(), $crate::errors::LedgerError> {
            self.core.receive_direct(caller, amount)
        }
    };
}

pub mod guard;
pub mod secure;
pub mod vulnerable;

#[cfg(test)]
mod test_support;

pub use guard::{ReentrancyGuard, ReentrancyLock};
pub use secure::SecureCrowdfund;
pub use vulnerable::VulnerableCrowdfund;

// =============================================================================
// DEPLOYMENT
// =============================================================================

/// Deploys a ledger of the chosen variant on `chain`, owned by `owner`.
///
/// The ledger's identity is derived from the owner's deployment nonce and
/// its deadline from the chain clock at deployment time.
pub fn deploy(
    chain: SharedChain,
    owner: Identity,
    config: LedgerConfig,
    variant: LedgerVariant,
) -> Arc<dyn CrowdfundApi> {
    match variant {
        LedgerVariant::Vulnerable => VulnerableCrowdfund::deploy(chain, owner, config),
        LedgerVariant::Secure => SecureCrowdfund::deploy(chain, owner, config),
    }
}

// =============================================================================
// LEDGER CORE
// =============================================================================

/// Ledger storage and chain balances captured at one point of a call.
pub(crate) struct Checkpoint {
    state: LedgerState,
    balances: BalanceSnapshot,
}

/// Plumbing shared by both variants. The variants differ only in how they
/// order and guard the value-moving operations.
pub(crate) struct LedgerCore {
    variant: LedgerVariant,
    identity: Identity,
    owner: Identity,
    goal: U256,
    deadline: Option<u64>,
    policy: OverGoalPolicy,
    pub(crate) chain: SharedChain,
    pub(crate) state: RwLock<LedgerState>,
    serial: ReentrantMutex<()>,
}

impl LedgerCore {
    pub(crate) fn new(
        chain: SharedChain,
        owner: Identity,
        config: &LedgerConfig,
        variant: LedgerVariant,
    ) -> Self {
        let identity = chain.deploy_address(owner);
        let deadline = config.deadline_from(chain.now());
        info!(
            %identity,
            %owner,
            %variant,
            goal = %config.goal,
            ?deadline,
            policy = ?config.over_goal_policy,
            "Deployed crowdfund ledger"
        );
        Self {
            variant,
            identity,
            owner,
            goal: config.goal,
            deadline,
            policy: config.over_goal_policy,
            chain,
            state: RwLock::new(LedgerState::new()),
            serial: ReentrantMutex::new(()),
        }
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    /// Enters the ledger's serialization point.
    pub(crate) fn serialize(&self) -> ReentrantMutexGuard<'_, ()> {
        self.serial.lock()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.read().clone(),
            balances: self.chain.snapshot(),
        }
    }

    pub(crate) fn rollback(&self, checkpoint: Checkpoint) {
        *self.state.write() = checkpoint.state;
        self.chain.restore(checkpoint.balances);
    }

    /// Runs `op` and undoes all of its effects if it fails.
    pub(crate) fn atomically<T>(
        &self,
        name: &'static str,
        op: impl FnOnce() -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let checkpoint = self.checkpoint();
        let result = op();
        if let Err(err) = &result {
            self.rollback(checkpoint);
            debug!(ledger = %self.identity, op = name, error = %err, "Call failed; state rolled back");
        }
        result
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub(crate) fn variant(&self) -> LedgerVariant {
        self.variant
    }

    pub(crate) fn identity(&self) -> Identity {
        self.identity
    }

    pub(crate) fn owner(&self) -> Identity {
        self.owner
    }

    pub(crate) fn goal(&self) -> U256 {
        self.goal
    }

    pub(crate) fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub(crate) fn balance(&self) -> U256 {
        self.chain.balance_of(self.identity)
    }

    pub(crate) fn total_raised(&self) -> U256 {
        self.state.read().total_raised()
    }

    pub(crate) fn contribution_of(&self, id: &Identity) -> U256 {
        self.state.read().contribution_of(id)
    }

    pub(crate) fn contributors(&self) -> Vec<Identity> {
        self.state.read().contributors().to_vec()
    }

    pub(crate) fn failed_refunds(&self) -> Vec<(Identity, U256)> {
        self.state
            .read()
            .failed_refunds()
            .iter()
            .map(|(id, amount)| (*id, *amount))
            .collect()
    }

    pub(crate) fn events(&self) -> Vec<crate::events::LedgerEvent> {
        self.state.read().events().to_vec()
    }

    pub(crate) fn snapshot(&self, guard: GuardState) -> LedgerSnapshot {
        let balance = self.balance();
        LedgerSnapshot::capture(
            self.variant,
            self.identity,
            self.owner,
            self.goal,
            balance,
            guard,
            &self.state.read(),
        )
    }

    // -------------------------------------------------------------------------
    // Operations shared by both variants
    // -------------------------------------------------------------------------

    pub(crate) fn contribute(&self, caller: Identity, amount: U256) -> Result<U256, LedgerError> {
        let _serial = self.serialize();
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        if let Some(deadline) = self.deadline {
            let now = self.chain.now();
            if now >= deadline {
                return Err(LedgerError::CampaignEnded { deadline, now });
            }
        }

        self.atomically("contribute", || {
            let total_raised = self.state.read().total_raised();
            let accepted = admit_contribution(self.policy, self.goal, total_raised, amount)?;
            self.chain.attach_value(caller, self.identity, accepted)?;
            let total_raised = self.state.write().record_contribution(caller, accepted)?;
            debug!(
                ledger = %self.identity,
                contributor = %caller,
                amount = %accepted,
                %total_raised,
                "Contribution recorded"
            );
            Ok(accepted)
        })
    }

    pub(crate) fn receive_direct(&self, caller: Identity, amount: U256) -> Result<(), LedgerError> {
        let _serial = self.serialize();
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }

        self.atomically("receive_direct", || {
            self.chain.attach_value(caller, self.identity, amount)?;
            self.state.write().record_direct_deposit(caller, amount)?;
            debug!(ledger = %self.identity, from = %caller, %amount, "Direct deposit received");
            Ok(())
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
