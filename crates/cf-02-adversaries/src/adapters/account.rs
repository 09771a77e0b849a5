//! Chain account of an attacker contract.

use crate::errors::AttackError;
use cf_01_ledger::domain::value_objects::{Identity, U256};
use cf_01_ledger::ports::inbound::CrowdfundApi;
use cf_01_ledger::ports::outbound::{SharedChain, ValueReceiver};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Identity, controller, chain handle and target of one attacker contract.
///
/// The target ledger is held weakly: the attacker points at a ledger it
/// does not own.
pub(crate) struct ContractAccount {
    pub(crate) identity: Identity,
    pub(crate) owner: Identity,
    pub(crate) chain: SharedChain,
    target: Weak<dyn CrowdfundApi>,
}

impl ContractAccount {
    /// Reserves a contract identity deployed by `owner`.
    pub(crate) fn deploy(chain: SharedChain, owner: Identity, target: &Arc<dyn CrowdfundApi>) -> Self {
        let identity = chain.deploy_address(owner);
        Self {
            identity,
            owner,
            chain,
            target: Arc::downgrade(target),
        }
    }

    /// Installs `hook` as the contract's receipt hook.
    pub(crate) fn install(&self, hook: Weak<dyn ValueReceiver>) {
        self.chain.register_receiver(self.identity, hook);
    }

    pub(crate) fn only_owner(&self, caller: Identity) -> Result<(), AttackError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(AttackError::Unauthorized {
                caller,
                owner: self.owner,
            })
        }
    }

    pub(crate) fn ledger(&self) -> Result<Arc<dyn CrowdfundApi>, AttackError> {
        self.target.upgrade().ok_or(AttackError::LedgerUnavailable)
    }

    pub(crate) fn target_identity(&self) -> Option<Identity> {
        self.target.upgrade().map(|ledger| ledger.identity())
    }

    pub(crate) fn held(&self) -> U256 {
        self.chain.balance_of(self.identity)
    }

    pub(crate) fn require_held(&self, required: U256) -> Result<(), AttackError> {
        let held = self.held();
        if held < required {
            return Err(AttackError::InsufficientFunds { required, held });
        }
        Ok(())
    }

    /// Payable entry: `caller` attaches `amount` to a call on the contract.
    pub(crate) fn accept_from_owner(&self, caller: Identity, amount: U256) -> Result<(), AttackError> {
        self.only_owner(caller)?;
        self.chain.attach_value(caller, self.identity, amount)?;
        debug!(contract = %self.identity, %amount, "Attacker contract funded");
        Ok(())
    }

    /// Sends the whole held balance to the controller.
    pub(crate) fn sweep_to_owner(&self) -> Result<U256, AttackError> {
        let amount = self.held();
        self.chain.send_value(self.identity, self.owner, amount)?;
        debug!(contract = %self.identity, owner = %self.owner, %amount, "Loot withdrawn");
        Ok(amount)
    }
}
