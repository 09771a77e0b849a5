//! Access-control probe: any identity calling `withdraw` for itself.

use crate::domain::outcomes::{BalanceDelta, ProbeOutcome};
use cf_01_ledger::domain::value_objects::Identity;
use cf_01_ledger::ports::inbound::{CrowdfundApi, OperationOutcome};
use cf_01_ledger::ports::outbound::SharedChain;
use tracing::{info, instrument};

/// A caller that attempts the privileged withdrawal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessControlProbe {
    caller: Identity,
}

impl AccessControlProbe {
    /// Probe acting as `caller`.
    #[must_use]
    pub fn new(caller: Identity) -> Self {
        Self { caller }
    }

    /// Probing identity.
    #[must_use]
    pub fn caller(&self) -> Identity {
        self.caller
    }

    /// Calls `ledger.withdraw(caller)` and records what moved.
    #[instrument(skip(self, chain, ledger), fields(caller = %self.caller, ledger = %ledger.identity()))]
    pub fn probe_withdraw(&self, chain: &SharedChain, ledger: &dyn CrowdfundApi) -> ProbeOutcome {
        let ledger_before = ledger.get_balance();
        let caller_before = chain.balance_of(self.caller);

        let result = ledger.withdraw(self.caller);
        let withdraw = OperationOutcome::from_result(&result);
        info!(outcome = %withdraw, "Withdraw probed");

        ProbeOutcome {
            variant: ledger.variant(),
            caller: self.caller,
            withdraw,
            ledger_balance: BalanceDelta::new(ledger_before, ledger.get_balance()),
            caller_balance: BalanceDelta::new(caller_before, chain.balance_of(self.caller)),
            total_raised_after: ledger.total_raised(),
        }
    }
}
