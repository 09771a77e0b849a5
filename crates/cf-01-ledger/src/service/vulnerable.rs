//! # Vulnerable Crowdfund
//!
//! Reference implementation of three classic flaws:
//!
//! | Operation | Flaw |
//! |-----------|------|
//! | `request_refund` | transfers before zeroing the entry; a recipient may re-enter |
//! | `refund_all` | one declined transfer reverts the whole bulk refund |
//! | `withdraw` | no caller check; anyone drains the balance |
//!
//! Atomicity still holds for every call. The flaws are in the order of
//! effects and in missing checks, not in rollback.

use super::LedgerCore;
use crate::domain::entities::{
    GuardState, LedgerConfig, LedgerSnapshot, LedgerVariant, RefundReport, RefundedEntry,
};
use crate::domain::value_objects::{Identity, U256};
use crate::errors::LedgerError;
use crate::ports::inbound::CrowdfundApi;
use crate::ports::outbound::SharedChain;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Ledger with transfer-then-zero refunds and an unauthenticated withdraw.
pub struct VulnerableCrowdfund {
    core: LedgerCore,
}

impl VulnerableCrowdfund {
    /// Deploys a vulnerable ledger owned by `owner`.
    pub fn deploy(chain: SharedChain, owner: Identity, config: LedgerConfig) -> Arc<dyn CrowdfundApi> {
        Arc::new(Self {
            core: LedgerCore::new(chain, owner, &config, LedgerVariant::Vulnerable),
        })
    }

    /// Sends `amount` to `contributor`, then books the refund.
    fn pay_then_book(&self, contributor: Identity, amount: U256) -> Result<(), LedgerError> {
        self.core
            .chain
            .send_value(self.core.identity(), contributor, amount)?;

        let mut state = self.core.state.write();
        state.take_contribution(&contributor);
        state.debit_total(amount)?;
        state.record_refund(contributor, amount);
        Ok(())
    }
}

impl CrowdfundApi for VulnerableCrowdfund {
    impl_ledger_reads!();

    fn guard_state(&self) -> GuardState {
        GuardState::Idle
    }

    fn snapshot(&self) -> LedgerSnapshot {
        self.core.snapshot(GuardState::Idle)
    }

    #[instrument(skip(self), fields(ledger = %self.core.identity()))]
    fn request_refund(&self, caller: Identity) -> Result<U256, LedgerError> {
        let _serial = self.core.serialize();
        self.core.atomically("request_refund", || {
            let amount = self.core.contribution_of(&caller);
            if amount.is_zero() {
                return Err(LedgerError::UnknownOrEmptyContribution(caller));
            }
            self.pay_then_book(caller, amount)?;
            debug!(contributor = %caller, %amount, "Refund sent");
            Ok(amount)
        })
    }

    #[instrument(skip(self), fields(ledger = %self.core.identity()))]
    fn refund_all(&self, caller: Identity) -> Result<RefundReport, LedgerError> {
        let _serial = self.core.serialize();
        self.core.atomically("refund_all", || {
            let mut report = RefundReport::default();
            for contributor in self.core.contributors() {
                let amount = self.core.contribution_of(&contributor);
                if amount.is_zero() {
                    continue;
                }
                self.pay_then_book(contributor, amount)?;
                report.refunded.push(RefundedEntry {
                    contributor,
                    amount,
                });
            }
            debug!(
                refunded = report.refunded.len(),
                total = %report.total_refunded(),
                "Bulk refund completed"
            );
            Ok(report)
        })
    }

    #[instrument(skip(self), fields(ledger = %self.core.identity()))]
    fn withdraw(&self, caller: Identity) -> Result<U256, LedgerError> {
        let _serial = self.core.serialize();
        self.core.atomically("withdraw", || {
            let amount = self.core.balance();
            self.core
                .chain
                .send_value(self.core.identity(), caller, amount)
                .map_err(LedgerError::from_withdrawal)?;
            self.core.state.write().emit_withdrawn(caller, amount);
            if caller != self.core.owner() {
                warn!(%caller, owner = %self.core.owner(), %amount, "Balance withdrawn by non-owner");
            }
            Ok(amount)
        })
    }
}
