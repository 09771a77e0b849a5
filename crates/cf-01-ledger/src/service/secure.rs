//! # Secure Crowdfund
//!
//! Same interface as the vulnerable ledger with the three flaws closed:
//!
//! - Refunds zero the entry before the transfer, behind a per-ledger
//!   reentrancy lock shared by `request_refund`, `refund_all` and `withdraw`.
//! - `refund_all` skips contributors that decline, records them in
//!   `failed_refunds`, and keeps going.
//! - `withdraw` is owner-only and booked against custody.

use super::guard::ReentrancyLock;
use super::LedgerCore;
use crate::domain::entities::{
    FailedRefund, GuardState, LedgerConfig, LedgerSnapshot, LedgerVariant, RefundReport,
    RefundedEntry,
};
use crate::domain::value_objects::{Identity, U256};
use crate::errors::{LedgerError, TransferError};
use crate::ports::inbound::CrowdfundApi;
use crate::ports::outbound::SharedChain;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Ledger with checks-effects-interactions refunds and an owner-only withdraw.
pub struct SecureCrowdfund {
    core: LedgerCore,
    lock: ReentrancyLock,
}

impl SecureCrowdfund {
    /// Deploys a secure ledger owned by `owner`.
    pub fn deploy(chain: SharedChain, owner: Identity, config: LedgerConfig) -> Arc<dyn CrowdfundApi> {
        Arc::new(Self {
            core: LedgerCore::new(chain, owner, &config, LedgerVariant::Secure),
            lock: ReentrancyLock::new(),
        })
    }

    /// Zeroes the entry of `contributor` and debits the total.
    fn book_refund(&self, contributor: Identity, amount: U256) -> Result<(), LedgerError> {
        let mut state = self.core.state.write();
        state.take_contribution(&contributor);
        state.debit_total(amount)
    }

    fn send(&self, to: Identity, amount: U256) -> Result<(), TransferError> {
        self.core.chain.send_value(self.core.identity(), to, amount)
    }
}

impl CrowdfundApi for SecureCrowdfund {
    impl_ledger_reads!();

    fn guard_state(&self) -> GuardState {
        self.lock.state()
    }

    fn snapshot(&self) -> LedgerSnapshot {
        self.core.snapshot(self.lock.state())
    }

    #[instrument(skip(self), fields(ledger = %self.core.identity()))]
    fn request_refund(&self, caller: Identity) -> Result<U256, LedgerError> {
        let _serial = self.core.serialize();
        let _guard = self.lock.enter()?;
        self.core.atomically("request_refund", || {
            let amount = self.core.contribution_of(&caller);
            if amount.is_zero() {
                return Err(LedgerError::UnknownOrEmptyContribution(caller));
            }
            self.book_refund(caller, amount)?;
            self.send(caller, amount)?;
            self.core.state.write().record_refund(caller, amount);
            debug!(contributor = %caller, %amount, "Refund sent");
            Ok(amount)
        })
    }

    #[instrument(skip(self), fields(ledger = %self.core.identity()))]
    fn refund_all(&self, caller: Identity) -> Result<RefundReport, LedgerError> {
        let _serial = self.core.serialize();
        let _guard = self.lock.enter()?;
        self.core.atomically("refund_all", || {
            let mut report = RefundReport::default();
            for contributor in self.core.contributors() {
                let amount = self.core.contribution_of(&contributor);
                if amount.is_zero() {
                    continue;
                }

                let checkpoint = self.core.checkpoint();
                self.book_refund(contributor, amount)?;
                match self.send(contributor, amount) {
                    Ok(()) => {
                        self.core.state.write().record_refund(contributor, amount);
                        report.refunded.push(RefundedEntry {
                            contributor,
                            amount,
                        });
                    }
                    Err(err @ TransferError::Rejected { .. }) => {
                        self.core.rollback(checkpoint);
                        let reason = LedgerError::from(err).to_string();
                        warn!(%contributor, %amount, %reason, "Refund declined; contributor skipped");
                        self.core
                            .state
                            .write()
                            .record_refund_failure(contributor, amount, reason.clone());
                        report.failed.push(FailedRefund {
                            contributor,
                            amount,
                            reason,
                        });
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            debug!(
                refunded = report.refunded.len(),
                failed = report.failed.len(),
                total = %report.total_refunded(),
                "Bulk refund completed"
            );
            Ok(report)
        })
    }

    #[instrument(skip(self), fields(ledger = %self.core.identity()))]
    fn withdraw(&self, caller: Identity) -> Result<U256, LedgerError> {
        let _serial = self.core.serialize();
        let owner = self.core.owner();
        if caller != owner {
            debug!(%caller, %owner, "Withdraw refused");
            return Err(LedgerError::Unauthorized { caller, owner });
        }
        let _guard = self.lock.enter()?;
        self.core.atomically("withdraw", || {
            let amount = self.core.balance();
            self.core.state.write().record_withdrawal(caller, amount)?;
            self.send(caller, amount).map_err(LedgerError::from_withdrawal)?;
            Ok(amount)
        })
    }
}
