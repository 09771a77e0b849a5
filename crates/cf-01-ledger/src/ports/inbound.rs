//! # Driving Ports (API - Inbound)
//!
//! The operation set every ledger variant exposes. Callers (attackers, the
//! scenario harness, an external UI) hold an `Arc<dyn CrowdfundApi>` and
//! never know which variant sits behind it.

use crate::domain::entities::{
    CrowdfundInfo, GuardState, LedgerSnapshot, LedgerVariant, RefundReport,
};
use crate::domain::value_objects::{Identity, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

// =============================================================================
// CROWDFUND API
// =============================================================================

/// Primary API for a crowdfund ledger.
///
/// Every mutating operation is atomic: on `Err`, ledger storage and chain
/// balances are exactly as they were when the call began.
pub trait CrowdfundApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Deployed variant.
    fn variant(&self) -> LedgerVariant;

    /// The ledger's own identity on the chain.
    fn identity(&self) -> Identity;

    /// Identity authorized for privileged withdrawal.
    fn owner(&self) -> Identity;

    /// Funding goal.
    fn goal(&self) -> U256;

    /// Contribution deadline (unix seconds), if any.
    fn deadline(&self) -> Option<u64>;

    /// Accumulated contributions minus refunds.
    fn total_raised(&self) -> U256;

    /// Value actually held on the chain.
    fn get_balance(&self) -> U256;

    /// Recorded contribution of `id`; zero for unknown identities.
    fn contributions(&self, id: Identity) -> U256;

    /// Contributor roster in first-contribution order.
    fn get_contributors(&self) -> Vec<Identity>;

    /// Identities whose bulk refund was declined, with the amount still owed.
    fn failed_refunds(&self) -> Vec<(Identity, U256)>;

    /// Emitted events, oldest first.
    fn events(&self) -> Vec<LedgerEvent>;

    /// Current reentrancy state.
    fn guard_state(&self) -> GuardState;

    /// Full read-only view for invariant checks.
    fn snapshot(&self) -> LedgerSnapshot;

    /// `(goal, total_raised, balance)` in one read.
    fn info(&self) -> CrowdfundInfo {
        CrowdfundInfo {
            goal: self.goal(),
            total_raised: self.total_raised(),
            balance: self.get_balance(),
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Records a contribution of `amount` paid by `caller`.
    ///
    /// Returns the amount actually recorded (smaller than `amount` only
    /// under [`crate::domain::OverGoalPolicy::Cap`]).
    fn contribute(&self, caller: Identity, amount: U256) -> Result<U256, LedgerError>;

    /// Accepts `amount` from `caller` without recording a contribution.
    fn receive_direct(&self, caller: Identity, amount: U256) -> Result<(), LedgerError>;

    /// Refunds the full contribution of `caller`. Returns the amount sent.
    fn request_refund(&self, caller: Identity) -> Result<U256, LedgerError>;

    /// Refunds every contributor in roster order. Any identity may trigger it.
    fn refund_all(&self, caller: Identity) -> Result<RefundReport, LedgerError>;

    /// Sends the whole held balance to `caller`. Returns the amount sent.
    fn withdraw(&self, caller: Identity) -> Result<U256, LedgerError>;
}

// =============================================================================
// OPERATION OUTCOME
// =============================================================================

/// Accepted/Failed status with a reason, for rendering to an operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The operation completed.
    Accepted,
    /// The operation failed and changed nothing.
    Failed {
        /// Error text.
        reason: String,
    },
}

impl OperationOutcome {
    /// Builds an outcome from any result.
    pub fn from_result<T, E: Display>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Accepted,
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Returns true if accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Failure reason, if failed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Accepted => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

impl std::fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let ok: Result<U256, LedgerError> = Ok(U256::one());
        assert!(OperationOutcome::from_result(&ok).is_accepted());

        let err: Result<U256, LedgerError> = Err(LedgerError::ReentrantCall);
        let outcome = OperationOutcome::from_result(&err);
        assert_eq!(outcome.reason(), Some("reentrant call"));
        assert_eq!(outcome.to_string(), "failed: reentrant call");
    }
}
