//! # Error Types
//!
//! All error types for ledger operations and value transfers.

use crate::domain::value_objects::{Identity, U256};
use thiserror::Error;

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors returned by ledger operations.
///
/// Every ledger operation that returns one of these has left ledger storage
/// and chain balances exactly as they were when the call began.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Zero amount.
    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Refund requested with nothing to refund.
    #[error("no contribution to refund for {0}")]
    UnknownOrEmptyContribution(Identity),

    /// Privileged withdrawal by a non-owner.
    #[error("unauthorized: {caller} is not the owner {owner}")]
    Unauthorized {
        /// Identity that attempted the withdrawal.
        caller: Identity,
        /// The ledger's owner.
        owner: Identity,
    },

    /// Nested call into a guarded operation.
    #[error("reentrant call")]
    ReentrantCall,

    /// A contributor's receipt hook declined its refund.
    #[error("refund blocked by contributor {recipient}: {reason}")]
    TransferRejected {
        /// Contributor being refunded.
        recipient: Identity,
        /// Reason given by the hook.
        reason: String,
    },

    /// The withdrawing owner's receipt hook declined the balance.
    #[error("withdrawal to {recipient} rejected: {reason}")]
    WithdrawalRejected {
        /// Identity the balance was sent to.
        recipient: Identity,
        /// Reason given by the hook.
        reason: String,
    },

    /// The sender does not hold enough value.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Value the transfer needs.
        required: U256,
        /// Value the sender holds.
        available: U256,
    },

    /// Contribution after the campaign deadline.
    #[error("campaign ended at {deadline}, now {now}")]
    CampaignEnded {
        /// Deadline timestamp in seconds.
        deadline: u64,
        /// Chain time of the call.
        now: u64,
    },

    /// Contribution refused by the over-goal policy.
    #[error("goal reached: raised {total_raised} of {goal}")]
    GoalReached {
        /// Funding goal.
        goal: U256,
        /// Total raised at the time of the call.
        total_raised: U256,
    },

    /// Contribution would take the total past the goal.
    #[error("goal exceeded: {total_raised} + {amount} > {goal}")]
    GoalExceeded {
        /// Funding goal.
        goal: U256,
        /// Total raised at the time of the call.
        total_raised: U256,
        /// Amount offered.
        amount: U256,
    },

    /// Checked arithmetic failed.
    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),
}

impl LedgerError {
    /// Returns true if this error came from the reentrancy guard.
    #[must_use]
    pub fn is_reentrant_call(&self) -> bool {
        matches!(self, Self::ReentrantCall)
    }

    /// Returns true if a recipient declined value.
    #[must_use]
    pub fn is_transfer_rejected(&self) -> bool {
        matches!(self, Self::TransferRejected { .. } | Self::WithdrawalRejected { .. })
    }

    /// Converts a failed balance withdrawal. A declined transfer names the
    /// withdrawal instead of a refund.
    #[must_use]
    pub fn from_withdrawal(err: TransferError) -> Self {
        match err {
            TransferError::Rejected { recipient, reason } => Self::WithdrawalRejected { recipient, reason },
            other => other.into(),
        }
    }
}

// =============================================================================
// TRANSFER ERRORS
// =============================================================================

/// Errors from moving value on the chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Sender balance too low.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount being sent.
        required: U256,
        /// Sender's balance.
        available: U256,
    },

    /// Recipient hook declined the value. All effects of the send were undone.
    #[error("transfer rejected by {recipient}: {reason}")]
    Rejected {
        /// Identity whose hook declined.
        recipient: Identity,
        /// Reason given by the hook.
        reason: String,
    },

    /// Recipient balance would overflow.
    #[error("balance overflow for {0}")]
    Overflow(Identity),
}

impl From<TransferError> for LedgerError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientBalance {
                required,
                available,
            } => LedgerError::InsufficientBalance {
                required,
                available,
            },
            TransferError::Rejected { recipient, reason } => {
                LedgerError::TransferRejected { recipient, reason }
            }
            TransferError::Overflow(_) => LedgerError::ArithmeticOverflow("balance"),
        }
    }
}

// =============================================================================
// RECEIVE ERRORS
// =============================================================================

/// Returned by a value-receipt hook to decline incoming value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ReceiveError {
    /// Why the value was declined.
    pub reason: String,
}

impl ReceiveError {
    /// Creates a rejection with a reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
