//! # Ledger Events
//!
//! Observations emitted by ledger operations. Events are part of ledger
//! storage: a call that fails discards the events it emitted together with
//! the rest of its state changes.

use crate::domain::value_objects::{Identity, U256};
use serde::{Deserialize, Serialize};

/// Event emitted by a ledger operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A contribution was recorded.
    Contributed {
        /// Contributing identity.
        contributor: Identity,
        /// Amount recorded.
        amount: U256,
        /// Total after the contribution.
        total_raised: U256,
    },
    /// Value arrived without a contribution entry.
    DirectDeposit {
        /// Sender.
        from: Identity,
        /// Amount received.
        amount: U256,
    },
    /// A contributor was refunded.
    Refunded {
        /// Refunded identity.
        contributor: Identity,
        /// Amount sent.
        amount: U256,
    },
    /// A bulk-refund transfer was declined; the contribution stays recorded.
    RefundFailed {
        /// Contributor whose refund was declined.
        contributor: Identity,
        /// Contribution still recorded.
        amount: U256,
        /// Why the transfer failed.
        reason: String,
    },
    /// The held balance was withdrawn.
    Withdrawn {
        /// Recipient of the balance.
        to: Identity,
        /// Amount withdrawn.
        amount: U256,
    },
}

impl LedgerEvent {
    /// Short event name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Contributed { .. } => "Contributed",
            Self::DirectDeposit { .. } => "DirectDeposit",
            Self::Refunded { .. } => "Refunded",
            Self::RefundFailed { .. } => "RefundFailed",
            Self::Withdrawn { .. } => "Withdrawn",
        }
    }
}
