//! # Error Types
//!
//! Failures of attacker contract operations. Ledger and chain failures are
//! wrapped, not flattened, so a scenario can tell "the ledger refused" from
//! "the attacker was misused".

use cf_01_ledger::domain::value_objects::{Identity, U256};
use cf_01_ledger::errors::{LedgerError, TransferError};
use thiserror::Error;

/// Errors returned by attacker operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttackError {
    /// `run_attack` before `contribute_from_contract`, or with another amount.
    #[error("insufficient contributed amount: contributed {contributed}, requested {requested}")]
    OutOfOrderAttackStep {
        /// Amount the last contribution recorded.
        contributed: U256,
        /// Amount `run_attack` was called with.
        requested: U256,
    },

    /// The attacker contract does not hold enough value.
    #[error("insufficient attacker funds: required {required}, held {held}")]
    InsufficientFunds {
        /// Amount the step needs.
        required: U256,
        /// Amount the contract holds.
        held: U256,
    },

    /// Caller is not the controlling identity.
    #[error("only the attacker may call this: {caller} is not {owner}")]
    Unauthorized {
        /// Identity that made the call.
        caller: Identity,
        /// Controlling identity.
        owner: Identity,
    },

    /// Nothing to sweep.
    #[error("nothing to withdraw")]
    NothingToWithdraw,

    /// The target ledger has been dropped.
    #[error("target ledger is no longer available")]
    LedgerUnavailable,

    /// The ledger call failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A value transfer failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl AttackError {
    /// The wrapped ledger error, if any.
    #[must_use]
    pub fn ledger_error(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            _ => None,
        }
    }
}
