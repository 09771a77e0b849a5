//! # Driven Ports (SPI - Outbound)
//!
//! These are the interfaces the ledger depends on:
//! - Value custody and transfer (the chain)
//! - Value-receipt hooks of recipients
//!
//! Dependencies point INWARD: adapters implement these traits.

use crate::domain::value_objects::{Identity, U256};
use crate::errors::{ReceiveError, TransferError};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

// =============================================================================
// VALUE RECEIVER (recipient hook)
// =============================================================================

/// Code that runs when an identity receives value through
/// [`ChainAccess::send_value`].
///
/// This is the single extension point through which a recipient can react to
/// an outbound transfer, including calling back into the sender. Returning an
/// error declines the value; the chain then undoes every effect of the send.
///
/// Identities without a registered receiver accept all value.
pub trait ValueReceiver: Send + Sync {
    /// Called after `amount` has been credited to the receiver.
    fn on_value_received(&self, from: Identity, amount: U256) -> Result<(), ReceiveError>;
}

// =============================================================================
// BALANCE SNAPSHOT
// =============================================================================

/// Copy of every balance on the chain, used to roll back a failed call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    balances: HashMap<Identity, U256>,
}

impl BalanceSnapshot {
    /// Wraps a balance table.
    #[must_use]
    pub fn new(balances: HashMap<Identity, U256>) -> Self {
        Self { balances }
    }

    /// Balance of `id` at snapshot time.
    #[must_use]
    pub fn balance_of(&self, id: &Identity) -> U256 {
        self.balances.get(id).copied().unwrap_or_default()
    }

    /// Unwraps the balance table.
    #[must_use]
    pub fn into_inner(self) -> HashMap<Identity, U256> {
        self.balances
    }
}

// =============================================================================
// CHAIN ACCESS
// =============================================================================

/// Interface to the value-holding chain.
///
/// ## Implementation Notes
///
/// - `attach_value` models value sent as the payload of a call: the callee
///   is executing and receives it without its hook firing.
/// - `send_value` is an outbound transfer: the recipient's hook runs after
///   the credit. Implementations MUST NOT hold internal locks while the hook
///   runs, since the hook may call back into a ledger that sends again.
pub trait ChainAccess: Send + Sync {
    /// Value held by `id`.
    fn balance_of(&self, id: Identity) -> U256;

    /// Current block timestamp (unix seconds).
    fn now(&self) -> u64;

    /// Moves `amount` from `from` to `to` without running a hook.
    fn attach_value(&self, from: Identity, to: Identity, amount: U256)
        -> Result<(), TransferError>;

    /// Moves `amount` from `from` to `to` and runs the recipient hook.
    ///
    /// On hook failure every balance change made since the send began is
    /// undone and [`TransferError::Rejected`] is returned.
    fn send_value(&self, from: Identity, to: Identity, amount: U256) -> Result<(), TransferError>;

    /// Captures all balances.
    fn snapshot(&self) -> BalanceSnapshot;

    /// Replaces all balances with `snapshot`.
    fn restore(&self, snapshot: BalanceSnapshot);

    /// Reserves a fresh contract identity for `deployer`.
    fn deploy_address(&self, deployer: Identity) -> Identity;

    /// Installs the receipt hook of `id`.
    fn register_receiver(&self, id: Identity, receiver: Weak<dyn ValueReceiver>);

    /// Whether `id` has a live receipt hook.
    fn has_receiver(&self, id: Identity) -> bool;
}

/// Shared handle to a chain.
pub type SharedChain = Arc<dyn ChainAccess>;

// =============================================================================
// TESTS
// =============================================================================
