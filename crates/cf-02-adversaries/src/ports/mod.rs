//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Port**: `AttackerContract`, the surface every attacker
//!   contract shares with its controlling identity.
//! - **Driven Ports**: reused from the ledger crate (`CrowdfundApi` is the
//!   target, `ChainAccess` holds the attacker's value, `ValueReceiver` is
//!   the hook every attacker installs).

use crate::errors::AttackError;
use cf_01_ledger::domain::value_objects::{Identity, U256};
use cf_01_ledger::ports::outbound::ValueReceiver;

/// A contract-like caller controlled by one external identity.
pub trait AttackerContract: ValueReceiver {
    /// The contract's own identity on the chain.
    fn identity(&self) -> Identity;

    /// Controlling identity.
    fn owner(&self) -> Identity;

    /// Value held by the contract itself.
    fn held_balance(&self) -> U256;

    /// Sends everything the contract holds to its controller.
    fn withdraw_loot(&self, caller: Identity) -> Result<U256, AttackError>;
}
