//! # Adapters Layer (Outer Hexagon)
//!
//! Attacker contracts. Each one owns a chain account and installs itself
//! as that account's receipt hook at deployment.

mod account;
pub mod dos;
pub mod reentrant;

pub use dos::{DosAttacker, REJECTION_REASON};
pub use reentrant::ReentrantAttacker;
