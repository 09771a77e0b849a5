//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the ledger to the systems it depends on.
//!
//! - Adapters implement domain ports
//! - `InMemoryChain` implements `ChainAccess`

pub mod chain;

pub use chain::*;
