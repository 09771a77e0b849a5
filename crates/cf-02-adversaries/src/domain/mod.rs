//! # Domain Layer (Inner Hexagon)
//!
//! Attack bookkeeping with no ledger or chain access.

pub mod outcomes;
pub mod protocol;

pub use outcomes::*;
pub use protocol::*;
