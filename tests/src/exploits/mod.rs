//! # Exploit Simulations
//!
//! Each attack runs against both ledger variants. The vulnerable variant
//! must fall to it; the secure variant must hold.

pub mod access_control;
pub mod reentrancy;
pub mod refund_dos;
