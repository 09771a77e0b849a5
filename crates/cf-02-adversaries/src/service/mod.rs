//! # Service Layer
//!
//! Drives attacks against a ledger: the access-control probe and the
//! orchestrator that sequences the contract-based attacks.

pub mod orchestrator;
pub mod probe;

pub use orchestrator::AttackOrchestrator;
pub use probe::AccessControlProbe;
