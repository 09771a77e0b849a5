//! # CF-02 Adversaries - Attack Subsystem
//!
//! **Subsystem ID:** 2
//! **Status:** Lab reference
//!
//! ## Purpose
//!
//! Adversarial clients of the crowdfund ledger, and the harness that runs
//! them against both ledger variants.
//!
//! ## Attacks
//!
//! | Attack | Component | Vulnerable ledger | Secure ledger |
//! |--------|-----------|-------------------|---------------|
//! | Reentrant refund | `adapters/reentrant.rs` | drained | one refund, re-entry refused |
//! | Refund DoS | `adapters/dos.rs` | `refund_all` reverts for everyone | attacker skipped, others refunded |
//! | Access control | `service/probe.rs` | anyone withdraws | `Unauthorized` |
//!
//! ## Interaction Model
//!
//! Attacker contracts never touch ledger storage. They call the ledger
//! through `CrowdfundApi` and react to the ledger's outbound transfer
//! through their `ValueReceiver` hook, which the chain invokes on every
//! `send_value` to the contract.
//!
//! ## Usage Example
//!
//! ```ignore
//! use cf_02_adversaries::prelude::*;
//!
//! for report in run_all(&HarnessConfig::default()) {
//!     println!("{report}");
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod harness;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Configuration
    pub use crate::config::{AttackConfig, HarnessConfig, DEFAULT_MAX_REENTRY_DEPTH};

    // Domain
    pub use crate::domain::outcomes::{
        BalanceDelta, ContributionDelta, DosOutcome, ProbeOutcome, ReentrancyOutcome,
    };
    pub use crate::domain::protocol::ReentrancyProtocol;

    // Ports
    pub use crate::ports::AttackerContract;

    // Adapters
    pub use crate::adapters::{DosAttacker, ReentrantAttacker};

    // Service
    pub use crate::service::{AccessControlProbe, AttackOrchestrator};

    // Harness
    pub use crate::harness::{run_all, run_variant, Check, Fixture, Scenario, ScenarioReport};

    // Errors
    pub use crate::errors::AttackError;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 2;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Adversaries";
