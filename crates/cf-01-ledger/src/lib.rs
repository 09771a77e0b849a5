//! # CF-01 Crowdfund Ledger - Value Custody Subsystem
//!
//! **Subsystem ID:** 1
//! **Status:** Lab reference
//!
//! ## Purpose
//!
//! A ledger that accepts contributions toward a funding goal, refunds them,
//! and lets its owner withdraw the pooled balance. It ships in two variants
//! behind one interface: a deliberately flawed one and a hardened one, so
//! that the adversaries in `cf-02-adversaries` can be run against both.
//!
//! ## Domain Invariants
//!
//! | # | Invariant | Enforcement Location |
//! |---|-----------|---------------------|
//! | 1 | Accounting: `total_raised == sum(contributions)` | `domain/invariants.rs` - `check_accounting_invariant()` |
//! | 2 | Custody: `balance + withdrawn == total_raised + direct_deposits` | `domain/invariants.rs` - `check_custody_invariant()` |
//! | 3 | Roster: every non-zero entry is listed in the roster | `domain/invariants.rs` - `check_roster_invariant()` |
//! | 4 | Guard released between calls | `domain/invariants.rs` - `check_idle_guard_invariant()` |
//!
//! The vulnerable variant breaks 1 under reentrancy and 2 under an
//! unauthorized withdrawal. The secure variant keeps all four.
//!
//! ## Variants
//!
//! | Operation | Vulnerable | Secure |
//! |-----------|------------|--------|
//! | `request_refund` | transfer, then zero | zero, then transfer, under guard |
//! | `refund_all` | all-or-nothing | skip and record declined contributors |
//! | `withdraw` | anyone | owner only |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `ChainAccess` | Hold and move value, run recipient hooks |
//! | `ValueReceiver` | Recipient code invoked by an outbound transfer |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Ledger core | `service/mod.rs` | Serialization, atomic calls, contribute |
//! | Guard | `service/guard.rs` | Per-ledger reentrancy lock |
//! | Chain | `adapters/chain.rs` | In-memory balances, hooks, clock |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cf_01_ledger::prelude::*;
//!
//! let chain = Arc::new(InMemoryChain::new());
//! chain.fund(alice, units::ether(10))?;
//! let ledger = deploy(chain.clone(), owner, LedgerConfig::default(), LedgerVariant::Secure);
//!
//! ledger.contribute(alice, units::ether(1))?;
//! ledger.request_refund(alice)?;
//! assert!(check_all_invariants(&ledger.snapshot()).is_valid());
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        CrowdfundInfo, FailedRefund, GuardState, LedgerConfig, LedgerSnapshot, LedgerState,
        LedgerVariant, OverGoalPolicy, RefundReport, RefundedEntry,
    };

    // Value objects
    pub use crate::domain::value_objects::{units, Identity, U256};

    // Domain services
    pub use crate::domain::services::{admit_contribution, derive_contract_identity, keccak256};

    // Invariants
    pub use crate::domain::invariants::{
        check_accounting_invariant, check_all_invariants, check_custody_invariant,
        InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{CrowdfundApi, OperationOutcome};
    pub use crate::ports::outbound::{BalanceSnapshot, ChainAccess, SharedChain, ValueReceiver};

    // Events
    pub use crate::events::LedgerEvent;

    // Errors
    pub use crate::errors::{LedgerError, ReceiveError, TransferError};

    // Adapters
    pub use crate::adapters::InMemoryChain;

    // Service
    pub use crate::service::{deploy, SecureCrowdfund, VulnerableCrowdfund};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 1;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Crowdfund Ledger";

// =============================================================================
// TESTS
// =============================================================================
