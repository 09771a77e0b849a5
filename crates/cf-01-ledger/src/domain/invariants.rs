//! # Domain Invariants
//!
//! Accounting invariants checked against a [`LedgerSnapshot`] at quiescent
//! points (no call in flight). The secure variant keeps all of them; the
//! vulnerable variant is expected to break some under attack, and the
//! scenario harness uses these checks to observe that.
//!
//! - INVARIANT-1: Accounting (`total_raised == sum(contributions)`)
//! - INVARIANT-2: Custody (`balance + withdrawn == total_raised + direct_deposits`)
//! - INVARIANT-3: Contributor Roster (no duplicates, covers every contribution)
//! - INVARIANT-4: Idle Guard

use crate::domain::entities::{GuardState, LedgerSnapshot};
use crate::domain::value_objects::{Identity, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// INVARIANT-1: Accounting
///
/// `total_raised` equals the sum of all recorded contributions.
#[must_use]
pub fn check_accounting_invariant(snapshot: &LedgerSnapshot) -> bool {
    sum_contributions(snapshot) == Some(snapshot.total_raised)
}

/// INVARIANT-2: Custody
///
/// Value held plus value booked out equals value booked in.
#[must_use]
pub fn check_custody_invariant(snapshot: &LedgerSnapshot) -> bool {
    let held = snapshot.balance.checked_add(snapshot.withdrawn);
    let booked = snapshot.total_raised.checked_add(snapshot.direct_deposits);
    held.is_some() && held == booked
}

/// INVARIANT-3: Contributor Roster
#[must_use]
pub fn check_roster_invariant(snapshot: &LedgerSnapshot) -> bool {
    let mut seen = HashSet::with_capacity(snapshot.contributors.len());
    let unique = snapshot.contributors.iter().all(|id| seen.insert(*id));
    let covered = snapshot
        .contributions
        .iter()
        .all(|(id, amount)| !amount.is_zero() && seen.contains(id));
    unique && covered
}

/// INVARIANT-4: Idle Guard
///
/// No guarded operation can be executing when nothing is in flight.
#[must_use]
pub fn check_idle_guard_invariant(snapshot: &LedgerSnapshot) -> bool {
    snapshot.guard == GuardState::Idle
}

fn sum_contributions(snapshot: &LedgerSnapshot) -> Option<U256> {
    snapshot
        .contributions
        .iter()
        .try_fold(U256::zero(), |acc, (_, amount)| acc.checked_add(*amount))
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(snapshot: &LedgerSnapshot) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_accounting_invariant(snapshot) {
        violations.push(InvariantViolation::Accounting {
            total_raised: snapshot.total_raised,
            sum_contributions: sum_contributions(snapshot).unwrap_or(U256::MAX),
        });
    }

    if !check_custody_invariant(snapshot) {
        violations.push(InvariantViolation::Custody {
            balance: snapshot.balance,
            withdrawn: snapshot.withdrawn,
            total_raised: snapshot.total_raised,
            direct_deposits: snapshot.direct_deposits,
        });
    }

    if !check_roster_invariant(snapshot) {
        let missing = snapshot
            .contributions
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !snapshot.contributors.contains(id))
            .collect();
        violations.push(InvariantViolation::Roster { missing });
    }

    if !check_idle_guard_invariant(snapshot) {
        violations.push(InvariantViolation::GuardHeld);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "violations", rename_all = "snake_case")]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations found, empty when valid.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(v) => v,
        }
    }

    /// Returns true if the accounting invariant was violated.
    #[must_use]
    pub fn breaks_accounting(&self) -> bool {
        self.violations()
            .iter()
            .any(|v| matches!(v, InvariantViolation::Accounting { .. }))
    }

    /// Returns true if the custody invariant was violated.
    #[must_use]
    pub fn breaks_custody(&self) -> bool {
        self.violations()
            .iter()
            .any(|v| matches!(v, InvariantViolation::Custody { .. }))
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "invariant", rename_all = "snake_case")]
pub enum InvariantViolation {
    /// `total_raised` differs from the contributions sum.
    Accounting {
        /// Booked total.
        total_raised: U256,
        /// Sum of recorded contributions.
        sum_contributions: U256,
    },
    /// Held value does not match booked value.
    Custody {
        /// Value the ledger holds.
        balance: U256,
        /// Value withdrawn by the owner.
        withdrawn: U256,
        /// Booked total.
        total_raised: U256,
        /// Value received outside `contribute`.
        direct_deposits: U256,
    },
    /// Roster has duplicates or misses contributors.
    Roster {
        /// Contributors with an entry but no roster slot.
        missing: Vec<Identity>,
    },
    /// Guard still held at a quiescent point.
    GuardHeld,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accounting {
                total_raised,
                sum_contributions,
            } => write!(
                f,
                "accounting broken: total_raised {total_raised} != sum(contributions) {sum_contributions}"
            ),
            Self::Custody {
                balance,
                withdrawn,
                total_raised,
                direct_deposits,
            } => write!(
                f,
                "custody broken: balance {balance} + withdrawn {withdrawn} != total_raised {total_raised} + direct {direct_deposits}"
            ),
            Self::Roster { missing } => {
                write!(f, "contributor roster broken: {} missing", missing.len())
            }
            Self::GuardHeld => write!(f, "reentrancy guard held at quiescence"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
