//! # Core Domain Entities
//!
//! Main business entities for the crowdfund ledger.
//! `LedgerState` is the storage a ledger owns; everything else here describes
//! how a ledger is configured or what an operation reports back.

use crate::domain::value_objects::{Identity, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// LEDGER VARIANT
// =============================================================================

/// Which implementation of the ledger interface is deployed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerVariant {
    /// Transfer-then-zero refunds, all-or-nothing bulk refund, open withdraw.
    Vulnerable,
    /// Zero-then-transfer behind a per-ledger guard, partial bulk refund,
    /// owner-only withdraw.
    Secure,
}

impl LedgerVariant {
    /// Both variants, vulnerable first.
    pub const ALL: [Self; 2] = [Self::Vulnerable, Self::Secure];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vulnerable => "vulnerable",
            Self::Secure => "secure",
        }
    }
}

impl fmt::Display for LedgerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vulnerable" => Ok(Self::Vulnerable),
            "secure" => Ok(Self::Secure),
            other => Err(format!("unknown ledger variant: {other}")),
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// What `contribute` does when the goal is (or would be) reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverGoalPolicy {
    /// Accept every positive contribution.
    #[default]
    Accept,
    /// Reject once `total_raised >= goal`.
    RejectOnceReached,
    /// Reject a contribution that would take the total past the goal.
    RejectExceeding,
    /// Accept only the part that fits under the goal.
    Cap,
}

impl FromStr for OverGoalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "accept" => Ok(Self::Accept),
            "reject_once_reached" => Ok(Self::RejectOnceReached),
            "reject_exceeding" => Ok(Self::RejectExceeding),
            "cap" => Ok(Self::Cap),
            other => Err(format!("unknown over-goal policy: {other}")),
        }
    }
}

/// Ledger construction parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Funding goal in wei. Immutable after deployment.
    pub goal: U256,
    /// Campaign length. `None` means contributions never close.
    pub duration_minutes: Option<u64>,
    /// Over-goal behaviour of `contribute`.
    pub over_goal_policy: OverGoalPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            goal: U256::from(100),
            duration_minutes: Some(60),
            over_goal_policy: OverGoalPolicy::Accept,
        }
    }
}

impl LedgerConfig {
    /// Deadline for a ledger deployed at `deployed_at` (unix seconds).
    #[must_use]
    pub fn deadline_from(&self, deployed_at: u64) -> Option<u64> {
        self.duration_minutes
            .map(|minutes| deployed_at.saturating_add(minutes.saturating_mul(60)))
    }
}

// =============================================================================
// GUARD STATE
// =============================================================================

/// Per-ledger reentrancy state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// No guarded operation executing.
    #[default]
    Idle,
    /// A guarded operation is executing; nested entry fails.
    InRefund,
}

// =============================================================================
// LEDGER STATE
// =============================================================================

/// Storage owned by a single ledger instance.
///
/// ## Invariants
/// - `contributors` has no duplicates and preserves first-contribution order
/// - every key of `contributions` appears in `contributors`
/// - zero contributions are removed, never stored
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    total_raised: U256,
    contributions: HashMap<Identity, U256>,
    contributors: Vec<Identity>,
    direct_deposits: U256,
    withdrawn: U256,
    failed_refunds: BTreeMap<Identity, U256>,
    events: Vec<LedgerEvent>,
}

impl LedgerState {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of recorded contributions minus refunds.
    #[must_use]
    pub fn total_raised(&self) -> U256 {
        self.total_raised
    }

    /// Recorded contribution of `id`; zero if unknown.
    #[must_use]
    pub fn contribution_of(&self, id: &Identity) -> U256 {
        self.contributions.get(id).copied().unwrap_or_default()
    }

    /// Contributor roster in insertion order.
    #[must_use]
    pub fn contributors(&self) -> &[Identity] {
        &self.contributors
    }

    /// Un-attributed direct deposits.
    #[must_use]
    pub fn direct_deposits(&self) -> U256 {
        self.direct_deposits
    }

    /// Value booked out through authorized withdrawals.
    #[must_use]
    pub fn withdrawn(&self) -> U256 {
        self.withdrawn
    }

    /// Identities whose bulk refund was declined, with the amount still owed.
    #[must_use]
    pub fn failed_refunds(&self) -> &BTreeMap<Identity, U256> {
        &self.failed_refunds
    }

    /// Emitted events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Sum over the contributions map, `None` on overflow.
    #[must_use]
    pub fn sum_contributions(&self) -> Option<U256> {
        self.contributions
            .values()
            .try_fold(U256::zero(), |acc, v| acc.checked_add(*v))
    }

    /// Contributions in roster order, skipping refunded identities.
    #[must_use]
    pub fn ordered_contributions(&self) -> Vec<(Identity, U256)> {
        self.contributors
            .iter()
            .filter_map(|id| self.contributions.get(id).map(|amount| (*id, *amount)))
            .collect()
    }

    /// Records `amount` from `caller`. Returns the new `total_raised`.
    pub fn record_contribution(
        &mut self,
        caller: Identity,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        let current = self.contribution_of(&caller);
        let updated = current
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("contributions"))?;
        let total = self
            .total_raised
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("total_raised"))?;

        if !self.contributors.contains(&caller) {
            self.contributors.push(caller);
        }
        self.contributions.insert(caller, updated);
        self.total_raised = total;
        self.events.push(LedgerEvent::Contributed {
            contributor: caller,
            amount,
            total_raised: total,
        });
        Ok(total)
    }

    /// Clears the contribution of `id` and returns what it was.
    ///
    /// `total_raised` is not touched; callers decide when to debit it.
    pub fn take_contribution(&mut self, id: &Identity) -> U256 {
        self.contributions.remove(id).unwrap_or_default()
    }

    /// Debits `total_raised` with checked arithmetic.
    pub fn debit_total(&mut self, amount: U256) -> Result<(), LedgerError> {
        self.total_raised = self
            .total_raised
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow("total_raised"))?;
        Ok(())
    }

    /// Books a successful refund.
    pub fn record_refund(&mut self, contributor: Identity, amount: U256) {
        self.failed_refunds.remove(&contributor);
        self.events.push(LedgerEvent::Refunded {
            contributor,
            amount,
        });
    }

    /// Books a declined bulk-refund transfer.
    pub fn record_refund_failure(&mut self, contributor: Identity, amount: U256, reason: String) {
        self.failed_refunds.insert(contributor, amount);
        self.events.push(LedgerEvent::RefundFailed {
            contributor,
            amount,
            reason,
        });
    }

    /// Books an un-attributed deposit.
    pub fn record_direct_deposit(&mut self, from: Identity, amount: U256) -> Result<(), LedgerError> {
        self.direct_deposits = self
            .direct_deposits
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("direct_deposits"))?;
        self.events.push(LedgerEvent::DirectDeposit { from, amount });
        Ok(())
    }

    /// Books an authorized withdrawal against custody.
    pub fn record_withdrawal(&mut self, to: Identity, amount: U256) -> Result<(), LedgerError> {
        self.withdrawn = self
            .withdrawn
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("withdrawn"))?;
        self.events.push(LedgerEvent::Withdrawn { to, amount });
        Ok(())
    }

    /// Emits a withdrawal event without booking it.
    pub fn emit_withdrawn(&mut self, to: Identity, amount: U256) {
        self.events.push(LedgerEvent::Withdrawn { to, amount });
    }
}

// =============================================================================
// SNAPSHOT & REPORTS
// =============================================================================

/// Read-only view of a ledger at a quiescent point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Deployed variant.
    pub variant: LedgerVariant,
    /// Ledger identity on the chain.
    pub identity: Identity,
    /// Owner identity.
    pub owner: Identity,
    /// Funding goal.
    pub goal: U256,
    /// Value actually held on the chain.
    pub balance: U256,
    /// Accumulated `total_raised`.
    pub total_raised: U256,
    /// Contributions in roster order.
    pub contributions: Vec<(Identity, U256)>,
    /// Roster in insertion order.
    pub contributors: Vec<Identity>,
    /// Un-attributed deposits.
    pub direct_deposits: U256,
    /// Booked withdrawals.
    pub withdrawn: U256,
    /// Reentrancy state.
    pub guard: GuardState,
}

impl LedgerSnapshot {
    /// Builds a snapshot from storage plus chain-held balance.
    #[must_use]
    pub fn capture(
        variant: LedgerVariant,
        identity: Identity,
        owner: Identity,
        goal: U256,
        balance: U256,
        guard: GuardState,
        state: &LedgerState,
    ) -> Self {
        Self {
            variant,
            identity,
            owner,
            goal,
            balance,
            total_raised: state.total_raised(),
            contributions: state.ordered_contributions(),
            contributors: state.contributors().to_vec(),
            direct_deposits: state.direct_deposits(),
            withdrawn: state.withdrawn(),
            guard,
        }
    }

    /// Recorded contribution of `id`; zero if unknown.
    #[must_use]
    pub fn contribution_of(&self, id: &Identity) -> U256 {
        self.contributions
            .iter()
            .find(|(who, _)| who == id)
            .map(|(_, amount)| *amount)
            .unwrap_or_default()
    }
}

/// `(goal, total_raised, balance)` in a single read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrowdfundInfo {
    /// Funding goal.
    pub goal: U256,
    /// Accumulated contributions.
    pub total_raised: U256,
    /// Value actually held.
    pub balance: U256,
}

/// A contributor refunded by `refund_all`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundedEntry {
    /// Refunded identity.
    pub contributor: Identity,
    /// Amount sent.
    pub amount: U256,
}

/// A contributor whose `refund_all` transfer was declined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRefund {
    /// Identity that declined.
    pub contributor: Identity,
    /// Amount still recorded.
    pub amount: U256,
    /// Decline reason.
    pub reason: String,
}

/// Result of a bulk refund.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReport {
    /// Successful refunds in roster order.
    pub refunded: Vec<RefundedEntry>,
    /// Declined refunds in roster order (secure variant only).
    pub failed: Vec<FailedRefund>,
}

impl RefundReport {
    /// Total value sent out.
    #[must_use]
    pub fn total_refunded(&self) -> U256 {
        self.refunded
            .iter()
            .fold(U256::zero(), |acc, e| acc.saturating_add(e.amount))
    }

    /// True when no transfer was declined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// True if `id` was refunded.
    #[must_use]
    pub fn was_refunded(&self, id: &Identity) -> bool {
        self.refunded.iter().any(|e| e.contributor == *id)
    }

    /// True if `id` declined its refund.
    #[must_use]
    pub fn has_failed(&self, id: &Identity) -> bool {
        self.failed.iter().any(|e| e.contributor == *id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
