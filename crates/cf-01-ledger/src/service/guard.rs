//! # Reentrancy Guard
//!
//! A single in-progress flag per ledger instance. It is not keyed by caller
//! or thread: while any guarded operation of a ledger is executing, every
//! nested entry into a guarded operation of that same ledger fails.

use crate::domain::entities::GuardState;
use crate::errors::LedgerError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-ledger `{Idle, InRefund}` flag.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    entered: AtomicBool,
}

impl ReentrancyLock {
    /// Creates an idle lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves Idle -> InRefund, or fails with [`LedgerError::ReentrantCall`].
    ///
    /// The returned guard moves the lock back to Idle when dropped, on every
    /// exit path of the guarded operation.
    pub fn enter(&self) -> Result<ReentrancyGuard<'_>, LedgerError> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LedgerError::ReentrantCall)?;
        Ok(ReentrancyGuard { lock: self })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GuardState {
        if self.entered.load(Ordering::Acquire) {
            GuardState::InRefund
        } else {
            GuardState::Idle
        }
    }
}

/// Scoped acquisition of a [`ReentrancyLock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ReentrancyGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered.store(false, Ordering::Release);
    }
}
