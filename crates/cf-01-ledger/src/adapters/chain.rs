//! # In-Memory Chain
//!
//! Value custody for every identity, receipt hooks, deployment nonces and a
//! block clock. Production would be an actual network; everything here
//! lives in process memory.

use crate::domain::services::derive_contract_identity;
use crate::domain::value_objects::{Identity, U256};
use crate::errors::TransferError;
use crate::ports::outbound::{BalanceSnapshot, ChainAccess, ValueReceiver};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;
use tracing::{debug, trace};

/// Default genesis timestamp (unix seconds).
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// In-memory chain for scenarios and tests.
pub struct InMemoryChain {
    /// Balances of every identity that ever held value.
    balances: RwLock<HashMap<Identity, U256>>,
    /// Deployment nonce per deployer.
    nonces: Mutex<HashMap<Identity, u64>>,
    /// Receipt hooks. Held weakly; a dropped hook behaves like a plain account.
    receivers: RwLock<HashMap<Identity, Weak<dyn ValueReceiver>>>,
    /// Block timestamp.
    timestamp: AtomicU64,
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::with_timestamp(GENESIS_TIMESTAMP)
    }
}

impl std::fmt::Debug for InMemoryChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryChain")
            .field("accounts", &self.balances.read().len())
            .field("receivers", &self.receivers.read().len())
            .field("timestamp", &self.now())
            .finish()
    }
}

impl InMemoryChain {
    /// Create a new empty chain at the genesis timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty chain at `timestamp`.
    #[must_use]
    pub fn with_timestamp(timestamp: u64) -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            nonces: Mutex::new(HashMap::new()),
            receivers: RwLock::new(HashMap::new()),
            timestamp: AtomicU64::new(timestamp),
        }
    }

    /// Credits `amount` to `id` out of thin air (genesis allocation).
    pub fn fund(&self, id: Identity, amount: U256) -> Result<(), TransferError> {
        let mut balances = self.balances.write();
        let entry = balances.entry(id).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(TransferError::Overflow(id))?;
        debug!(account = %id, %amount, "Funded account");
        Ok(())
    }

    /// Moves the clock forward by `secs`.
    pub fn advance_time(&self, secs: u64) {
        self.timestamp.fetch_add(secs, Ordering::SeqCst);
    }

    /// Deployment nonce of `deployer`.
    #[must_use]
    pub fn nonce_of(&self, deployer: Identity) -> u64 {
        self.nonces.lock().get(&deployer).copied().unwrap_or(0)
    }

    /// Sum of every balance. Constant across transfers.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.balances
            .read()
            .values()
            .fold(U256::zero(), |acc, v| acc.saturating_add(*v))
    }

    fn move_value(&self, from: Identity, to: Identity, amount: U256) -> Result<(), TransferError> {
        let mut balances = self.balances.write();
        let available = balances.get(&from).copied().unwrap_or_default();
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = balances
            .get(&to)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .ok_or(TransferError::Overflow(to))?;
        balances.insert(from, available - amount);
        balances.insert(to, credited);
        Ok(())
    }

    fn receiver_of(&self, id: &Identity) -> Option<std::sync::Arc<dyn ValueReceiver>> {
        self.receivers.read().get(id).and_then(Weak::upgrade)
    }
}

impl ChainAccess for InMemoryChain {
    fn balance_of(&self, id: Identity) -> U256 {
        self.balances.read().get(&id).copied().unwrap_or_default()
    }

    fn now(&self) -> u64 {
        self.timestamp.load(Ordering::SeqCst)
    }

    fn attach_value(
        &self,
        from: Identity,
        to: Identity,
        amount: U256,
    ) -> Result<(), TransferError> {
        self.move_value(from, to, amount)?;
        trace!(%from, %to, %amount, "Attached value");
        Ok(())
    }

    fn send_value(&self, from: Identity, to: Identity, amount: U256) -> Result<(), TransferError> {
        let checkpoint = self.snapshot();
        self.move_value(from, to, amount)?;
        trace!(%from, %to, %amount, "Sent value");

        // No lock is held from here on: the hook may send again.
        let Some(receiver) = self.receiver_of(&to) else {
            return Ok(());
        };
        if let Err(rejection) = receiver.on_value_received(from, amount) {
            self.restore(checkpoint);
            debug!(%from, %to, %amount, reason = %rejection, "Recipient declined value");
            return Err(TransferError::Rejected {
                recipient: to,
                reason: rejection.reason,
            });
        }
        Ok(())
    }

    fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot::new(self.balances.read().clone())
    }

    fn restore(&self, snapshot: BalanceSnapshot) {
        *self.balances.write() = snapshot.into_inner();
    }

    fn deploy_address(&self, deployer: Identity) -> Identity {
        let mut nonces = self.nonces.lock();
        let nonce = nonces.entry(deployer).or_insert(0);
        let address = derive_contract_identity(&deployer, *nonce);
        *nonce += 1;
        address
    }

    fn register_receiver(&self, id: Identity, receiver: Weak<dyn ValueReceiver>) {
        self.receivers.write().insert(id, receiver);
    }

    fn has_receiver(&self, id: Identity) -> bool {
        self.receiver_of(&id).is_some()
    }
}

// =============================================================================
// TESTS
// =============================================================================
