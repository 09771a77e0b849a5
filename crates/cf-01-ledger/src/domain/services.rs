//! # Domain Services
//!
//! Stateless domain logic: identity derivation and contribution admission.

use crate::domain::entities::OverGoalPolicy;
use crate::domain::value_objects::{Identity, U256};
use crate::errors::LedgerError;
use sha3::{Digest, Keccak256};

/// Computes Keccak-256 hash.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Identity of the contract deployed by `deployer` at `nonce`.
///
/// `keccak256(deployer || nonce_be)[12..]`.
#[must_use]
pub fn derive_contract_identity(deployer: &Identity, nonce: u64) -> Identity {
    let mut preimage = [0u8; 28];
    preimage[..20].copy_from_slice(deployer.as_bytes());
    preimage[20..].copy_from_slice(&nonce.to_be_bytes());
    let hash = keccak256(&preimage);

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Identity::new(bytes)
}

/// Decides how much of `amount` a contribution may record under `policy`.
///
/// Returns the accepted amount, which is `amount` for every policy except
/// [`OverGoalPolicy::Cap`].
pub fn admit_contribution(
    policy: OverGoalPolicy,
    goal: U256,
    total_raised: U256,
    amount: U256,
) -> Result<U256, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::InvalidAmount);
    }

    match policy {
        OverGoalPolicy::Accept => Ok(amount),
        OverGoalPolicy::RejectOnceReached => {
            if total_raised >= goal {
                Err(LedgerError::GoalReached { goal, total_raised })
            } else {
                Ok(amount)
            }
        }
        OverGoalPolicy::RejectExceeding => {
            let exceeds = total_raised
                .checked_add(amount)
                .map_or(true, |total| total > goal);
            if exceeds {
                Err(LedgerError::GoalExceeded {
                    goal,
                    total_raised,
                    amount,
                })
            } else {
                Ok(amount)
            }
        }
        OverGoalPolicy::Cap => {
            let room = goal.saturating_sub(total_raised);
            if room.is_zero() {
                Err(LedgerError::GoalReached { goal, total_raised })
            } else {
                Ok(amount.min(room))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
