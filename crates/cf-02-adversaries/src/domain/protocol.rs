//! Step ordering of the reentrancy attack.

use crate::errors::AttackError;
use cf_01_ledger::domain::value_objects::U256;

/// Tracks the contribution the attack will try to refund.
///
/// `run_attack` is only valid for exactly the amount the contract last
/// contributed; anything else is a misuse of the attacker, not an exploit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReentrancyProtocol {
    last_contribution: Option<U256>,
}

impl ReentrancyProtocol {
    /// Fresh protocol with nothing contributed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches the amount recorded by the ledger.
    pub fn record_contribution(&mut self, amount: U256) {
        self.last_contribution = Some(amount);
    }

    /// Cached amount; zero before the first contribution.
    #[must_use]
    pub fn last_contribution(&self) -> U256 {
        self.last_contribution.unwrap_or_default()
    }

    /// Checks that an attack for `requested` may start.
    pub fn authorize_attack(&self, requested: U256) -> Result<U256, AttackError> {
        match self.last_contribution {
            Some(contributed) if contributed == requested && !requested.is_zero() => Ok(contributed),
            _ => Err(AttackError::OutOfOrderAttackStep {
                contributed: self.last_contribution(),
                requested,
            }),
        }
    }
}
