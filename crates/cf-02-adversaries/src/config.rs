//! Attacker and harness configuration.

use cf_01_ledger::domain::entities::LedgerConfig;
use cf_01_ledger::domain::value_objects::{units, U256};
use serde::{Deserialize, Serialize};

/// Default bound on nested refunds issued from the reentrant hook.
pub const DEFAULT_MAX_REENTRY_DEPTH: usize = 64;

/// Attacker behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackConfig {
    /// Maximum nesting of re-entered refunds. The ledger balance usually
    /// stops the recursion first.
    pub max_reentry_depth: usize,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            max_reentry_depth: DEFAULT_MAX_REENTRY_DEPTH,
        }
    }
}

/// Scenario fixture parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Ledger deployed in every fixture.
    pub ledger: LedgerConfig,
    /// Attacker contracts deployed in every fixture.
    pub attack: AttackConfig,
    /// Genesis allocation of each named identity.
    pub initial_funds: U256,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            attack: AttackConfig::default(),
            initial_funds: units::ether(10_000),
        }
    }
}
