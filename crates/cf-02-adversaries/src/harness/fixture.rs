//! Per-scenario fixture: a fresh chain, named identities, one ledger and
//! both attacker contracts.

use crate::adapters::{DosAttacker, ReentrantAttacker};
use crate::config::HarnessConfig;
use crate::errors::AttackError;
use crate::service::AttackOrchestrator;
use cf_01_ledger::adapters::InMemoryChain;
use cf_01_ledger::domain::entities::LedgerVariant;
use cf_01_ledger::domain::value_objects::Identity;
use cf_01_ledger::ports::inbound::CrowdfundApi;
use cf_01_ledger::ports::outbound::SharedChain;
use cf_01_ledger::service::deploy;
use std::sync::Arc;
use tracing::debug;

/// Everything a scenario needs.
pub struct Fixture {
    /// Chain, with an inherent API for funding and the clock.
    pub chain: Arc<InMemoryChain>,
    /// Deploys the ledger.
    pub deployer: Identity,
    /// Honest contributor.
    pub honest1: Identity,
    /// Second honest contributor.
    pub honest2: Identity,
    /// Controls the reentrant attacker.
    pub attacker1: Identity,
    /// Controls the DoS attacker.
    pub attacker2: Identity,
    /// Ledger under test.
    pub ledger: Arc<dyn CrowdfundApi>,
    /// Reentrant attacker, owned by `attacker1`.
    pub reentrant: Arc<ReentrantAttacker>,
    /// DoS attacker, owned by `attacker2`.
    pub dos: Arc<DosAttacker>,
}

impl Fixture {
    /// Builds a fresh fixture around a ledger of `variant`.
    pub fn new(variant: LedgerVariant, config: &HarnessConfig) -> Result<Self, AttackError> {
        let chain = Arc::new(InMemoryChain::new());
        let [deployer, honest1, honest2, attacker1, attacker2] =
            ["deployer", "honest1", "honest2", "attacker1", "attacker2"].map(Identity::from_label);
        for id in [deployer, honest1, honest2, attacker1, attacker2] {
            chain.fund(id, config.initial_funds)?;
        }

        let shared: SharedChain = chain.clone();
        let ledger = deploy(shared.clone(), deployer, config.ledger.clone(), variant);
        let reentrant = ReentrantAttacker::deploy(shared.clone(), attacker1, &ledger, config.attack.clone());
        let dos = DosAttacker::deploy(shared, attacker2, &ledger);
        debug!(%variant, ledger = %ledger.identity(), "Fixture ready");

        Ok(Self {
            chain,
            deployer,
            honest1,
            honest2,
            attacker1,
            attacker2,
            ledger,
            reentrant,
            dos,
        })
    }

    /// Orchestrator bound to this fixture's ledger.
    #[must_use]
    pub fn orchestrator(&self) -> AttackOrchestrator {
        AttackOrchestrator::new(self.shared_chain(), Arc::clone(&self.ledger))
    }

    /// The chain as the port type.
    #[must_use]
    pub fn shared_chain(&self) -> SharedChain {
        self.chain.clone()
    }
}
