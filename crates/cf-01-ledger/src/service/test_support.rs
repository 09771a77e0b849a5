//! Recipient hooks used by the variant tests.

use crate::adapters::InMemoryChain;
use crate::domain::entities::{LedgerConfig, LedgerVariant};
use crate::domain::value_objects::units::ether;
use crate::domain::value_objects::{Identity, U256};
use crate::errors::{LedgerError, ReceiveError};
use crate::ports::inbound::CrowdfundApi;
use crate::ports::outbound::{ChainAccess, ValueReceiver};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

pub(crate) fn id(label: &str) -> Identity {
    Identity::from_label(label)
}

/// Chain with funded `owner`, `alice`, `bob`, `mallory`, and one ledger.
pub(crate) fn deployed(variant: LedgerVariant) -> (Arc<InMemoryChain>, Arc<dyn CrowdfundApi>) {
    let chain = Arc::new(InMemoryChain::new());
    for who in ["owner", "alice", "bob", "mallory"] {
        chain.fund(id(who), ether(100)).unwrap();
    }
    let ledger = super::deploy(chain.clone(), id("owner"), LedgerConfig::default(), variant);
    (chain, ledger)
}

/// Declines every incoming transfer.
pub(crate) struct Refuser;

impl ValueReceiver for Refuser {
    fn on_value_received(&self, _from: Identity, _amount: U256) -> Result<(), ReceiveError> {
        Err(ReceiveError::new("no receive function"))
    }
}

pub(crate) fn install_refuser(chain: &InMemoryChain, at: Identity) -> Arc<dyn ValueReceiver> {
    let refuser: Arc<dyn ValueReceiver> = Arc::new(Refuser);
    chain.register_receiver(at, Arc::downgrade(&refuser));
    refuser
}

/// Calls `request_refund` again from its hook while the ledger can pay.
pub(crate) struct Reenterer {
    pub(crate) me: Identity,
    pub(crate) ledger: Weak<dyn CrowdfundApi>,
    pub(crate) reentries: AtomicUsize,
    pub(crate) last_error: Mutex<Option<LedgerError>>,
}

impl Reenterer {
    pub(crate) fn install(
        chain: &InMemoryChain,
        me: Identity,
        ledger: &Arc<dyn CrowdfundApi>,
    ) -> Arc<Self> {
        let hook = Arc::new(Self {
            me,
            ledger: Arc::downgrade(ledger),
            reentries: AtomicUsize::new(0),
            last_error: Mutex::new(None),
        });
        chain.register_receiver(me, Arc::downgrade(&hook) as Weak<dyn ValueReceiver>);
        hook
    }
}

impl ValueReceiver for Reenterer {
    fn on_value_received(&self, _from: Identity, amount: U256) -> Result<(), ReceiveError> {
        let Some(ledger) = self.ledger.upgrade() else {
            return Ok(());
        };
        if ledger.get_balance() >= amount && self.reentries.load(Ordering::SeqCst) < 64 {
            self.reentries.fetch_add(1, Ordering::SeqCst);
            if let Err(err) = ledger.request_refund(self.me) {
                *self.last_error.lock() = Some(err);
            }
        }
        Ok(())
    }
}
