//! # Unauthenticated Withdrawal
//!
//! Any identity calls `withdraw`. The vulnerable ledger pays its whole
//! balance to the caller; the secure ledger refuses everyone but the owner.

#[cfg(test)]
mod tests {
    use cf_01_ledger::prelude::*;
    use cf_02_adversaries::prelude::*;

    fn funded(variant: LedgerVariant) -> Fixture {
        let f = Fixture::new(variant, &HarnessConfig::default()).unwrap();
        f.ledger.contribute(f.honest1, units::ether(3)).unwrap();
        f.ledger.contribute(f.honest2, units::ether(1)).unwrap();
        f.ledger.receive_direct(f.honest2, units::ether(1)).unwrap();
        f
    }

    #[test]
    fn test_vulnerable_stranger_takes_everything() {
        let f = funded(LedgerVariant::Vulnerable);
        let outcome = f.orchestrator().access_control(&AccessControlProbe::new(f.attacker1));

        assert!(outcome.succeeded());
        assert_eq!(outcome.taken(), units::ether(5));
        assert_eq!(outcome.ledger_balance.after, U256::zero());
        assert_eq!(outcome.total_raised_after, units::ether(4));
        assert!(!check_custody_invariant(&f.ledger.snapshot()));
    }

    #[test]
    fn test_vulnerable_withdraw_is_logged_as_withdrawal() {
        let f = funded(LedgerVariant::Vulnerable);
        f.orchestrator().access_control(&AccessControlProbe::new(f.attacker1));

        let withdrawn = f.ledger.events().into_iter().find_map(|e| match e {
            LedgerEvent::Withdrawn { to, amount } => Some((to, amount)),
            _ => None,
        });
        assert_eq!(withdrawn, Some((f.attacker1, units::ether(5))));
    }

    #[test]
    fn test_secure_stranger_refused() {
        let f = funded(LedgerVariant::Secure);
        let outcome = f.orchestrator().access_control(&AccessControlProbe::new(f.attacker1));

        assert!(!outcome.succeeded());
        assert!(outcome.ledger_balance.unchanged());
        assert!(outcome.caller_balance.unchanged());
        assert!(outcome.withdraw.reason().unwrap_or_default().starts_with("unauthorized"));
        assert!(check_all_invariants(&f.ledger.snapshot()).is_valid());
    }

    #[test]
    fn test_secure_contributors_are_strangers_too() {
        let f = funded(LedgerVariant::Secure);
        for who in [f.honest1, f.honest2, f.dos.identity()] {
            assert_eq!(
                f.ledger.withdraw(who),
                Err(LedgerError::Unauthorized {
                    caller: who,
                    owner: f.deployer,
                })
            );
        }
    }

    #[test]
    fn test_secure_owner_withdraw_keeps_custody() {
        let f = funded(LedgerVariant::Secure);
        let owner_before = f.chain.balance_of(f.deployer);

        assert_eq!(f.ledger.withdraw(f.deployer).unwrap(), units::ether(5));

        assert_eq!(f.chain.balance_of(f.deployer), owner_before + units::ether(5));
        assert_eq!(f.ledger.get_balance(), U256::zero());
        assert!(check_custody_invariant(&f.ledger.snapshot()));
    }
}
