//! # Reentrant Refund Drain
//!
//! A contract contributes a small stake, requests its refund and re-enters
//! `request_refund` from its receipt hook while the ledger still holds
//! enough value. The vulnerable ledger pays the stake once per frame
//! before zeroing the entry; the secure ledger's guard refuses the nested
//! call.
//!
//! ## Expected
//!
//! | Variant | Ledger after | Attacker receives | Accounting |
//! |---------|--------------|-------------------|------------|
//! | Vulnerable | 0 | stake + honest funds | broken |
//! | Secure | honest funds | stake | intact |

#[cfg(test)]
mod tests {
    use cf_01_ledger::prelude::*;
    use cf_02_adversaries::prelude::*;
    use proptest::prelude::*;

    fn fixture(variant: LedgerVariant) -> Fixture {
        Fixture::new(variant, &HarnessConfig::default()).unwrap()
    }

    // =========================================================================
    // VULNERABLE
    // =========================================================================

    #[test]
    fn test_vulnerable_ledger_is_emptied() {
        let f = fixture(LedgerVariant::Vulnerable);
        f.ledger.contribute(f.honest1, units::ether(3)).unwrap();
        f.ledger.contribute(f.honest2, units::ether(2)).unwrap();
        let controller_before = f.chain.balance_of(f.attacker1);

        let outcome = f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        assert!(outcome.drained());
        assert_eq!(outcome.reentries, 5);
        assert_eq!(outcome.blocked_reentries, 0);
        assert_eq!(outcome.ledger_balance.after, U256::zero());
        assert_eq!(outcome.extra_drain(), units::ether(5));
        assert_eq!(outcome.loot, units::ether(6));
        assert_eq!(f.chain.balance_of(f.attacker1), controller_before + units::ether(5));
    }

    #[test]
    fn test_vulnerable_books_survive_the_drain() {
        let f = fixture(LedgerVariant::Vulnerable);
        f.ledger.contribute(f.honest1, units::ether(5)).unwrap();

        f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        // The honest entry is still recorded but nothing backs it.
        assert_eq!(f.ledger.contributions(f.honest1), units::ether(5));
        assert_eq!(f.ledger.total_raised(), U256::zero());
        assert!(!check_accounting_invariant(&f.ledger.snapshot()));

        let violations = check_all_invariants(&f.ledger.snapshot());
        assert!(violations
            .violations()
            .iter()
            .any(|v| matches!(v, InvariantViolation::Accounting { .. })));
    }

    #[test]
    fn test_honest_refund_fails_after_drain() {
        let f = fixture(LedgerVariant::Vulnerable);
        f.ledger.contribute(f.honest1, units::ether(5)).unwrap();
        f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        let before = f.ledger.snapshot();
        assert!(f.ledger.request_refund(f.honest1).is_err());
        assert_eq!(f.ledger.snapshot(), before);
    }

    #[test]
    fn test_depth_bound_limits_the_drain() {
        let config = HarnessConfig {
            attack: AttackConfig { max_reentry_depth: 2 },
            ..HarnessConfig::default()
        };
        let f = Fixture::new(LedgerVariant::Vulnerable, &config).unwrap();
        f.ledger.contribute(f.honest1, units::ether(5)).unwrap();

        let outcome = f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        assert!(!outcome.drained());
        assert_eq!(outcome.reentries, 2);
        assert_eq!(outcome.loot, units::ether(3));
        assert_eq!(outcome.ledger_balance.after, units::ether(3));
    }

    #[test]
    fn test_value_is_conserved() {
        let f = fixture(LedgerVariant::Vulnerable);
        f.ledger.contribute(f.honest1, units::ether(5)).unwrap();
        let supply = f.chain.total_supply();

        f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        assert_eq!(f.chain.total_supply(), supply);
    }

    #[test]
    fn test_direct_deposit_turns_the_drain_into_a_revert() {
        let f = fixture(LedgerVariant::Vulnerable);
        f.ledger.contribute(f.honest1, units::ether(5)).unwrap();
        f.ledger.receive_direct(f.honest2, units::ether(3)).unwrap();
        let controller_before = f.chain.balance_of(f.attacker1);

        let outcome = f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        // Frames past total_raised underflow; the failure unwinds every send.
        assert!(!outcome.attack.is_accepted());
        assert!(!outcome.drained());
        let reason = outcome.attack.reason().unwrap_or_default();
        assert!(reason.contains("arithmetic overflow in total_raised"), "{reason}");
        assert!(outcome.ledger_balance.unchanged());
        assert_eq!(outcome.ledger_balance.after, units::ether(9));
        assert_eq!(outcome.total_raised_after, units::ether(6));
        assert_eq!(outcome.attacker_contribution_after, units::ether(1));
        assert_eq!(outcome.loot, U256::zero());
        assert_eq!(f.chain.balance_of(f.attacker1), controller_before - units::ether(1));
        assert!(check_all_invariants(&f.ledger.snapshot()).is_valid());
    }

    // =========================================================================
    // SECURE
    // =========================================================================

    #[test]
    fn test_secure_guard_blocks_reentry() {
        let f = fixture(LedgerVariant::Secure);
        f.ledger.contribute(f.honest1, units::ether(3)).unwrap();
        f.ledger.contribute(f.honest2, units::ether(2)).unwrap();

        let outcome = f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        assert!(!outcome.drained());
        assert!(outcome.attack.is_accepted());
        assert_eq!(outcome.reentries, 1);
        assert_eq!(outcome.blocked_reentries, 1);
        assert_eq!(outcome.ledger_balance.after, units::ether(5));
        assert_eq!(outcome.loot, units::ether(1));
        assert_eq!(outcome.extra_drain(), U256::zero());
        assert_eq!(outcome.attacker_contribution_after, U256::zero());
    }

    #[test]
    fn test_secure_honest_contributors_still_refund() {
        let f = fixture(LedgerVariant::Secure);
        f.ledger.contribute(f.honest1, units::ether(3)).unwrap();
        f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        assert_eq!(f.ledger.request_refund(f.honest1).unwrap(), units::ether(3));
        assert_eq!(f.ledger.get_balance(), U256::zero());
        assert!(check_all_invariants(&f.ledger.snapshot()).is_valid());
        assert_eq!(f.ledger.guard_state(), GuardState::Idle);
    }

    #[test]
    fn test_attack_is_repeatable_only_after_recontributing() {
        let f = fixture(LedgerVariant::Secure);
        f.ledger.contribute(f.honest1, units::ether(3)).unwrap();
        f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(1)).unwrap();

        // The cached stake is stale; the ledger has no entry to refund.
        let err = f.reentrant.run_attack(f.attacker1, units::ether(1)).unwrap_err();
        assert!(matches!(
            err.ledger_error(),
            Some(LedgerError::UnknownOrEmptyContribution(_))
        ));
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_secure_keeps_honest_funds(
            honest in prop::collection::vec(1u64..20, 1..4),
            stake in 1u64..5,
        ) {
            let f = fixture(LedgerVariant::Secure);
            let contributors = [f.honest1, f.honest2, f.deployer];
            let mut held = U256::zero();
            for (who, amount) in contributors.iter().zip(&honest) {
                f.ledger.contribute(*who, units::ether(*amount)).unwrap();
                held += units::ether(*amount);
            }

            let outcome = f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(stake)).unwrap();

            prop_assert_eq!(outcome.ledger_balance.after, held);
            prop_assert_eq!(outcome.loot, units::ether(stake));
            prop_assert!(check_all_invariants(&f.ledger.snapshot()).is_valid());
        }

        #[test]
        fn prop_vulnerable_drains_whole_multiples(multiple in 1u64..20, stake in 1u64..5) {
            let f = fixture(LedgerVariant::Vulnerable);
            f.ledger.contribute(f.honest1, units::ether(multiple * stake)).unwrap();

            let outcome = f.orchestrator().reentrancy(&f.reentrant, f.attacker1, units::ether(stake)).unwrap();

            prop_assert!(outcome.drained());
            prop_assert_eq!(outcome.reentries as u64, multiple);
            prop_assert_eq!(outcome.loot, units::ether((multiple + 1) * stake));
        }
    }
}
