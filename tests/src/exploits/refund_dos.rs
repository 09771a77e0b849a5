//! # Bulk Refund Denial of Service
//!
//! A contract whose receipt hook always declines joins the roster. A bulk
//! refund that reaches it either reverts as a whole (vulnerable) or skips
//! it and records the failure (secure).

#[cfg(test)]
mod tests {
    use cf_01_ledger::prelude::*;
    use cf_02_adversaries::adapters::dos::REJECTION_REASON;
    use cf_02_adversaries::prelude::*;

    fn fixture_with_honest(variant: LedgerVariant) -> Fixture {
        let f = Fixture::new(variant, &HarnessConfig::default()).unwrap();
        f.ledger.contribute(f.honest1, units::ether(1)).unwrap();
        f.ledger.contribute(f.honest2, units::milli_ether(500)).unwrap();
        f
    }

    fn run_dos(f: &Fixture) -> DosOutcome {
        f.orchestrator()
            .refund_all_dos(&f.dos, f.attacker2, units::milli_ether(200), units::milli_ether(100))
            .unwrap()
    }

    // =========================================================================
    // VULNERABLE
    // =========================================================================

    #[test]
    fn test_vulnerable_bulk_refund_reverts() {
        let f = fixture_with_honest(LedgerVariant::Vulnerable);
        let outcome = run_dos(&f);

        assert!(outcome.blocked());
        assert!(outcome.report.is_none());
        assert_eq!(outcome.honest_refunded(), 0);
        assert!(outcome.ledger_balance.unchanged());
        let reason = outcome.refund_all.reason().unwrap_or_default();
        assert!(reason.starts_with("refund blocked by contributor"), "{reason}");
        assert!(reason.contains(REJECTION_REASON), "{reason}");
    }

    #[test]
    fn test_vulnerable_revert_leaves_no_trace() {
        let f = fixture_with_honest(LedgerVariant::Vulnerable);
        f.dos.fund_attack(f.attacker2, units::milli_ether(200)).unwrap();
        f.dos.join_crowdfund(f.attacker2, units::milli_ether(100)).unwrap();
        let before = f.ledger.snapshot();
        let honest_before = f.chain.balance_of(f.honest1);

        assert!(f.dos.trigger_refund_all(f.attacker2).is_err());

        assert_eq!(f.ledger.snapshot(), before);
        assert_eq!(f.chain.balance_of(f.honest1), honest_before);
        assert!(f.ledger.failed_refunds().is_empty());
    }

    #[test]
    fn test_vulnerable_individual_refunds_still_work() {
        let f = fixture_with_honest(LedgerVariant::Vulnerable);
        run_dos(&f);

        assert_eq!(f.ledger.request_refund(f.honest1).unwrap(), units::ether(1));
        assert_eq!(f.ledger.request_refund(f.honest2).unwrap(), units::milli_ether(500));
        assert_eq!(f.ledger.get_balance(), units::milli_ether(100));
    }

    // =========================================================================
    // SECURE
    // =========================================================================

    #[test]
    fn test_secure_skips_declining_contributor() {
        let f = fixture_with_honest(LedgerVariant::Secure);
        let outcome = run_dos(&f);

        assert!(!outcome.blocked());
        assert_eq!(outcome.honest_refunded(), 2);
        let report = outcome.report.unwrap();
        assert!(report.was_refunded(&f.honest1));
        assert!(report.was_refunded(&f.honest2));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].contributor, f.dos.identity());
        assert_eq!(report.failed[0].amount, units::milli_ether(100));
        assert!(report.failed[0].reason.contains(REJECTION_REASON));

        assert_eq!(f.ledger.get_balance(), units::milli_ether(100));
        assert_eq!(f.ledger.contributions(f.dos.identity()), units::milli_ether(100));
        assert!(check_all_invariants(&f.ledger.snapshot()).is_valid());
    }

    #[test]
    fn test_secure_records_failure_and_event() {
        let f = fixture_with_honest(LedgerVariant::Secure);
        run_dos(&f);

        assert_eq!(
            f.ledger.failed_refunds(),
            vec![(f.dos.identity(), units::milli_ether(100))]
        );
        let failed_events = f
            .ledger
            .events()
            .into_iter()
            .filter(|e| matches!(e, LedgerEvent::RefundFailed { .. }))
            .count();
        assert_eq!(failed_events, 1);
    }

    #[test]
    fn test_secure_repeated_bulk_refund_only_retries_attacker() {
        let f = fixture_with_honest(LedgerVariant::Secure);
        run_dos(&f);

        let report = f.ledger.refund_all(f.deployer).unwrap();
        assert!(report.refunded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(f.ledger.get_balance(), units::milli_ether(100));
    }

    #[test]
    fn test_dos_contract_cannot_be_looted_twice() {
        let f = fixture_with_honest(LedgerVariant::Secure);
        run_dos(&f);

        assert_eq!(f.dos.withdraw_loot(f.attacker2).unwrap(), units::milli_ether(100));
        assert_eq!(f.dos.withdraw_loot(f.attacker2), Err(AttackError::NothingToWithdraw));
    }
}
