//! # Integration Test Flows
//!
//! End-to-end runs through the scenario catalogue, the lab runtime's
//! configuration and report, and ledger configurations the scenarios do
//! not cover (over-goal policies, deadlines, direct deposits).

#[cfg(test)]
mod tests {
    use cf_01_ledger::prelude::*;
    use cf_02_adversaries::prelude::*;
    use lab_runtime::{load_config_from, run, LabReport};
    use std::collections::HashMap;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn fixture_with(variant: LedgerVariant, ledger: LedgerConfig) -> Fixture {
        let config = HarnessConfig {
            ledger,
            ..HarnessConfig::default()
        };
        Fixture::new(variant, &config).unwrap()
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    // =============================================================================
    // SCENARIO CATALOGUE
    // =============================================================================

    #[test]
    fn test_every_scenario_passes_on_both_variants() {
        let reports = run_all(&HarnessConfig::default());

        assert_eq!(reports.len(), Scenario::ALL.len() * LedgerVariant::ALL.len());
        for report in &reports {
            assert!(report.passed(), "{report}");
        }
    }

    #[test]
    fn test_invariants_separate_the_variants() {
        let reports = run_all(&HarnessConfig::default());

        let secure_broken = reports
            .iter()
            .filter(|r| r.variant == LedgerVariant::Secure && !r.invariants.is_valid())
            .count();
        assert_eq!(secure_broken, 0);

        let vulnerable_broken: Vec<&str> = reports
            .iter()
            .filter(|r| r.variant == LedgerVariant::Vulnerable && !r.invariants.is_valid())
            .map(|r| r.name.as_str())
            .collect();
        assert!(vulnerable_broken.contains(&Scenario::Reentrancy.name()));
        assert!(vulnerable_broken.contains(&Scenario::AccessControl.name()));
    }

    #[test]
    fn test_scenarios_pass_without_deadline() {
        let config = HarnessConfig {
            ledger: LedgerConfig {
                duration_minutes: None,
                ..LedgerConfig::default()
            },
            ..HarnessConfig::default()
        };
        for report in run_all(&config) {
            assert!(report.passed(), "{report}");
        }
    }

    // =============================================================================
    // LAB RUNTIME
    // =============================================================================

    #[test]
    fn test_runtime_from_environment() {
        let (config, warnings) = load_config_from(env(&[
            ("CF_VARIANT", "secure"),
            ("CF_MAX_REENTRY_DEPTH", "8"),
        ]));
        assert!(warnings.is_empty());
        config.validate().unwrap();

        let report = run(&config);
        assert!(report.all_passed());
        assert_eq!(report.scenarios.len(), Scenario::ALL.len());
    }

    #[test]
    fn test_runtime_report_round_trips_as_json() {
        let report = run(&lab_runtime::LabConfig::default());
        let json = serde_json::to_string(&report).unwrap();
        let back: LabReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert_eq!(back.failed, 0);
    }

    // =============================================================================
    // LEDGER CONFIGURATIONS
    // =============================================================================

    #[test]
    fn test_cap_policy_trims_attacker_stake() {
        let f = fixture_with(
            LedgerVariant::Vulnerable,
            LedgerConfig {
                goal: units::ether(2),
                over_goal_policy: OverGoalPolicy::Cap,
                ..LedgerConfig::default()
            },
        );
        f.ledger.contribute(f.honest1, units::milli_ether(1500)).unwrap();

        let recorded = f.reentrant.deposit_to_crowdfund(f.attacker1, units::ether(1)).unwrap();
        assert_eq!(recorded, units::milli_ether(500));
        assert_eq!(f.reentrant.last_contribution(), units::milli_ether(500));
        assert_eq!(f.reentrant.held_balance(), units::milli_ether(500));

        assert!(matches!(
            f.reentrant.run_attack(f.attacker1, units::ether(1)),
            Err(AttackError::OutOfOrderAttackStep { .. })
        ));
        let received = f.reentrant.run_attack(f.attacker1, units::milli_ether(500)).unwrap();
        assert_eq!(received, units::ether(2));
        assert_eq!(f.reentrant.reentries(), 3);
        assert_eq!(f.ledger.get_balance(), U256::zero());
    }

    #[test]
    fn test_reject_policies_refuse_over_goal() {
        for (policy, amount) in [
            (OverGoalPolicy::RejectOnceReached, units::ether(1)),
            (OverGoalPolicy::RejectExceeding, units::ether(2)),
        ] {
            let f = fixture_with(
                LedgerVariant::Secure,
                LedgerConfig {
                    goal: units::ether(2),
                    over_goal_policy: policy,
                    ..LedgerConfig::default()
                },
            );
            f.ledger.contribute(f.honest1, units::ether(2)).unwrap();

            let before = f.ledger.snapshot();
            let err = f.ledger.contribute(f.honest2, amount).unwrap_err();
            assert!(matches!(
                err,
                LedgerError::GoalReached { .. } | LedgerError::GoalExceeded { .. }
            ));
            assert_eq!(f.ledger.snapshot(), before);
        }
    }

    #[test]
    fn test_deadline_closes_contributions_not_refunds() {
        for variant in LedgerVariant::ALL {
            let f = fixture_with(variant, LedgerConfig::default());
            f.ledger.contribute(f.honest1, units::ether(1)).unwrap();

            f.chain.advance_time(60 * 60);

            assert!(matches!(
                f.ledger.contribute(f.honest2, units::ether(1)),
                Err(LedgerError::CampaignEnded { .. })
            ));
            assert!(matches!(
                f.reentrant.deposit_to_crowdfund(f.attacker1, units::ether(1)),
                Err(AttackError::Ledger(LedgerError::CampaignEnded { .. }))
            ));
            assert_eq!(f.ledger.request_refund(f.honest1).unwrap(), units::ether(1));
        }
    }

    #[test]
    fn test_direct_deposits_are_not_refundable() {
        for variant in LedgerVariant::ALL {
            let f = fixture_with(variant, LedgerConfig::default());
            f.ledger.receive_direct(f.honest1, units::ether(2)).unwrap();

            assert_eq!(f.ledger.contributions(f.honest1), U256::zero());
            assert!(f.ledger.get_contributors().is_empty());
            assert_eq!(
                f.ledger.request_refund(f.honest1),
                Err(LedgerError::UnknownOrEmptyContribution(f.honest1))
            );
            let info = f.reentrant.crowdfund_info().unwrap();
            assert_eq!(info.balance, units::ether(2));
            assert_eq!(info.total_raised, U256::zero());
            assert!(check_all_invariants(&f.ledger.snapshot()).is_valid());
        }
    }

    #[test]
    fn test_repeat_contributions_share_one_roster_entry() {
        for variant in LedgerVariant::ALL {
            let f = fixture_with(variant, LedgerConfig::default());
            f.ledger.contribute(f.honest1, units::ether(1)).unwrap();
            f.ledger.contribute(f.honest1, units::ether(2)).unwrap();
            f.ledger.contribute(f.honest2, units::ether(1)).unwrap();

            assert_eq!(f.ledger.get_contributors(), vec![f.honest1, f.honest2]);
            assert_eq!(f.ledger.contributions(f.honest1), units::ether(3));

            let report = f.ledger.refund_all(f.honest2).unwrap();
            assert_eq!(report.total_refunded(), units::ether(4));
            assert!(report.is_complete());
            assert!(check_all_invariants(&f.ledger.snapshot()).is_valid());
        }
    }
}
