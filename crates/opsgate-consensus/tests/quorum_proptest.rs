//! Property tests for the quorum rule over arbitrary thresholds

use std::sync::Arc;

use proptest::prelude::*;

use opsgate_common::security::AuditLogger;
use opsgate_common::{Account, CommitResult};
use opsgate_consensus::{GateConfig, OpsGate};

fn deploy(threshold: usize, admins: usize) -> (OpsGate, Vec<Account>) {
    let owner = Account::from_label("owner");
    let config = GateConfig { threshold };
    let ops = OpsGate::with_audit(owner, &config, Arc::new(AuditLogger::silent())).unwrap();
    let admins: Vec<Account> = (0..admins)
        .map(|i| Account::from_label(&format!("admin{}", i)))
        .collect();
    for admin in &admins {
        ops.register(owner, *admin, true).unwrap();
    }
    (ops, admins)
}

proptest! {
    #[test]
    fn prop_commits_exactly_on_mth_distinct_vote(threshold in 1usize..12, target in any::<bool>()) {
        let (ops, admins) = deploy(threshold, threshold);
        // Start from the opposite value so the commit is observable
        if ops.operational() == target {
            for admin in &admins {
                ops.set_operating_status(!target, *admin).unwrap();
            }
        }
        prop_assert_eq!(ops.operational(), !target);

        for (i, admin) in admins.iter().enumerate() {
            let result = ops.set_operating_status(target, *admin).unwrap();
            if i + 1 < threshold {
                prop_assert_eq!(result, CommitResult::Pending { votes: i + 1, threshold });
                prop_assert_eq!(ops.operational(), !target);
            } else {
                prop_assert_eq!(result, CommitResult::Committed(target));
                prop_assert_eq!(ops.operational(), target);
            }
        }
        prop_assert_eq!(ops.pending_value(), None);
    }

    #[test]
    fn prop_target_switch_restarts_count(threshold in 2usize..10, prior in 1usize..10) {
        let prior = prior.min(threshold - 1);
        let (ops, admins) = deploy(threshold, prior + threshold);

        for admin in &admins[..prior] {
            ops.set_operating_status(true, *admin).unwrap();
        }
        prop_assert_eq!(ops.vote_count(), prior);

        // Votes for `false` start from zero
        let fresh = &admins[prior..];
        for (i, admin) in fresh.iter().enumerate() {
            let result = ops.set_operating_status(false, *admin).unwrap();
            prop_assert_eq!(result.is_committed(), i + 1 == threshold);
        }
        prop_assert!(!ops.operational());
    }

    #[test]
    fn prop_votes_never_reach_threshold_without_commit(
        threshold in 1usize..8,
        script in proptest::collection::vec((0usize..8, any::<bool>()), 0..64),
    ) {
        let (ops, admins) = deploy(threshold, 8);
        for (idx, value) in script {
            ops.set_operating_status(value, admins[idx]).unwrap();
            prop_assert!(ops.vote_count() < threshold);
            prop_assert_eq!(ops.pending_value().is_some(), ops.vote_count() > 0);
        }
    }
}
