//! Deployment, restore and vote replay

use std::sync::Arc;

use tracing::{error, info, warn};

use opsgate_common::security::AuditLogger;
use opsgate_common::{CommitResult, ConsensusError, Result};
use opsgate_consensus::{Ballot, GateSnapshot, OpsGate};

use crate::config::{resolve_account, NodeConfig, ScriptedVote};

/// Outcome of a scripted vote replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Votes counted toward a round (including the committing ones)
    pub accepted: usize,
    /// Votes repeated by an admin already in the round
    pub duplicates: usize,
    /// Votes from callers that are not admins
    pub rejected: usize,
    /// Values committed, in order
    pub commits: Vec<bool>,
}

/// Audit logger writing through `tracing` at the configured severity
pub fn audit_logger(config: &NodeConfig) -> AuditLogger {
    let mut logger = AuditLogger::new();
    logger.set_min_severity(config.audit_min_severity);
    logger
}

/// Resume from `restore_path` when set, otherwise deploy and seed a fresh gate
pub fn deploy(config: &NodeConfig, audit: Arc<AuditLogger>) -> Result<OpsGate> {
    match &config.restore_path {
        Some(path) => {
            if !config.admins.is_empty() || !config.users.is_empty() {
                warn!(path = %path, "Seed accounts ignored when restoring from a snapshot");
            }
            restore(path, audit)
        }
        None => bootstrap(config, audit),
    }
}

/// Deploy a gate and register the configured seed accounts as the owner
pub fn bootstrap(config: &NodeConfig, audit: Arc<AuditLogger>) -> Result<OpsGate> {
    let owner = config.owner_account();
    let ops = OpsGate::with_audit(owner, &config.gate, audit)?;
    info!(owner = %owner, threshold = ops.threshold(), "Gate deployed");

    let seeds = config
        .admins
        .iter()
        .map(|name| (name, true))
        .chain(config.users.iter().map(|name| (name, false)));

    for (name, as_admin) in seeds {
        let account = resolve_account(name);
        if let Err(e) = ops.register(owner, account, as_admin) {
            error!(seed = %name, account = %account, error = %e, "Seed registration failed");
            return Err(e.into());
        }
    }

    info!(
        admins = ops.registry().admin_count(),
        accounts = ops.registry().len(),
        "Seed accounts registered"
    );
    Ok(ops)
}

/// Rebuild a gate from a snapshot file
pub fn restore(path: &str, audit: Arc<AuditLogger>) -> Result<OpsGate> {
    let json = std::fs::read_to_string(path)?;
    let snapshot = GateSnapshot::from_json(&json)?;
    let ops = OpsGate::restore_with_audit(&snapshot, audit)?;

    info!(
        path = %path,
        owner = %ops.owner(),
        operational = ops.operational(),
        votes = ops.vote_count(),
        "Gate restored from snapshot"
    );
    Ok(ops)
}

/// Write the current state snapshot to `path`
pub fn save_snapshot(ops: &OpsGate, path: &str) -> Result<()> {
    let json = ops.snapshot().to_json()?;
    std::fs::write(path, json)?;
    info!(path = %path, "Snapshot written");
    Ok(())
}

/// Replay `votes` in order; unauthorized callers are reported, not fatal
pub fn replay_votes(ops: &OpsGate, votes: &[ScriptedVote]) -> ReplayReport {
    let mut report = ReplayReport::default();

    for vote in votes {
        let caller = resolve_account(&vote.caller);

        match ops.cast_vote(vote.value, caller) {
            Ok((_, CommitResult::Committed(value))) => {
                report.accepted += 1;
                report.commits.push(value);
            }
            Ok((Ballot::Duplicate, _)) => report.duplicates += 1,
            Ok(_) => report.accepted += 1,
            Err(ConsensusError::Unauthorized { .. }) => {
                warn!(caller = %vote.caller, "Scripted vote rejected");
                report.rejected += 1;
            }
            Err(e) => {
                warn!(caller = %vote.caller, error = %e, "Scripted vote failed");
                report.rejected += 1;
            }
        }
    }

    info!(
        accepted = report.accepted,
        duplicates = report.duplicates,
        rejected = report.rejected,
        commits = report.commits.len(),
        "Vote replay finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsgate_common::security::{AuditCategory, AuditSeverity, MemoryAuditSink};
    use opsgate_common::{Account, OpsGateError, RegistryError, SnapshotError};
    use opsgate_consensus::GateConfig;

    fn config(threshold: usize) -> NodeConfig {
        NodeConfig {
            gate: GateConfig { threshold },
            admins: (1..=3).map(|i| format!("admin{}", i)).collect(),
            users: vec!["alice".to_string()],
            ..NodeConfig::default()
        }
    }

    fn silent() -> Arc<AuditLogger> {
        Arc::new(AuditLogger::silent())
    }

    fn vote(caller: &str, value: bool) -> ScriptedVote {
        ScriptedVote {
            caller: caller.to_string(),
            value,
        }
    }

    #[test]
    fn test_bootstrap_registers_seeds() {
        let ops = bootstrap(&config(2), silent()).unwrap();

        assert_eq!(ops.registry().admin_count(), 3);
        assert_eq!(ops.registry().len(), 4);
        assert!(ops.is_registered(&Account::from_label("alice")));
        assert!(!ops.is_admin(&Account::from_label("alice")));
        assert!(ops.operational());
    }

    #[test]
    fn test_bootstrap_rejects_duplicate_seed() {
        let mut cfg = config(2);
        cfg.users.push("admin1".to_string());
        assert!(matches!(
            bootstrap(&cfg, silent()),
            Err(OpsGateError::Registry(RegistryError::AlreadyRegistered { .. }))
        ));
    }

    #[test]
    fn test_paused_start_key_cannot_lock_out_seeds() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "admins = [\"admin1\"]\n[gate]\nthreshold = 1\ninitial_operational = false\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg = NodeConfig::from_settings(settings).unwrap();

        let ops = bootstrap(&cfg, silent()).unwrap();
        assert!(ops.operational());

        let report = replay_votes(&ops, &[vote("admin1", false), vote("admin1", true)]);
        assert_eq!(report.commits, vec![false, true]);
        assert!(ops.operational());
    }

    #[test]
    fn test_replay_commits_and_reports() {
        let ops = bootstrap(&config(2), silent()).unwrap();
        let votes = vec![
            vote("admin1", false),
            vote("admin1", false),
            vote("alice", false),
            vote("admin2", false),
            vote("admin3", true),
        ];

        let report = replay_votes(&ops, &votes);

        assert_eq!(report.accepted, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.commits, vec![false]);
        assert!(!ops.operational());
        assert_eq!(ops.pending_value(), Some(true));
    }

    #[test]
    fn test_replay_target_switch_is_not_duplicate() {
        let ops = bootstrap(&config(3), silent()).unwrap();
        let votes = vec![vote("admin1", true), vote("admin2", false), vote("admin1", false)];

        let report = replay_votes(&ops, &votes);

        assert_eq!(report.accepted, 3);
        assert_eq!(report.duplicates, 0);
        assert_eq!(ops.vote_count(), 2);
    }

    #[test]
    fn test_threshold_one_commits_every_vote() {
        let ops = bootstrap(&config(1), silent()).unwrap();
        let report = replay_votes(&ops, &[vote("admin1", false), vote("admin2", true)]);

        assert_eq!(report.commits, vec![false, true]);
        assert!(ops.operational());
    }

    #[test]
    fn test_audit_min_severity_applied() {
        let mut cfg = config(1);
        cfg.audit_min_severity = AuditSeverity::Warning;
        let sink = MemoryAuditSink::new();
        let audit = Arc::new(audit_logger(&cfg).with_sink(Box::new(sink.clone())));

        let ops = bootstrap(&cfg, audit).unwrap();
        replay_votes(&ops, &[vote("alice", false), vote("admin1", false)]);

        assert!(sink.by_category(AuditCategory::Registration).is_empty());
        assert!(sink.by_category(AuditCategory::Vote).is_empty());
        assert_eq!(sink.by_category(AuditCategory::Authorization).len(), 1);
        assert_eq!(sink.by_category(AuditCategory::Commit).len(), 1);
    }

    #[test]
    fn test_snapshot_save_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.json");
        let path = path.to_str().unwrap();

        let ops = bootstrap(&config(3), silent()).unwrap();
        replay_votes(&ops, &[vote("admin1", false), vote("admin2", false)]);
        save_snapshot(&ops, path).unwrap();

        let mut cfg = config(3);
        cfg.restore_path = Some(path.to_string());
        let restored = deploy(&cfg, silent()).unwrap();

        assert_eq!(restored.snapshot(), ops.snapshot());
        let report = replay_votes(&restored, &[vote("admin3", false)]);
        assert_eq!(report.commits, vec![false]);
    }

    #[test]
    fn test_restore_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            restore(missing.to_str().unwrap(), silent()),
            Err(OpsGateError::Internal(_))
        ));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            restore(garbage.to_str().unwrap(), silent()),
            Err(OpsGateError::Snapshot(SnapshotError::Serialization(_)))
        ));
    }
}
