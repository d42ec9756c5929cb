//! # OpsGate Consensus
//!
//! Access-controlled circuit breaker: an `operational` flag that can only be
//! flipped once a quorum of distinct registered admins has voted for the same
//! value.
//!
//! ## Components
//!
//! - **Registry**: owner-managed account profiles (registered / admin)
//! - **Consensus**: vote round, quorum rule, and the gate that commits
//! - **Snapshot**: serializable copy of the full state
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                    OpsGate                   │
//! ├──────────────────────────────────────────────┤
//! │  ┌───────────────────┐   ┌─────────────────┐ │
//! │  │   ConsensusGate   │──▶│ AccountRegistry │ │
//! │  │ (operational flag,│   │   (profiles)    │ │
//! │  │   vote round)     │   │                 │ │
//! │  └───────────────────┘   └─────────────────┘ │
//! └──────────────────────────────────────────────┘
//! ```

pub mod consensus;
pub mod registry;
pub mod snapshot;

pub use consensus::{Ballot, ConsensusGate, QuorumManager, VoteRound};
pub use registry::AccountRegistry;
pub use snapshot::{GateSnapshot, ProfileEntry};

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use opsgate_common::security::AuditLogger;
use opsgate_common::{
    Account, CommitResult, ConsensusError, Profile, RegistryError, SnapshotError,
    DEFAULT_THRESHOLD,
};

/// Gate configuration
///
/// A fresh gate always starts operational; only a restored snapshot can start
/// paused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Distinct admin votes required to commit (e.g., 3 for 3-of-5)
    pub threshold: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Public operation surface: registry plus operational-status gate
///
/// Registration is only accepted while the gate is operational. Voting is
/// never gated by the flag, so a paused gate can always be switched back on.
pub struct OpsGate {
    gate: ConsensusGate,
}

impl OpsGate {
    /// Deploy a fresh, operational gate owned by `owner`
    pub fn new(owner: Account, config: &GateConfig) -> Result<Self, ConsensusError> {
        Self::with_audit(owner, config, Arc::new(AuditLogger::new()))
    }

    /// Deploy a fresh gate whose registry and gate share `audit`
    pub fn with_audit(
        owner: Account,
        config: &GateConfig,
        audit: Arc<AuditLogger>,
    ) -> Result<Self, ConsensusError> {
        let registry = Arc::new(AccountRegistry::with_audit(owner, audit.clone()));
        let gate = ConsensusGate::with_audit(registry, config, audit)?;
        Ok(Self { gate })
    }

    /// Rebuild a gate from a snapshot after checking its invariants
    pub fn restore(snapshot: &GateSnapshot) -> Result<Self, SnapshotError> {
        Self::restore_with_audit(snapshot, Arc::new(AuditLogger::new()))
    }

    pub fn restore_with_audit(
        snapshot: &GateSnapshot,
        audit: Arc<AuditLogger>,
    ) -> Result<Self, SnapshotError> {
        snapshot.validate()?;

        let quorum = QuorumManager::new(snapshot.threshold)
            .map_err(|e| SnapshotError::Inconsistent(e.to_string()))?;
        let profiles = snapshot.profile_map()?;
        let registry = Arc::new(AccountRegistry::from_profiles(
            snapshot.owner,
            profiles,
            audit.clone(),
        ));
        let voters: BTreeSet<Account> = snapshot.voters.iter().copied().collect();
        let round = VoteRound::from_parts(snapshot.pending_value, voters);

        Ok(Self {
            gate: ConsensusGate::from_parts(registry, quorum, snapshot.operational, round, audit),
        })
    }

    /// Register `target` as the owner; rejected while not operational
    pub fn register(
        &self,
        caller: Account,
        target: Account,
        as_admin: bool,
    ) -> Result<(), RegistryError> {
        let registry = self.gate.registry();
        self.gate.inspect(|state| {
            if caller == registry.owner() && !state.operational {
                warn!(caller = %caller, target = %target, "Registration rejected: not operational");
                registry
                    .audit()
                    .log_registration(caller, target, as_admin, Some("not_operational"));
                return Err(RegistryError::NotOperational);
            }
            registry.register(caller, target, as_admin)
        })
    }

    pub fn is_registered(&self, account: &Account) -> bool {
        self.gate.registry().is_registered(account)
    }

    pub fn is_admin(&self, account: &Account) -> bool {
        self.gate.registry().is_admin(account)
    }

    pub fn profile(&self, account: &Account) -> Profile {
        self.gate.registry().profile(account)
    }

    pub fn owner(&self) -> Account {
        self.gate.registry().owner()
    }

    /// Committed operational value
    pub fn operational(&self) -> bool {
        self.gate.current_state()
    }

    /// Vote to set the operational value; commits once the threshold is met
    pub fn set_operating_status(
        &self,
        target: bool,
        caller: Account,
    ) -> Result<CommitResult, ConsensusError> {
        self.gate.propose_or_vote(target, caller)
    }

    /// Like [`OpsGate::set_operating_status`], also reporting how the round changed
    pub fn cast_vote(
        &self,
        target: bool,
        caller: Account,
    ) -> Result<(Ballot, CommitResult), ConsensusError> {
        self.gate.cast_vote(target, caller)
    }

    pub fn pending_value(&self) -> Option<bool> {
        self.gate.pending_value()
    }

    pub fn vote_count(&self) -> usize {
        self.gate.vote_count()
    }

    pub fn voters(&self) -> Vec<Account> {
        self.gate.voters()
    }

    pub fn threshold(&self) -> usize {
        self.gate.threshold()
    }

    pub fn registry(&self) -> &AccountRegistry {
        self.gate.registry()
    }

    /// Consistent copy of the full state
    pub fn snapshot(&self) -> GateSnapshot {
        let registry = self.gate.registry();
        let threshold = self.gate.threshold();
        self.gate.inspect(|state| GateSnapshot {
            owner: registry.owner(),
            profiles: registry
                .profiles()
                .into_iter()
                .map(|(account, profile)| ProfileEntry { account, profile })
                .collect(),
            operational: state.operational,
            pending_value: state.round.pending_value(),
            voters: state.round.voters().copied().collect(),
            threshold,
        })
    }
}

impl std::fmt::Debug for OpsGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsGate")
            .field("registry", self.gate.registry())
            .field("gate", &self.gate)
            .finish()
    }
}
