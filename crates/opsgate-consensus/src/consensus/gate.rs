//! Consensus gate over the operational flag
//!
//! Holds the committed `operational` value and the in-flight vote round. All
//! reads and writes of that state go through one mutex, so concurrent
//! `propose_or_vote` calls are linearized. The registry is only read, always
//! after the gate lock is taken.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use opsgate_common::security::AuditLogger;
use opsgate_common::{Account, CommitResult, ConsensusError};

use super::quorum::QuorumManager;
use super::round::{Ballot, VoteRound};
use crate::registry::AccountRegistry;
use crate::GateConfig;

#[derive(Debug)]
pub(crate) struct GateState {
    pub(crate) operational: bool,
    pub(crate) round: VoteRound,
}

/// M-of-N admin gate for operational-status changes
pub struct ConsensusGate {
    registry: Arc<AccountRegistry>,
    quorum: QuorumManager,
    state: Mutex<GateState>,
    audit: Arc<AuditLogger>,
}

impl ConsensusGate {
    /// Create a gate with no pending round
    pub fn new(registry: Arc<AccountRegistry>, config: &GateConfig) -> Result<Self, ConsensusError> {
        Self::with_audit(registry, config, Arc::new(AuditLogger::new()))
    }

    /// Create a gate reporting to a shared audit logger
    pub fn with_audit(
        registry: Arc<AccountRegistry>,
        config: &GateConfig,
        audit: Arc<AuditLogger>,
    ) -> Result<Self, ConsensusError> {
        let quorum = QuorumManager::new(config.threshold)?;
        Ok(Self::from_parts(
            registry,
            quorum,
            true,
            VoteRound::new(),
            audit,
        ))
    }

    pub(crate) fn from_parts(
        registry: Arc<AccountRegistry>,
        quorum: QuorumManager,
        operational: bool,
        round: VoteRound,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            registry,
            quorum,
            state: Mutex::new(GateState { operational, round }),
            audit,
        }
    }

    /// Committed operational value
    pub fn current_state(&self) -> bool {
        self.state.lock().operational
    }

    pub fn threshold(&self) -> usize {
        self.quorum.threshold()
    }

    /// Value currently being voted on, if a round is open
    pub fn pending_value(&self) -> Option<bool> {
        self.state.lock().round.pending_value()
    }

    /// Distinct votes in the open round
    pub fn vote_count(&self) -> usize {
        self.state.lock().round.vote_count()
    }

    /// Voters of the open round, in account order
    pub fn voters(&self) -> Vec<Account> {
        self.state.lock().round.voters().copied().collect()
    }

    /// Vote for `target` as the new operational value.
    ///
    /// The caller must be a registered admin. Reaching the threshold commits
    /// the value and closes the round in the same step. A rejected call leaves
    /// the gate untouched.
    pub fn propose_or_vote(
        &self,
        target: bool,
        caller: Account,
    ) -> Result<CommitResult, ConsensusError> {
        self.cast_vote(target, caller).map(|(_, result)| result)
    }

    /// Same as [`ConsensusGate::propose_or_vote`], also returning the [`Ballot`]
    /// recorded under the gate lock
    pub fn cast_vote(
        &self,
        target: bool,
        caller: Account,
    ) -> Result<(Ballot, CommitResult), ConsensusError> {
        let mut state = self.state.lock();

        if !self.registry.is_admin(&caller) {
            warn!(caller = %caller, target, "Vote rejected: caller is not a registered admin");
            self.audit.log_unauthorized_vote(caller, target);
            return Err(ConsensusError::Unauthorized { caller });
        }

        let ballot = state.round.cast(target, caller);
        let votes = state.round.vote_count();
        let threshold = self.quorum.threshold();

        if ballot == Ballot::Duplicate {
            debug!(caller = %caller, target, votes, threshold, "Duplicate vote ignored");
            self.audit
                .log_vote(caller, ballot.as_str(), target, votes, threshold);
            return Ok((ballot, CommitResult::Pending { votes, threshold }));
        }

        debug!(caller = %caller, target, votes, threshold, ballot = ballot.as_str(), "Vote recorded");
        self.audit
            .log_vote(caller, ballot.as_str(), target, votes, threshold);

        let previous = state.operational;
        let Some(committed) = state.round.commit_if_reached(&self.quorum) else {
            return Ok((ballot, CommitResult::Pending { votes, threshold }));
        };
        state.operational = committed;
        drop(state);

        info!(operational = committed, previous, quorum = votes, "Operational status committed");
        self.audit.log_commit(caller, previous, committed, votes);
        Ok((ballot, CommitResult::Committed(committed)))
    }

    /// Run `f` against the gate state while holding the gate lock
    pub(crate) fn inspect<R>(&self, f: impl FnOnce(&GateState) -> R) -> R {
        let state = self.state.lock();
        f(&state)
    }

    pub(crate) fn registry(&self) -> &Arc<AccountRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for ConsensusGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConsensusGate")
            .field("operational", &state.operational)
            .field("pending", &state.round.pending_value())
            .field("votes", &state.round.vote_count())
            .field("threshold", &self.quorum.threshold())
            .finish()
    }
}
