//! Vote round for a pending operational value
//!
//! A round is `Idle` (no pending value) or `Voting(value, voters)`. Votes are
//! per target value: a vote for a different value discards the current round
//! and starts a fresh one with only the new caller.

use std::collections::BTreeSet;

use opsgate_common::Account;

use super::quorum::QuorumManager;

/// How a vote changed the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    /// First vote of a new round (from idle, or after a target switch)
    Started,
    /// Caller added to the existing round
    Added,
    /// Caller had already voted in this round; nothing changed
    Duplicate,
}

impl Ballot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ballot::Started => "new_round",
            Ballot::Added => "added",
            Ballot::Duplicate => "duplicate",
        }
    }
}

/// In-flight vote record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteRound {
    pending: Option<bool>,
    voters: BTreeSet<Account>,
}

impl VoteRound {
    /// Idle round
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a round from persisted parts.
    ///
    /// Callers validate the parts; an empty voter set always yields an idle round.
    pub(crate) fn from_parts(pending: Option<bool>, voters: BTreeSet<Account>) -> Self {
        match pending {
            Some(value) if !voters.is_empty() => Self {
                pending: Some(value),
                voters,
            },
            _ => Self::default(),
        }
    }

    /// Record a vote from an already-authorized caller
    pub fn cast(&mut self, target: bool, caller: Account) -> Ballot {
        if self.pending != Some(target) {
            self.pending = Some(target);
            self.voters.clear();
            self.voters.insert(caller);
            return Ballot::Started;
        }

        if self.voters.insert(caller) {
            Ballot::Added
        } else {
            Ballot::Duplicate
        }
    }

    /// Close the round and return its value once `quorum` is reached.
    ///
    /// An idle round or one still short of the threshold is left untouched.
    pub fn commit_if_reached(&mut self, quorum: &QuorumManager) -> Option<bool> {
        let value = self.pending?;
        if !quorum.is_reached(self.voters.len()) {
            return None;
        }
        self.pending = None;
        self.voters.clear();
        Some(value)
    }

    pub fn pending_value(&self) -> Option<bool> {
        self.pending
    }

    pub fn vote_count(&self) -> usize {
        self.voters.len()
    }

    /// Voters in account order
    pub fn voters(&self) -> impl Iterator<Item = &Account> {
        self.voters.iter()
    }
}
