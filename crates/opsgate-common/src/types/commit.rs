//! Outcome of a vote on the operational flag

use serde::{Deserialize, Serialize};

/// Result of a successful `propose_or_vote` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitResult {
    /// The round is still collecting votes
    Pending {
        /// Distinct admin votes in the current round
        votes: usize,
        /// Votes required to commit
        threshold: usize,
    },
    /// Quorum reached; carries the newly committed operational value
    Committed(bool),
}

impl CommitResult {
    /// True when the vote committed a new operational value
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitResult::Committed(_))
    }
}

impl std::fmt::Display for CommitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitResult::Pending { votes, threshold } => {
                write!(f, "pending ({}/{})", votes, threshold)
            }
            CommitResult::Committed(value) => write!(f, "committed ({})", value),
        }
    }
}
