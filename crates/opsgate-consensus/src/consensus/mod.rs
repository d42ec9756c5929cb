//! Consensus module - M-of-N admin votes over the operational flag
//!
//! This module provides:
//! - The vote round state machine (per-target, duplicate-free)
//! - The quorum rule (fixed threshold)
//! - The gate that authorizes voters and commits on quorum

pub mod gate;
pub mod quorum;
pub mod round;

pub use gate::ConsensusGate;
pub use quorum::QuorumManager;
pub use round::{Ballot, VoteRound};
