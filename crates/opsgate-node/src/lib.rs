//! # OpsGate Node
//!
//! Bootstrap harness for a single gate deployment. It loads configuration,
//! deploys a fresh gate (registering seed accounts as the owner) or resumes
//! one from a snapshot, then replays scripted votes and reports the result.

pub mod config;
pub mod harness;

pub use config::{NodeConfig, ScriptedVote};
pub use harness::{
    audit_logger, bootstrap, deploy, replay_votes, restore, save_snapshot, ReplayReport,
};
