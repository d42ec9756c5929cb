//! # OpsGate Common
//!
//! Shared types, errors, and the audit trail for the OpsGate circuit breaker.
//!
//! ## Core Types
//!
//! - [`Account`]: fixed-width 20-byte account identifier
//! - [`Profile`]: per-account registration record (registered / admin)
//! - [`CommitResult`]: outcome of a vote on the operational flag
//!
//! ## Security
//!
//! - [`security::audit`]: Audit logging of registrations, votes and commits

pub mod error;
pub mod security;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ConsensusError, OpsGateError, RegistryError, Result, SnapshotError};
pub use types::{
    account::{Account, AccountParseError, ACCOUNT_LEN},
    commit::CommitResult,
    profile::Profile,
};

/// OpsGate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of distinct admin votes required to commit a change
pub const DEFAULT_THRESHOLD: usize = 3;
