//! Error types for OpsGate
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

use crate::types::account::Account;

/// Result type alias using OpsGateError
pub type Result<T> = std::result::Result<T, OpsGateError>;

/// Unified error type for OpsGate operations
#[derive(Debug, Error)]
pub enum OpsGateError {
    // Registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // Consensus errors
    #[error("Consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    // Snapshot errors
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Account registration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Caller {caller} is not the registry owner")]
    Unauthorized { caller: Account },

    #[error("Account {account} is already registered")]
    AlreadyRegistered { account: Account },

    #[error("Contract is currently not operational")]
    NotOperational,
}

/// Operational-status vote errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Caller {caller} is not a registered admin")]
    Unauthorized { caller: Account },

    #[error("Invalid threshold {0}: at least one vote is required")]
    InvalidThreshold(usize),
}

/// Persisted state errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Snapshot violates gate invariants: {0}")]
    Inconsistent(String),

    #[error("Snapshot could not be decoded: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for OpsGateError {
    fn from(err: std::io::Error) -> Self {
        OpsGateError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let caller = Account::from_label("mallory");
        let err = OpsGateError::from(ConsensusError::Unauthorized { caller });
        assert!(err.to_string().contains(&caller.to_string()));
    }

    #[test]
    fn test_not_operational_message() {
        let err = RegistryError::NotOperational;
        assert!(err.to_string().contains("not operational"));
    }

    #[test]
    fn test_invalid_threshold() {
        let err = ConsensusError::InvalidThreshold(0);
        assert!(err.to_string().contains("threshold 0"));
    }
}
