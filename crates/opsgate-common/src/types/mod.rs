//! Core data types for OpsGate

pub mod account;
pub mod commit;
pub mod profile;
