//! Persisted gate state
//!
//! Profiles are emitted sorted by account and voters as a sorted,
//! duplicate-free list, so two snapshots of the same state serialize to the
//! same bytes.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use opsgate_common::{Account, Profile, SnapshotError};

/// One registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub account: Account,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Full state of an [`crate::OpsGate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub owner: Account,
    pub profiles: Vec<ProfileEntry>,
    pub operational: bool,
    pub pending_value: Option<bool>,
    pub voters: Vec<Account>,
    pub threshold: usize,
}

impl GateSnapshot {
    /// Check the gate invariants a restored state must satisfy
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.threshold == 0 {
            return Err(SnapshotError::Inconsistent("threshold must be at least 1".into()));
        }

        if self.pending_value.is_some() != !self.voters.is_empty() {
            return Err(SnapshotError::Inconsistent(
                "voters must be non-empty exactly when a value is pending".into(),
            ));
        }

        if self.voters.len() >= self.threshold {
            return Err(SnapshotError::Inconsistent(format!(
                "{} voters recorded but threshold is {}",
                self.voters.len(),
                self.threshold
            )));
        }

        let profiles = self.profile_map()?;

        let mut seen = BTreeSet::new();
        for voter in &self.voters {
            if !seen.insert(*voter) {
                return Err(SnapshotError::Inconsistent(format!("duplicate voter {}", voter)));
            }
            let eligible = profiles.get(voter).map(Profile::can_vote).unwrap_or(false);
            if !eligible {
                return Err(SnapshotError::Inconsistent(format!(
                    "voter {} is not a registered admin",
                    voter
                )));
            }
        }

        Ok(())
    }

    /// Profiles keyed by account, rejecting duplicate or unregistered entries
    pub(crate) fn profile_map(&self) -> Result<HashMap<Account, Profile>, SnapshotError> {
        let mut map = HashMap::with_capacity(self.profiles.len());
        for entry in &self.profiles {
            if !entry.profile.registered {
                return Err(SnapshotError::Inconsistent(format!(
                    "profile for {} is not registered",
                    entry.account
                )));
            }
            if map.insert(entry.account, entry.profile).is_some() {
                return Err(SnapshotError::Inconsistent(format!(
                    "duplicate profile for {}",
                    entry.account
                )));
            }
        }
        Ok(map)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }
}
