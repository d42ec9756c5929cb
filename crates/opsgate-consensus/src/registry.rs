//! Account registry
//!
//! Per-account profiles with an admin / non-admin distinction. Only the owner
//! (the bootstrap authority supplied at construction) may register accounts,
//! and an account can be registered exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use opsgate_common::security::AuditLogger;
use opsgate_common::{Account, Profile, RegistryError};

/// Profile table guarded by a reader/writer lock
pub struct AccountRegistry {
    owner: Account,
    profiles: RwLock<HashMap<Account, Profile>>,
    audit: Arc<AuditLogger>,
}

impl AccountRegistry {
    /// Create an empty registry owned by `owner`
    pub fn new(owner: Account) -> Self {
        Self::with_audit(owner, Arc::new(AuditLogger::new()))
    }

    /// Create an empty registry reporting to a shared audit logger
    pub fn with_audit(owner: Account, audit: Arc<AuditLogger>) -> Self {
        Self {
            owner,
            profiles: RwLock::new(HashMap::new()),
            audit,
        }
    }

    pub(crate) fn from_profiles(
        owner: Account,
        profiles: HashMap<Account, Profile>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            owner,
            profiles: RwLock::new(profiles),
            audit,
        }
    }

    pub(crate) fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// The bootstrap authority
    pub fn owner(&self) -> Account {
        self.owner
    }

    /// Register `target`, optionally as an admin.
    ///
    /// Fails with `Unauthorized` unless `caller` is the owner, and with
    /// `AlreadyRegistered` if `target` already has a profile. The existing
    /// profile is never overwritten.
    pub fn register(
        &self,
        caller: Account,
        target: Account,
        as_admin: bool,
    ) -> Result<(), RegistryError> {
        if caller != self.owner {
            warn!(caller = %caller, target = %target, "Registration rejected: caller is not owner");
            self.audit
                .log_registration(caller, target, as_admin, Some("unauthorized"));
            return Err(RegistryError::Unauthorized { caller });
        }

        let mut profiles = self.profiles.write();
        if profiles.contains_key(&target) {
            warn!(target = %target, "Registration rejected: account already registered");
            self.audit
                .log_registration(caller, target, as_admin, Some("already_registered"));
            return Err(RegistryError::AlreadyRegistered { account: target });
        }

        profiles.insert(target, Profile::registered(as_admin));
        drop(profiles);

        info!(account = %target, admin = as_admin, "Account registered");
        self.audit.log_registration(caller, target, as_admin, None);
        Ok(())
    }

    pub fn is_registered(&self, account: &Account) -> bool {
        self.profile(account).registered
    }

    /// Registered and flagged as admin
    pub fn is_admin(&self, account: &Account) -> bool {
        self.profile(account).can_vote()
    }

    /// Profile of `account`; unknown accounts read as the default profile
    pub fn profile(&self, account: &Account) -> Profile {
        self.profiles.read().get(account).copied().unwrap_or_default()
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }

    /// Number of registered admins
    pub fn admin_count(&self) -> usize {
        self.profiles.read().values().filter(|p| p.can_vote()).count()
    }

    /// All profiles, sorted by account
    pub fn profiles(&self) -> Vec<(Account, Profile)> {
        let mut all: Vec<_> = self
            .profiles
            .read()
            .iter()
            .map(|(account, profile)| (*account, *profile))
            .collect();
        all.sort_by_key(|(account, _)| *account);
        all
    }
}

impl std::fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("owner", &self.owner)
            .field("accounts", &self.len())
            .finish()
    }
}
