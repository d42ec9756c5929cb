//! Profile - per-account registration record

use serde::{Deserialize, Serialize};

/// Registration record for one account
///
/// Unknown accounts read as `Profile::default()` (not registered, not admin),
/// which every privileged operation rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    /// Account has been registered by the owner
    pub registered: bool,
    /// Account may vote on operational-status changes
    pub is_admin: bool,
}

impl Profile {
    /// Profile for a freshly registered account
    pub fn registered(as_admin: bool) -> Self {
        Self {
            registered: true,
            is_admin: as_admin,
        }
    }

    /// Eligible to appear in a vote round
    #[inline]
    pub fn can_vote(&self) -> bool {
        self.registered && self.is_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_empty() {
        let profile = Profile::default();
        assert!(!profile.registered);
        assert!(!profile.is_admin);
        assert!(!profile.can_vote());
    }

    #[test]
    fn test_voting_requires_admin_and_registration() {
        assert!(Profile::registered(true).can_vote());
        assert!(!Profile::registered(false).can_vote());

        let unregistered_admin = Profile {
            registered: false,
            is_admin: true,
        };
        assert!(!unregistered_admin.can_vote());
    }
}
