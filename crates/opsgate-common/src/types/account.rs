//! Account - fixed-width identity key for registry entries and voters
//!
//! Accounts are opaque 20-byte identifiers. The gate never verifies who is
//! behind an account: the caller identity is supplied by the surrounding
//! transport (signer, authenticated session) and trusted verbatim.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Account identifier width in bytes
pub const ACCOUNT_LEN: usize = 20;

/// Address-like account identifier
///
/// Ordering is bytewise, so sorted collections of accounts have a stable
/// wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Account([u8; ACCOUNT_LEN]);

impl Account {
    /// Wrap raw identifier bytes
    pub const fn new(bytes: [u8; ACCOUNT_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic account from a human-readable label
    ///
    /// Takes the first 20 bytes of the BLAKE3 hash of the label. Used to name
    /// seed accounts in configuration and tests.
    ///
    /// # Example
    /// ```
    /// use opsgate_common::Account;
    ///
    /// assert_eq!(Account::from_label("owner"), Account::from_label("owner"));
    /// assert_ne!(Account::from_label("owner"), Account::from_label("admin1"));
    /// ```
    pub fn from_label(label: &str) -> Self {
        let hash = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; ACCOUNT_LEN];
        bytes.copy_from_slice(&hash.as_bytes()[..ACCOUNT_LEN]);
        Self(bytes)
    }

    /// Generate a fresh random account
    pub fn random() -> Self {
        let mut bytes = [0u8; ACCOUNT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Account {
    type Err = AccountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.len() != ACCOUNT_LEN * 2 {
            return Err(AccountParseError::InvalidLength {
                expected: ACCOUNT_LEN * 2,
                actual: digits.len(),
            });
        }

        let mut bytes = [0u8; ACCOUNT_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| AccountParseError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ACCOUNT_LEN]> for Account {
    fn from(bytes: [u8; ACCOUNT_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors raised while parsing an account from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountParseError {
    #[error("Invalid account length: expected {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex encoding")]
    InvalidHex,
}
