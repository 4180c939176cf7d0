//! Wallet identity key
//!
//! The ledger treats identities as opaque strings. Address format checks are
//! only applied at service boundaries via [`is_valid_solana_address`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletIdentity(String);

impl WalletIdentity {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for WalletIdentity {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for WalletIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Base58 alphabet, 32 to 44 characters.
pub fn is_valid_solana_address(address: &str) -> bool {
    static BASE58: OnceLock<Regex> = OnceLock::new();
    BASE58
        .get_or_init(|| {
            Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("static base58 pattern")
        })
        .is_match(address)
}
