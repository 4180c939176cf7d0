//! Store key layout
//!
//! One JSON record per wallet under `x402_ledger_<identity>`. The legacy
//! layout stored each field as a bare integer string under its own key.

use crate::identity::WalletIdentity;

pub const KEY_PREFIX: &str = "x402_";

pub fn record_key(identity: &WalletIdentity) -> String {
    format!("{}ledger_{}", KEY_PREFIX, identity)
}

pub fn legacy_claimed_key(identity: &WalletIdentity) -> String {
    format!("{}claimed_{}", KEY_PREFIX, identity)
}

pub fn legacy_spent_key(identity: &WalletIdentity) -> String {
    format!("{}spent_{}", KEY_PREFIX, identity)
}

pub fn legacy_cooldown_key(identity: &WalletIdentity) -> String {
    format!("{}cooldown_{}", KEY_PREFIX, identity)
}
