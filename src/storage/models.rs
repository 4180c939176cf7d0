//! Data models for ledger storage

use serde::{Deserialize, Serialize};

/// Current schema version of [`WalletRecord`]
pub const RECORD_VERSION: u32 = 1;

/// Everything persisted for one wallet identity.
///
/// Claim total, spend total and last claim time share one record so a claim
/// and its cooldown land in a single write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub version: u32,
    pub total_claimed: u64,
    pub total_spent: u64,
    /// Epoch milliseconds of the last successful claim
    #[serde(default)]
    pub last_claim_at: Option<i64>,
}

impl WalletRecord {
    /// Spendable amount, derived on every read
    pub fn available(&self) -> u64 {
        self.total_claimed.saturating_sub(self.total_spent)
    }

    pub fn is_empty(&self) -> bool {
        self.total_claimed == 0 && self.total_spent == 0 && self.last_claim_at.is_none()
    }
}

impl Default for WalletRecord {
    fn default() -> Self {
        Self {
            version: RECORD_VERSION,
            total_claimed: 0,
            total_spent: 0,
            last_claim_at: None,
        }
    }
}
