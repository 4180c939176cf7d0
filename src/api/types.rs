use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpendRequest {
    /// Defaults to the configured app fee
    #[serde(default)]
    pub amount: Option<i64>,
}

impl SpendRequest {
    /// Parse a spend body. Only an empty body means "use the app fee"; any
    /// body that is present but malformed is rejected before the ledger is
    /// touched.
    pub fn from_body(body: &[u8]) -> Result<Self, LedgerError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| LedgerError::InvalidAmount(format!("malformed spend request: {}", e)))
    }
}

/// Convert a wire amount into a ledger amount, rejecting non-positive values
pub fn positive_amount(amount: i64) -> Result<u64, LedgerError> {
    u64::try_from(amount)
        .ok()
        .filter(|a| *a > 0)
        .ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "amount must be greater than zero, got {}",
                amount
            ))
        })
}
