/// Faucet service wire types
///
/// JSON bodies exchanged with the remote faucet. Field names are camelCase
/// on the wire.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/faucet/claim` and `POST /api/tokens/deduct`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub wallet_address: String,
    /// Signed so the service can reject non-positive amounts itself
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub success: bool,
    pub amount: u64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductResponse {
    pub success: bool,
    pub message: String,
    pub wallet_address: String,
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
}

/// Body of `POST /api/faucet/airdrop-sol`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropRequest {
    pub wallet_address: String,
    /// SOL, fractional amounts allowed
    #[serde(default = "default_airdrop_amount")]
    pub amount: f64,
}

fn default_airdrop_amount() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropResponse {
    pub success: bool,
    pub amount: f64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
}

/// Response of `GET /api/balance?wallet=`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub success: bool,
    pub wallet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x402_balance: Option<u64>,
    #[serde(default)]
    pub sol_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
