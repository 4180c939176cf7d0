use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by ledger, cooldown and claim/spend flows.
///
/// None of these are fatal: business-rule errors are fixed by user action
/// (wait, claim more), technical ones by retry.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Cooldown active: {remaining_millis}ms remaining")]
    CooldownActive { remaining_millis: u64 },

    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

impl LedgerError {
    /// Stable machine-readable tag, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::CooldownActive { .. } => "cooldown_active",
            LedgerError::Persistence(_) => "persistence",
            LedgerError::Remote(_) => "remote",
        }
    }

    /// True for failures caused by infrastructure rather than a ledger rule.
    pub fn is_technical(&self) -> bool {
        matches!(self, LedgerError::Persistence(_) | LedgerError::Remote(_))
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt value under key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Storage quota exceeded: {used} of {limit} bytes")]
    QuotaExceeded { used: usize, limit: usize },

    #[error("Storage lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Remote call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = match &self {
            LedgerError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            LedgerError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            LedgerError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            LedgerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LedgerError::Remote(RemoteError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            LedgerError::Remote(_) => StatusCode::BAD_GATEWAY,
        };

        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let LedgerError::CooldownActive { remaining_millis } = &self {
            body["remainingMillis"] = json!(remaining_millis);
            body["remainingWaitFormatted"] =
                json!(crate::cooldown::format_remaining(*remaining_millis));
        }

        (status, Json(body)).into_response()
    }
}
