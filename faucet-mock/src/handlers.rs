/// Axum HTTP handlers for the faucet endpoints

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use x402_ledger::is_valid_solana_address;
use x402_ledger::remote::types::{
    AirdropRequest, AirdropResponse, BalanceResponse, ClaimResponse, DeductResponse,
    ErrorResponse, RateLimitInfo, TokenRequest,
};

use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;

/// Custom error type for handlers
pub enum ApiError {
    BadRequest(String),
    TooManyRequests(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn validate_wallet(wallet: Option<&str>) -> Result<String, ApiError> {
    match wallet {
        Some(w) if is_valid_solana_address(w) => Ok(w.to_string()),
        _ => Err(ApiError::BadRequest("Invalid wallet address".to_string())),
    }
}

fn validate_amount(amount: i64) -> Result<u64, ApiError> {
    u64::try_from(amount)
        .ok()
        .filter(|a| *a > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid amount".to_string()))
}

fn rate_limited(
    state: &AppState,
    route: &str,
    wallet: &str,
    message: &str,
) -> Result<RateLimitDecision, ApiError> {
    let decision = state.limiter.check(&format!("{}_{}", route, wallet));
    if !decision.allowed {
        log::warn!("[{}] rate limit hit for {}", route.to_uppercase(), wallet);
        return Err(ApiError::TooManyRequests(message.to_string()));
    }
    Ok(decision)
}

/// POST /api/faucet/claim
/// Grants the requested amount to the wallet
pub async fn claim_tokens(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let Json(req) = body?;
    let wallet = validate_wallet(Some(&req.wallet_address))?;
    let amount = validate_amount(req.amount)?;
    let decision = rate_limited(
        &state,
        "faucet",
        &wallet,
        "Rate limit exceeded. Please try again later.",
    )?;

    let total = state.credit(&wallet, amount);
    log::info!("[FAUCET] {} claimed {} x402 tokens (total {})", wallet, amount, total);

    Ok(Json(ClaimResponse {
        success: true,
        amount,
        message: format!("Successfully claimed {} x402 tokens", amount),
        signature: Some(uuid::Uuid::new_v4().to_string()),
        rate_limit: Some(RateLimitInfo {
            remaining: decision.remaining,
        }),
    }))
}

/// POST /api/faucet/airdrop-sol
/// Airdrops devnet SOL to the wallet (defaults to 1 SOL)
pub async fn airdrop_sol(
    State(state): State<AppState>,
    body: Result<Json<AirdropRequest>, JsonRejection>,
) -> Result<Json<AirdropResponse>, ApiError> {
    let Json(req) = body?;
    let wallet = validate_wallet(Some(&req.wallet_address))?;
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(ApiError::BadRequest("Invalid amount".to_string()));
    }
    let decision = rate_limited(
        &state,
        "airdrop",
        &wallet,
        "Rate limit exceeded. Please try again later.",
    )?;

    let total = state.airdrop(&wallet, req.amount);
    log::info!("[AIRDROP] {} received {} SOL (total {})", wallet, req.amount, total);

    Ok(Json(AirdropResponse {
        success: true,
        amount: req.amount,
        message: format!("Successfully airdropped {} SOL", req.amount),
        signature: Some(uuid::Uuid::new_v4().to_string()),
        rate_limit: Some(RateLimitInfo {
            remaining: decision.remaining,
        }),
    }))
}

/// POST /api/tokens/deduct
/// Logs app usage; balances are deducted on the client
pub async fn deduct_tokens(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<DeductResponse>, ApiError> {
    let Json(req) = body?;
    let wallet = validate_wallet(Some(&req.wallet_address))?;
    let amount = validate_amount(req.amount)?;
    let decision = rate_limited(
        &state,
        "deduct",
        &wallet,
        "Too many app interactions. Please wait a moment.",
    )?;

    log::info!("[DEDUCT] User {} used app - {} tokens deducted", wallet, amount);

    Ok(Json(DeductResponse {
        success: true,
        message: format!("{} tokens deducted for app usage", amount),
        wallet_address: wallet,
        amount,
        rate_limit: Some(RateLimitInfo {
            remaining: decision.remaining,
        }),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub wallet: Option<String>,
}

/// GET /api/balance?wallet={address}
/// Returns the tokens granted to the wallet so far
pub async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let wallet = validate_wallet(query.wallet.as_deref())?;
    let decision = rate_limited(
        &state,
        "balance",
        &wallet,
        "Too many requests. Please wait a moment.",
    )?;

    Ok(Json(BalanceResponse {
        success: true,
        x402_balance: Some(state.credited(&wallet)),
        sol_balance: state.sol_balance(&wallet),
        wallet,
        rate_limit: Some(RateLimitInfo {
            remaining: decision.remaining,
        }),
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
