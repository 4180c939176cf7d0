use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::types::{positive_amount, SpendRequest};
use crate::{
    error::LedgerError,
    identity::WalletIdentity,
    manager::{BalanceDisplay, ClaimOutcome, SolClaimOutcome, SpendOutcome, TokenManager},
};

pub async fn get_status_handler(
    State(manager): State<Arc<TokenManager>>,
    Path(wallet): Path<String>,
) -> Result<Json<BalanceDisplay>, LedgerError> {
    let status = manager.status(&WalletIdentity::from(wallet))?;
    Ok(Json(status))
}

pub async fn claim_handler(
    State(manager): State<Arc<TokenManager>>,
    Path(wallet): Path<String>,
) -> Result<Json<ClaimOutcome>, LedgerError> {
    let identity = WalletIdentity::from(wallet);
    log::info!("Claim requested for {}", identity);
    let outcome = manager.claim(&identity).await?;
    Ok(Json(outcome))
}

pub async fn claim_sol_handler(
    State(manager): State<Arc<TokenManager>>,
    Path(wallet): Path<String>,
) -> Result<Json<SolClaimOutcome>, LedgerError> {
    let identity = WalletIdentity::from(wallet);
    log::info!("SOL airdrop requested for {}", identity);
    let outcome = manager.claim_sol(&identity).await?;
    Ok(Json(outcome))
}

pub async fn spend_handler(
    State(manager): State<Arc<TokenManager>>,
    Path(wallet): Path<String>,
    body: Bytes,
) -> Result<Json<SpendOutcome>, LedgerError> {
    let identity = WalletIdentity::from(wallet);
    let request = SpendRequest::from_body(&body)?;
    let amount = match request.amount {
        Some(amount) => positive_amount(amount)?,
        None => manager.config.app_fee,
    };

    let outcome = manager.spend(&identity, amount)?;
    Ok(Json(outcome))
}

pub async fn refresh_handler(
    State(manager): State<Arc<TokenManager>>,
    Path(wallet): Path<String>,
) -> Result<Json<BalanceDisplay>, LedgerError> {
    let status = manager
        .refresh_remote_balance(&WalletIdentity::from(wallet))
        .await?;
    Ok(Json(status))
}

pub async fn health_check() -> &'static str {
    "OK"
}
