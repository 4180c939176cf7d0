use async_trait::async_trait;
use std::time::Duration;

use super::types::{
    AirdropRequest, AirdropResponse, BalanceResponse, ClaimResponse, DeductResponse,
    ErrorResponse, TokenRequest,
};
use super::{AirdropReceipt, RemoteBalance, RemoteFaucet, SubmissionReceipt};
use crate::error::RemoteError;
use crate::identity::WalletIdentity;

/// HTTP client for the faucet service
pub struct HttpFaucetClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFaucetClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token_request(identity: &WalletIdentity, amount: u64) -> Result<TokenRequest, RemoteError> {
        let amount = i64::try_from(amount)
            .map_err(|_| RemoteError::InvalidRequest(format!("amount {} out of range", amount)))?;
        Ok(TokenRequest {
            wallet_address: identity.to_string(),
            amount,
        })
    }

    /// Turn a non-2xx response into `RemoteError::Status`, preferring the
    /// service's `{ "error": ... }` message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteFaucet for HttpFaucetClient {
    async fn submit_claim(
        &self,
        identity: &WalletIdentity,
        amount: u64,
    ) -> Result<SubmissionReceipt, RemoteError> {
        let url = format!("{}/api/faucet/claim", self.base_url);
        let body = Self::token_request(identity, amount)?;

        log::debug!("Submitting claim of {} for {} to {}", amount, identity, url);
        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_status(response).await?;

        let claim: ClaimResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        if !claim.success {
            return Err(RemoteError::InvalidResponse(claim.message));
        }
        if claim.amount != amount {
            return Err(RemoteError::InvalidResponse(format!(
                "faucet granted {} instead of {}",
                claim.amount, amount
            )));
        }

        Ok(SubmissionReceipt {
            amount: claim.amount,
            message: claim.message,
            signature: claim.signature,
        })
    }

    async fn airdrop_sol(
        &self,
        identity: &WalletIdentity,
        amount_sol: f64,
    ) -> Result<AirdropReceipt, RemoteError> {
        if !amount_sol.is_finite() || amount_sol <= 0.0 {
            return Err(RemoteError::InvalidRequest(format!(
                "airdrop amount {} must be positive",
                amount_sol
            )));
        }
        let url = format!("{}/api/faucet/airdrop-sol", self.base_url);
        let body = AirdropRequest {
            wallet_address: identity.to_string(),
            amount: amount_sol,
        };

        log::debug!("Requesting {} SOL for {} from {}", amount_sol, identity, url);
        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_status(response).await?;

        let airdrop: AirdropResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        if !airdrop.success {
            return Err(RemoteError::InvalidResponse(airdrop.message));
        }

        Ok(AirdropReceipt {
            amount_sol: airdrop.amount,
            message: airdrop.message,
            signature: airdrop.signature,
        })
    }

    async fn fetch_remote_balance(
        &self,
        identity: &WalletIdentity,
    ) -> Result<RemoteBalance, RemoteError> {
        let url = format!("{}/api/balance", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("wallet", identity.as_str())])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let balance: BalanceResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        let x402 = balance
            .x402_balance
            .ok_or_else(|| RemoteError::InvalidResponse("missing x402Balance".to_string()))?;
        Ok(RemoteBalance {
            x402,
            sol: balance.sol_balance,
        })
    }

    async fn log_spend(&self, identity: &WalletIdentity, amount: u64) -> Result<(), RemoteError> {
        let url = format!("{}/api/tokens/deduct", self.base_url);
        let body = Self::token_request(identity, amount)?;

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_status(response).await?;

        let deduct: DeductResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        log::debug!("Faucet acknowledged spend: {}", deduct.message);
        Ok(())
    }
}
