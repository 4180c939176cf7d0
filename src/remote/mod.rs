//! Remote collaborators
//!
//! The ledger never talks to the network itself. Claim submission, SOL
//! airdrops, remote balance lookup and spend logging are consumed through
//! [`RemoteFaucet`];
//! [`HttpFaucetClient`] is the HTTP implementation.

mod client;
pub mod types;

pub use client::HttpFaucetClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::RemoteError;
use crate::identity::WalletIdentity;

/// Proof that the remote faucet accepted a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub amount: u64,
    pub message: String,
    pub signature: Option<String>,
}

/// Devnet SOL granted by an airdrop
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropReceipt {
    pub amount_sol: f64,
    pub message: String,
    pub signature: Option<String>,
}

/// Balances as the remote side reports them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBalance {
    pub x402: u64,
    pub sol: f64,
}

#[async_trait]
pub trait RemoteFaucet: Send + Sync {
    async fn submit_claim(
        &self,
        identity: &WalletIdentity,
        amount: u64,
    ) -> Result<SubmissionReceipt, RemoteError>;

    /// Request `amount_sol` devnet SOL for `identity`
    async fn airdrop_sol(
        &self,
        identity: &WalletIdentity,
        amount_sol: f64,
    ) -> Result<AirdropReceipt, RemoteError>;

    /// Token and SOL balance as the remote side sees them. Never touches the
    /// local ledger.
    async fn fetch_remote_balance(
        &self,
        identity: &WalletIdentity,
    ) -> Result<RemoteBalance, RemoteError>;

    /// Record a spend for telemetry. Callers ignore failures.
    async fn log_spend(&self, identity: &WalletIdentity, amount: u64) -> Result<(), RemoteError>;
}
