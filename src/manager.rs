/// Token Manager - Orchestration Layer
///
/// Composes the cooldown gate, ledger, reconciler and remote faucet into the
/// claim and spend flows the UI calls.

use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use crate::clock::{Clock, SystemClock};
use crate::config::TokenConfig;
use crate::cooldown::{format_remaining, CooldownGate};
use crate::error::{LedgerError, RemoteError};
use crate::identity::WalletIdentity;
use crate::ledger::Ledger;
use crate::locks::IdentityLocks;
use crate::reconcile::{ReconciliationPolicy, Reconciler};
use crate::remote::{
    AirdropReceipt, HttpFaucetClient, RemoteBalance, RemoteFaucet, SubmissionReceipt,
};
use crate::storage::{FileStore, RecordStore, Store};

/// What the UI renders for one wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDisplay {
    pub wallet: WalletIdentity,
    pub claimable: bool,
    pub remaining_millis: u64,
    pub remaining_wait_formatted: String,
    pub available_balance: u64,
    pub remote_balance: Option<u64>,
    /// Last fetched devnet SOL balance
    pub sol_balance: Option<f64>,
    pub policy: ReconciliationPolicy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutcome {
    pub amount: u64,
    pub receipt: SubmissionReceipt,
    pub balance: BalanceDisplay,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolClaimOutcome {
    pub amount_sol: f64,
    pub receipt: AirdropReceipt,
    pub balance: BalanceDisplay,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendOutcome {
    pub amount: u64,
    pub available_balance: u64,
}

pub struct TokenManager {
    pub config: TokenConfig,
    ledger: Arc<Ledger>,
    cooldown: CooldownGate,
    reconciler: Reconciler,
    remote: Arc<dyn RemoteFaucet>,
    // Held across the remote call of a claim
    claim_locks: IdentityLocks<tokio::sync::Mutex<()>>,
    remote_balances: RwLock<HashMap<WalletIdentity, RemoteBalance>>,
}

impl TokenManager {
    // ============================================================================
    // Constructors
    // ============================================================================

    /// File-backed store, HTTP faucet client and system clock from `config`
    pub fn new(config: TokenConfig) -> Result<Self, LedgerError> {
        let store = Arc::new(FileStore::new_with_base_dir(config.data_dir.clone()));
        let remote = Arc::new(HttpFaucetClient::new(
            config.faucet_url.clone(),
            config.remote_timeout,
        )?);
        Ok(Self::with_components(config, store, remote, Arc::new(SystemClock)))
    }

    /// Wire custom components (for testing or embedding)
    pub fn with_components(
        config: TokenConfig,
        store: Arc<dyn Store>,
        remote: Arc<dyn RemoteFaucet>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let records = Arc::new(RecordStore::new(store));
        let ledger = Arc::new(Ledger::new(records.clone()));
        let cooldown = CooldownGate::new(records, clock, config.cooldown);
        let reconciler = Reconciler::new(config.reconciliation, ledger.clone());

        Self {
            config,
            ledger,
            cooldown,
            reconciler,
            remote,
            claim_locks: IdentityLocks::new(),
            remote_balances: RwLock::new(HashMap::new()),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn cooldown(&self) -> &CooldownGate {
        &self.cooldown
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub fn status(&self, identity: &WalletIdentity) -> Result<BalanceDisplay, LedgerError> {
        let cooldown = self.cooldown.check_status(identity)?;
        let remote = self.cached_remote_balance(identity);
        let display = self
            .reconciler
            .display_balance(identity, remote.map(|b| b.x402))?;

        Ok(BalanceDisplay {
            wallet: identity.clone(),
            claimable: cooldown.can_claim,
            remaining_millis: cooldown.remaining_millis,
            remaining_wait_formatted: if cooldown.can_claim {
                String::new()
            } else {
                format_remaining(cooldown.remaining_millis)
            },
            available_balance: display.spendable,
            remote_balance: display.remote,
            sol_balance: remote.map(|b| b.sol),
            policy: self.reconciler.policy(),
        })
    }

    pub fn has_enough_tokens(&self, identity: &WalletIdentity, amount: u64) -> Result<bool, LedgerError> {
        Ok(self.status(identity)?.available_balance >= amount)
    }

    // ============================================================================
    // Claim
    // ============================================================================

    /// Claim the configured faucet amount
    pub async fn claim(&self, identity: &WalletIdentity) -> Result<ClaimOutcome, LedgerError> {
        self.claim_amount(identity, self.config.faucet_amount).await
    }

    /// Cooldown check, remote submission, then one combined ledger+cooldown
    /// write. A remote failure leaves the ledger untouched.
    pub async fn claim_amount(
        &self,
        identity: &WalletIdentity,
        amount: u64,
    ) -> Result<ClaimOutcome, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }

        let lock = self.claim_locks.get(identity);
        let _guard = lock.lock().await;

        let status = self.cooldown.check_status(identity)?;
        if !status.can_claim {
            log::warn!(
                "Claim for {} blocked, {} remaining",
                identity,
                format_remaining(status.remaining_millis)
            );
            return Err(LedgerError::CooldownActive {
                remaining_millis: status.remaining_millis,
            });
        }

        let receipt = self
            .with_timeout(self.remote.submit_claim(identity, amount))
            .await
            .map_err(|e| {
                log::warn!("Faucet rejected claim for {}: {}", identity, e);
                e
            })?;

        self.ledger.claim_with_cooldown(
            identity,
            amount,
            self.cooldown.now_millis(),
            self.cooldown.window_millis(),
        )?;

        if self.reconciler.policy().needs_remote() {
            if let Err(e) = self.fetch_and_cache(identity).await {
                log::warn!("Balance refresh after claim failed for {}: {}", identity, e);
            }
        }

        Ok(ClaimOutcome {
            amount,
            receipt,
            balance: self.status(identity)?,
        })
    }

    /// Request the configured devnet SOL airdrop.
    ///
    /// Shares the token claim's cooldown: an airdrop blocks the next claim and
    /// the other way round. Nothing is credited to the local ledger.
    pub async fn claim_sol(
        &self,
        identity: &WalletIdentity,
    ) -> Result<SolClaimOutcome, LedgerError> {
        let amount_sol = self.config.sol_airdrop_amount;
        if !amount_sol.is_finite() || amount_sol <= 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "SOL airdrop amount must be positive, got {}",
                amount_sol
            )));
        }

        let lock = self.claim_locks.get(identity);
        let _guard = lock.lock().await;

        let status = self.cooldown.check_status(identity)?;
        if !status.can_claim {
            log::warn!(
                "SOL airdrop for {} blocked, {} remaining",
                identity,
                format_remaining(status.remaining_millis)
            );
            return Err(LedgerError::CooldownActive {
                remaining_millis: status.remaining_millis,
            });
        }

        let receipt = self
            .with_timeout(self.remote.airdrop_sol(identity, amount_sol))
            .await
            .map_err(|e| {
                log::warn!("SOL airdrop for {} failed: {}", identity, e);
                e
            })?;

        self.cooldown.start_if_ready(identity)?;
        log::info!("Airdropped {} SOL to {}", receipt.amount_sol, identity);

        if let Err(e) = self.fetch_and_cache(identity).await {
            log::warn!("Balance refresh after airdrop failed for {}: {}", identity, e);
        }

        Ok(SolClaimOutcome {
            amount_sol: receipt.amount_sol,
            receipt,
            balance: self.status(identity)?,
        })
    }

    // ============================================================================
    // Spend
    // ============================================================================

    /// Deduct the configured app fee
    pub fn spend_app_fee(&self, identity: &WalletIdentity) -> Result<SpendOutcome, LedgerError> {
        self.spend(identity, self.config.app_fee)
    }

    /// Deduct locally, then log the spend to the faucet in the background.
    pub fn spend(&self, identity: &WalletIdentity, amount: u64) -> Result<SpendOutcome, LedgerError> {
        let remote_balance = self.cached_remote_balance(identity).map(|b| b.x402);
        let available_balance = self.reconciler.spend(identity, amount, remote_balance)?;
        self.log_spend_in_background(identity, amount);

        Ok(SpendOutcome {
            amount,
            available_balance,
        })
    }

    /// Boolean form of [`TokenManager::spend`] for simple feature gates
    pub fn try_spend(&self, identity: &WalletIdentity, amount: u64) -> bool {
        match self.spend(identity, amount) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Spend gate closed for {}: {}", identity, e);
                false
            }
        }
    }

    fn log_spend_in_background(&self, identity: &WalletIdentity, amount: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::debug!("No async runtime, spend of {} for {} not logged", amount, identity);
            return;
        };

        let remote = self.remote.clone();
        let identity = identity.clone();
        let timeout = self.config.remote_timeout;
        handle.spawn(async move {
            match tokio::time::timeout(timeout, remote.log_spend(&identity, amount)).await {
                Ok(Ok(())) => log::debug!("Logged spend of {} for {}", amount, identity),
                Ok(Err(e)) => log::warn!("Spend log for {} failed: {}", identity, e),
                Err(_) => log::warn!("Spend log for {} timed out", identity),
            }
        });
    }

    // ============================================================================
    // Remote balance
    // ============================================================================

    /// Fetch the remote balance and return the reconciled display
    pub async fn refresh_remote_balance(
        &self,
        identity: &WalletIdentity,
    ) -> Result<BalanceDisplay, LedgerError> {
        self.fetch_and_cache(identity).await?;
        self.status(identity)
    }

    async fn fetch_and_cache(
        &self,
        identity: &WalletIdentity,
    ) -> Result<RemoteBalance, LedgerError> {
        let balance = self
            .with_timeout(self.remote.fetch_remote_balance(identity))
            .await?;
        if let Ok(mut balances) = self.remote_balances.write() {
            balances.insert(identity.clone(), balance);
        }
        log::debug!(
            "Remote balance for {}: {} x402, {} SOL",
            identity,
            balance.x402,
            balance.sol
        );
        Ok(balance)
    }

    fn cached_remote_balance(&self, identity: &WalletIdentity) -> Option<RemoteBalance> {
        self.remote_balances
            .read()
            .ok()
            .and_then(|balances| balances.get(identity).copied())
    }

    async fn with_timeout<T, F>(&self, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        let timeout = self.config.remote_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| RemoteError::Timeout(timeout))?
    }
}
