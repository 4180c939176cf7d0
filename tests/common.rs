//! Common test utilities for token ledger integration tests
//!
//! This module provides shared test infrastructure including:
//! - A scriptable in-process faucet (`StubFaucet`)
//! - Test environment setup with a temp-dir file store and a manual clock
//! - Logger initialization

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use x402_ledger::{
    AirdropReceipt, FileStore, ManualClock, ReconciliationPolicy, RemoteBalance, RemoteError,
    RemoteFaucet, SubmissionReceipt, TokenConfig, TokenManager, WalletIdentity,
};

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

pub const WALLET_1: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const WALLET_2: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// In-process faucet whose behaviour tests can script
#[derive(Default)]
pub struct StubFaucet {
    pub fail_claims: AtomicBool,
    pub fail_spend_logs: AtomicBool,
    pub fail_airdrops: AtomicBool,
    pub delay: Mutex<Duration>,
    /// Tokens granted so far, reported as the remote balance
    pub granted: AtomicU64,
    /// SOL airdropped so far, in lamports
    pub lamports: AtomicU64,
    pub claims: AtomicUsize,
    pub airdrops: AtomicUsize,
    pub spend_logs: AtomicUsize,
}

impl StubFaucet {
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteFaucet for StubFaucet {
    async fn submit_claim(
        &self,
        identity: &WalletIdentity,
        amount: u64,
    ) -> Result<SubmissionReceipt, RemoteError> {
        self.pause().await;
        if self.fail_claims.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 500,
                message: "faucet wallet empty".to_string(),
            });
        }
        self.claims.fetch_add(1, Ordering::SeqCst);
        self.granted.fetch_add(amount, Ordering::SeqCst);
        Ok(SubmissionReceipt {
            amount,
            message: format!("granted {} to {}", amount, identity),
            signature: None,
        })
    }

    async fn airdrop_sol(
        &self,
        identity: &WalletIdentity,
        amount_sol: f64,
    ) -> Result<AirdropReceipt, RemoteError> {
        self.pause().await;
        if self.fail_airdrops.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 500,
                message: "airdrop request limit reached".to_string(),
            });
        }
        self.airdrops.fetch_add(1, Ordering::SeqCst);
        self.lamports
            .fetch_add((amount_sol * LAMPORTS_PER_SOL) as u64, Ordering::SeqCst);
        Ok(AirdropReceipt {
            amount_sol,
            message: format!("airdropped {} SOL to {}", amount_sol, identity),
            signature: Some("stub-signature".to_string()),
        })
    }

    async fn fetch_remote_balance(
        &self,
        _identity: &WalletIdentity,
    ) -> Result<RemoteBalance, RemoteError> {
        self.pause().await;
        Ok(RemoteBalance {
            x402: self.granted.load(Ordering::SeqCst),
            sol: self.lamports.load(Ordering::SeqCst) as f64 / LAMPORTS_PER_SOL,
        })
    }

    async fn log_spend(&self, _identity: &WalletIdentity, _amount: u64) -> Result<(), RemoteError> {
        if self.fail_spend_logs.load(Ordering::SeqCst) {
            return Err(RemoteError::InvalidResponse("logging offline".to_string()));
        }
        self.spend_logs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Test environment with automatic cleanup
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub faucet: Arc<StubFaucet>,
    pub manager: TokenManager,
}

impl TestEnvironment {
    pub fn new(policy: ReconciliationPolicy) -> anyhow::Result<Self> {
        Self::with_config(TokenConfig {
            reconciliation: policy,
            ..Default::default()
        })
    }

    pub fn with_config(config: TokenConfig) -> anyhow::Result<Self> {
        init_logger();

        let temp_dir = TempDir::new()?;
        log::info!("📁 Test directory: {:?}", temp_dir.path());

        let store = Arc::new(FileStore::new_with_base_dir(temp_dir.path().to_path_buf()));
        let clock = Arc::new(ManualClock::starting_now());
        let faucet = Arc::new(StubFaucet::default());
        let manager = TokenManager::with_components(config, store, faucet.clone(), clock.clone());

        Ok(Self {
            temp_dir,
            clock,
            faucet,
            manager,
        })
    }

    /// A second manager over the same directory, as after a reload
    pub fn reopen(&self) -> TokenManager {
        let store = Arc::new(FileStore::new_with_base_dir(
            self.temp_dir.path().to_path_buf(),
        ));
        TokenManager::with_components(
            self.manager.config.clone(),
            store,
            self.faucet.clone(),
            self.clock.clone(),
        )
    }
}
