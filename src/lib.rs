//! x402 Token Ledger
//!
//! Client-side bookkeeping for the x402 in-app token: claimed and spent
//! totals per wallet, a claim cooldown, and a balance gate in front of paid
//! features.
//!
//! # Architecture
//!
//! - **Ledger**: claimed/spent totals, derived non-negative balance
//! - **Cooldown Gate**: fixed wait between claims, computed from elapsed time
//! - **Reconciler**: combines the ledger with a remote balance under an explicit policy
//! - **TokenManager**: claim and spend flows over an injected [`Store`] and [`RemoteFaucet`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use x402_ledger::{ManualClock, MemoryStore, TokenConfig, TokenManager, WalletIdentity};
//!
//! let manager = TokenManager::with_components(
//!     TokenConfig::default(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(my_faucet),
//!     Arc::new(ManualClock::starting_now()),
//! );
//!
//! let wallet = WalletIdentity::from("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
//! manager.claim(&wallet).await?;
//! assert!(manager.try_spend(&wallet, 4_000));
//! ```

pub mod api;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod locks;
pub mod manager;
pub mod reconcile;
pub mod remote;
pub mod storage;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TokenConfig;
pub use cooldown::{format_remaining, CooldownGate, CooldownState, CooldownStatus};
pub use error::{LedgerError, RemoteError, StorageError};
pub use identity::{is_valid_solana_address, WalletIdentity};
pub use ledger::Ledger;
pub use manager::{BalanceDisplay, ClaimOutcome, SolClaimOutcome, SpendOutcome, TokenManager};
pub use reconcile::{DisplayBalance, ReconciliationPolicy, Reconciler};
pub use remote::{
    AirdropReceipt, HttpFaucetClient, RemoteBalance, RemoteFaucet, SubmissionReceipt,
};
pub use storage::{FileStore, MemoryStore, RecordStore, Store, WalletRecord};

// Common result type
pub type Result<T> = std::result::Result<T, LedgerError>;
