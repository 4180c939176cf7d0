//! Token Manager Integration Tests
//!
//! Claim and spend flows end to end against the scripted faucet: remote
//! failures, timeouts, concurrent claims and both reconciliation policies.
//!
//! Run with: cargo test --test manager_test -- --nocapture

mod common;

use common::{TestEnvironment, WALLET_1, WALLET_2};
use std::sync::atomic::Ordering;
use std::time::Duration;
use x402_ledger::{
    Clock, LedgerError, ReconciliationPolicy, RemoteError, TokenConfig, WalletIdentity,
};

// ============================================================================
// Claim
// ============================================================================

#[tokio::test]
async fn test_claim_credits_and_starts_cooldown() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);

    let outcome = env.manager.claim(&w1).await.unwrap();
    assert_eq!(outcome.amount, 10_000);
    assert_eq!(outcome.receipt.amount, 10_000);
    assert_eq!(outcome.balance.available_balance, 10_000);
    assert!(!outcome.balance.claimable);
    assert_eq!(outcome.balance.remaining_wait_formatted, "30m 0s");

    let record = env.manager.ledger().totals(&w1).unwrap();
    assert_eq!(record.total_claimed, 10_000);
    assert_eq!(record.last_claim_at, Some(env.clock.now_millis()));
}

#[tokio::test]
async fn test_remote_failure_mutates_nothing() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.faucet.fail_claims.store(true, Ordering::SeqCst);

    let err = env.manager.claim(&w1).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Remote(RemoteError::Status { status: 500, .. })
    ));
    assert!(err.is_technical());

    let status = env.manager.status(&w1).unwrap();
    assert!(status.claimable);
    assert_eq!(status.available_balance, 0);

    // Retry succeeds once the faucet recovers
    env.faucet.fail_claims.store(false, Ordering::SeqCst);
    env.manager.claim(&w1).await.unwrap();
    assert_eq!(env.manager.status(&w1).unwrap().available_balance, 10_000);
}

#[tokio::test]
async fn test_remote_timeout_is_retryable() {
    let env = TestEnvironment::with_config(TokenConfig {
        remote_timeout: Duration::from_millis(50),
        ..Default::default()
    })
    .unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.faucet.set_delay(Duration::from_millis(500));

    let err = env.manager.claim(&w1).await.unwrap_err();
    assert!(matches!(err, LedgerError::Remote(RemoteError::Timeout(_))));
    assert!(env.manager.status(&w1).unwrap().claimable);
    assert_eq!(env.manager.ledger().totals(&w1).unwrap().total_claimed, 0);

    env.faucet.set_delay(Duration::ZERO);
    env.manager.claim(&w1).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_claims_admit_exactly_one() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.faucet.set_delay(Duration::from_millis(50));

    let (a, b) = tokio::join!(env.manager.claim(&w1), env.manager.claim(&w1));
    let results = [a, b];

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let blocked = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::CooldownActive { .. })))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(blocked, 1);
    assert_eq!(env.faucet.claims.load(Ordering::SeqCst), 1);
    assert_eq!(env.manager.ledger().totals(&w1).unwrap().total_claimed, 10_000);
}

#[tokio::test]
async fn test_claims_for_different_wallets_do_not_block() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    let w2 = WalletIdentity::from(WALLET_2);

    env.manager.claim(&w1).await.unwrap();
    env.manager.claim(&w2).await.unwrap();
    assert_eq!(env.manager.status(&w2).unwrap().available_balance, 10_000);
}

// ============================================================================
// Spend
// ============================================================================

#[tokio::test]
async fn test_spend_app_fee_and_gate() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);

    assert!(!env.manager.try_spend(&w1, 4_000));
    env.manager.claim(&w1).await.unwrap();

    assert_eq!(env.manager.spend_app_fee(&w1).unwrap().available_balance, 6_000);
    assert_eq!(env.manager.spend_app_fee(&w1).unwrap().available_balance, 2_000);
    assert!(!env.manager.has_enough_tokens(&w1, 4_000).unwrap());

    let err = env.manager.spend_app_fee(&w1).unwrap_err();
    assert_eq!(err.kind(), "insufficient_balance");
    assert_eq!(env.manager.status(&w1).unwrap().available_balance, 2_000);
}

#[tokio::test]
async fn test_spend_is_logged_in_background() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.manager.claim(&w1).await.unwrap();

    env.manager.spend(&w1, 1_000).unwrap();
    for _ in 0..50 {
        if env.faucet.spend_logs.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(env.faucet.spend_logs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_spend_log_failure_is_ignored() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.faucet.fail_spend_logs.store(true, Ordering::SeqCst);
    env.manager.claim(&w1).await.unwrap();

    assert!(env.manager.try_spend(&w1, 4_000));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(env.manager.status(&w1).unwrap().available_balance, 6_000);
}

#[test]
fn test_spend_without_runtime_still_deducts() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.manager.ledger().record_claim(&w1, 5_000).unwrap();

    assert!(env.manager.try_spend(&w1, 4_000));
    assert_eq!(env.manager.status(&w1).unwrap().available_balance, 1_000);
    assert_eq!(env.faucet.spend_logs.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Reconciliation policies
// ============================================================================

#[tokio::test]
async fn test_trust_remote_policy() {
    let env = TestEnvironment::new(ReconciliationPolicy::TrustRemote).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);

    // Nothing fetched yet: unknown remote counts as zero
    assert!(!env.manager.try_spend(&w1, 1));

    // Claim refreshes the remote figure
    let outcome = env.manager.claim(&w1).await.unwrap();
    assert_eq!(outcome.balance.remote_balance, Some(10_000));
    assert_eq!(outcome.balance.available_balance, 10_000);

    env.manager.spend(&w1, 4_000).unwrap();
    let status = env.manager.status(&w1).unwrap();
    assert_eq!(status.available_balance, 6_000);
    assert_eq!(status.remote_balance, Some(10_000));

    // Tokens granted elsewhere show up after a refresh
    env.faucet.granted.fetch_add(5_000, Ordering::SeqCst);
    let refreshed = env.manager.refresh_remote_balance(&w1).await.unwrap();
    assert_eq!(refreshed.available_balance, 11_000);

    let err = env.manager.spend(&w1, 12_000).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientBalance {
            available: 11_000,
            ..
        }
    ));
}

#[tokio::test]
async fn test_local_policy_ignores_remote_for_spending() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);

    env.faucet.granted.store(50_000, Ordering::SeqCst);
    let status = env.manager.refresh_remote_balance(&w1).await.unwrap();
    assert_eq!(status.remote_balance, Some(50_000));
    assert_eq!(status.available_balance, 0);
    assert!(!env.manager.try_spend(&w1, 1));
}

// ============================================================================
// SOL airdrop
// ============================================================================

#[tokio::test]
async fn test_sol_airdrop_reports_sol_balance() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);

    let outcome = env.manager.claim_sol(&w1).await.unwrap();
    assert_eq!(outcome.amount_sol, 1.0);
    assert_eq!(outcome.receipt.signature.as_deref(), Some("stub-signature"));
    assert_eq!(outcome.balance.sol_balance, Some(1.0));
    // SOL is not an x402 credit
    assert_eq!(outcome.balance.available_balance, 0);
    assert_eq!(env.manager.ledger().totals(&w1).unwrap().total_claimed, 0);
}

#[tokio::test]
async fn test_sol_airdrop_and_token_claim_share_cooldown() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    let w2 = WalletIdentity::from(WALLET_2);

    env.manager.claim_sol(&w1).await.unwrap();
    let err = env.manager.claim(&w1).await.unwrap_err();
    assert!(matches!(err, LedgerError::CooldownActive { .. }));
    assert_eq!(env.faucet.claims.load(Ordering::SeqCst), 0);

    env.manager.claim(&w2).await.unwrap();
    let err = env.manager.claim_sol(&w2).await.unwrap_err();
    assert!(matches!(err, LedgerError::CooldownActive { .. }));
    assert_eq!(env.faucet.airdrops.load(Ordering::SeqCst), 1);

    env.clock.advance(Duration::from_secs(30 * 60));
    env.manager.claim(&w1).await.unwrap();
    env.manager.claim_sol(&w2).await.unwrap();
}

#[tokio::test]
async fn test_failed_airdrop_starts_no_cooldown() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.faucet.fail_airdrops.store(true, Ordering::SeqCst);

    let err = env.manager.claim_sol(&w1).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Remote(RemoteError::Status { status: 500, .. })
    ));
    let status = env.manager.status(&w1).unwrap();
    assert!(status.claimable);
    assert_eq!(status.sol_balance, None);
}

#[tokio::test]
async fn test_refresh_carries_sol_balance() {
    let env = TestEnvironment::new(ReconciliationPolicy::LocalLedger).unwrap();
    let w1 = WalletIdentity::from(WALLET_1);
    env.faucet.lamports.store(2_500_000_000, Ordering::SeqCst);

    let status = env.manager.refresh_remote_balance(&w1).await.unwrap();
    assert_eq!(status.sol_balance, Some(2.5));
    assert_eq!(status.remote_balance, Some(0));
}

