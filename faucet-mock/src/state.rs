use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::rate_limit::RateLimiter;

/// Shared application state
pub type AppState = Arc<FaucetState>;

#[derive(Debug)]
pub struct FaucetState {
    pub limiter: RateLimiter,
    /// Tokens granted per wallet since startup
    credits: Mutex<HashMap<String, u64>>,
    /// Devnet SOL airdropped per wallet since startup
    sol: Mutex<HashMap<String, f64>>,
}

impl FaucetState {
    pub fn new(rate_limit: u32, rate_window: Duration) -> Self {
        Self {
            limiter: RateLimiter::new(rate_limit, rate_window),
            credits: Mutex::new(HashMap::new()),
            sol: Mutex::new(HashMap::new()),
        }
    }

    pub fn credit(&self, wallet: &str, amount: u64) -> u64 {
        let mut credits = self
            .credits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let total = credits.entry(wallet.to_string()).or_insert(0);
        *total = total.saturating_add(amount);
        *total
    }

    pub fn credited(&self, wallet: &str) -> u64 {
        self.credits
            .lock()
            .map(|credits| credits.get(wallet).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn airdrop(&self, wallet: &str, amount: f64) -> f64 {
        let mut sol = self
            .sol
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let total = sol.entry(wallet.to_string()).or_insert(0.0);
        *total += amount;
        *total
    }

    pub fn sol_balance(&self, wallet: &str) -> f64 {
        self.sol
            .lock()
            .map(|sol| sol.get(wallet).copied().unwrap_or(0.0))
            .unwrap_or(0.0)
    }
}

impl Default for FaucetState {
    /// 10 requests per minute, as the production routes allowed
    fn default() -> Self {
        Self::new(10, Duration::from_secs(60))
    }
}
