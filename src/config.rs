/// Token ledger configuration from environment variables
///
/// Read once at startup and treated as immutable for the process lifetime.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::reconcile::ReconciliationPolicy;

pub const DEFAULT_FAUCET_AMOUNT: u64 = 10_000;
pub const DEFAULT_APP_FEE: u64 = 4_000;
pub const DEFAULT_COOLDOWN_MINUTES: u64 = 30;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SOL_AIRDROP_AMOUNT: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct TokenConfig {
    /// Tokens credited per successful faucet claim
    pub faucet_amount: u64,
    /// Tokens deducted per gated app use
    pub app_fee: u64,
    /// Devnet SOL requested per airdrop, shares the claim cooldown
    pub sol_airdrop_amount: f64,
    /// Minimum time between two claims of the same wallet
    pub cooldown: Duration,
    /// How the spendable balance relates to the remote balance
    pub reconciliation: ReconciliationPolicy,
    /// Base URL of the remote faucet service
    pub faucet_url: String,
    /// Upper bound for every remote call
    pub remote_timeout: Duration,
    /// Directory of the file-backed store
    pub data_dir: PathBuf,
}

impl TokenConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `X402_FAUCET_AMOUNT`: tokens per claim (default 10000)
    /// - `X402_APP_FEE`: tokens per app use (default 4000)
    /// - `X402_COOLDOWN_MINUTES`: claim cooldown (default 30)
    /// - `X402_SOL_AIRDROP_AMOUNT`: SOL per airdrop (default 1)
    /// - `X402_RECONCILIATION`: "local" (default) or "remote"
    /// - `X402_FAUCET_URL`: remote faucet base URL (default http://localhost:3001)
    /// - `X402_REMOTE_TIMEOUT_SECS`: remote call timeout (default 10)
    /// - `X402_DATA_DIR`: store directory (default ./x402_data)
    ///
    /// The first three are also accepted with a `NEXT_PUBLIC_` prefix.
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Shorter cooldown against a local faucet mock
    /// X402_COOLDOWN_MINUTES=1 X402_FAUCET_URL=http://localhost:3001 cargo run
    /// ```
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let faucet_amount = read_u64("X402_FAUCET_AMOUNT", DEFAULT_FAUCET_AMOUNT);
        let app_fee = read_u64("X402_APP_FEE", DEFAULT_APP_FEE);
        let cooldown = cooldown_from_minutes(read_u64(
            "X402_COOLDOWN_MINUTES",
            DEFAULT_COOLDOWN_MINUTES,
        ));
        let sol_airdrop_amount =
            read_sol_amount("X402_SOL_AIRDROP_AMOUNT", DEFAULT_SOL_AIRDROP_AMOUNT);

        let reconciliation = match read_var("X402_RECONCILIATION") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("⚠️  {}, defaulting to local ledger", e);
                ReconciliationPolicy::LocalLedger
            }),
            None => ReconciliationPolicy::LocalLedger,
        };
        log::info!("⚖️  Reconciliation policy: {}", reconciliation);

        let faucet_url = env::var("X402_FAUCET_URL")
            .unwrap_or_else(|_| "http://localhost:3001".to_string());
        log::info!("📡 Faucet URL: {}", faucet_url);

        let remote_timeout = Duration::from_secs(read_u64(
            "X402_REMOTE_TIMEOUT_SECS",
            DEFAULT_REMOTE_TIMEOUT_SECS,
        ));

        let data_dir = env::var("X402_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./x402_data"));

        Self {
            faucet_amount,
            app_fee,
            sol_airdrop_amount,
            cooldown,
            reconciliation,
            faucet_url,
            remote_timeout,
            data_dir,
        }
    }

    /// Cooldown window in milliseconds, the unit timestamps are stored in
    pub fn cooldown_millis(&self) -> u64 {
        self.cooldown.as_millis() as u64
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            faucet_amount: DEFAULT_FAUCET_AMOUNT,
            app_fee: DEFAULT_APP_FEE,
            sol_airdrop_amount: DEFAULT_SOL_AIRDROP_AMOUNT,
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_MINUTES * 60),
            reconciliation: ReconciliationPolicy::LocalLedger,
            faucet_url: "http://localhost:3001".to_string(),
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            data_dir: PathBuf::from("./x402_data"),
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .or_else(|_| env::var(format!("NEXT_PUBLIC_{}", name)))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn read_u64(name: &str, default: u64) -> u64 {
    match read_var(name) {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("⚠️  Invalid {}='{}', using default {}", name, raw, default);
                default
            }
        },
        None => default,
    }
}

fn read_sol_amount(name: &str, default: f64) -> f64 {
    match read_var(name) {
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => value,
            _ => {
                log::warn!("⚠️  Invalid {}='{}', using default {}", name, raw, default);
                default
            }
        },
        None => default,
    }
}

/// Minutes to a cooldown window, falling back to the default on overflow
fn cooldown_from_minutes(minutes: u64) -> Duration {
    match minutes.checked_mul(60_000) {
        Some(_) => Duration::from_secs(minutes * 60),
        None => {
            log::warn!(
                "⚠️  X402_COOLDOWN_MINUTES={} is out of range, using default {}",
                minutes,
                DEFAULT_COOLDOWN_MINUTES
            );
            Duration::from_secs(DEFAULT_COOLDOWN_MINUTES * 60)
        }
    }
}
