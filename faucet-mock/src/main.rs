/// Faucet Mock Server
///
/// Serves the faucet endpoints the token ledger talks to, for local
/// development and integration tests.

use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use faucet_mock::{run_server, FaucetState};

#[derive(Debug)]
struct Config {
    // Server
    server_host: String,
    server_port: u16,

    // Rate limiting
    rate_limit: u32,
    rate_limit_window: Duration,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let server_host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        let rate_limit = env::var("RATE_LIMIT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid RATE_LIMIT")?;

        let window_secs: u64 = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("Invalid RATE_LIMIT_WINDOW_SECS")?;

        Ok(Self {
            server_host,
            server_port,
            rate_limit,
            rate_limit_window: Duration::from_secs(window_secs),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting Faucet Mock Server...");

    let config = Config::from_env()
        .context("Failed to load configuration")?;

    log::info!(
        "Rate limit: {} requests per {:?}",
        config.rate_limit,
        config.rate_limit_window
    );

    let state = Arc::new(FaucetState::new(config.rate_limit, config.rate_limit_window));

    run_server(state, config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
