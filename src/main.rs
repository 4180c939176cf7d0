use std::env;
use std::sync::Arc;
use x402_ledger::{api::server, TokenConfig, TokenManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output, RUST_LOG=info for normal)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TokenConfig::from_env();
    log::info!(
        "Faucet amount {}, app fee {}, cooldown {}m, data dir {:?}",
        config.faucet_amount,
        config.app_fee,
        config.cooldown.as_secs() / 60,
        config.data_dir
    );
    let manager = Arc::new(TokenManager::new(config)?);

    // Use BIND_ADDRESS=0.0.0.0:3002 to expose beyond localhost
    let addr = env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:3002".to_string());

    log::info!("Starting x402 token ledger on {}", addr);
    server::start_server(&addr, manager).await?;
    Ok(())
}
