/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::FaucetState;

pub fn create_router(state: Arc<FaucetState>) -> Router {
    // Configure CORS to allow requests from the desktop UI/tests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Faucet endpoints
        .route("/api/faucet/claim", post(claim_tokens))
        .route("/api/faucet/airdrop-sol", post(airdrop_sol))
        .route("/api/tokens/deduct", post(deduct_tokens))
        .route("/api/balance", get(get_balance))

        // Shared state
        .with_state(state)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(
    state: Arc<FaucetState>,
    host: String,
    port: u16,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚰 Faucet mock server listening on http://{}", addr);
    log::info!("🪙 Claim endpoint: POST /api/faucet/claim");

    axum::serve(listener, app).await?;

    Ok(())
}
