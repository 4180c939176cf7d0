use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use crate::manager::TokenManager;

pub fn create_router(manager: Arc<TokenManager>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/tokens/:wallet", get(handlers::get_status_handler))
        .route("/api/tokens/:wallet/claim", post(handlers::claim_handler))
        .route("/api/tokens/:wallet/claim-sol", post(handlers::claim_sol_handler))
        .route("/api/tokens/:wallet/spend", post(handlers::spend_handler))
        .route("/api/tokens/:wallet/refresh", post(handlers::refresh_handler))
        .with_state(manager)
}

pub async fn start_server(addr: &str, manager: Arc<TokenManager>) -> anyhow::Result<()> {
    // Set ALLOWED_ORIGINS="https://os.example.com,https://preview.example.com" for production
    // If not set, allows any origin (development mode)
    let cors = match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins);
            let origin_list = origins
                .split(',')
                .map(|s| s.trim().parse())
                .collect::<Result<Vec<HeaderValue>, _>>()?;
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let app = create_router(manager).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Token ledger API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    // Every ledger write is already durable, nothing to flush
    log::info!("Shutdown signal received, exiting gracefully...");
}
