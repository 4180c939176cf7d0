/// Faucet Mock Server Library
///
/// Stand-in for the remote x402 faucet: claim, deduct-log and balance
/// endpoints with per-wallet rate limiting. Credits are kept in memory, as if
/// every claim were settled on-chain.

pub mod handlers;
pub mod rate_limit;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use server::{create_router, run_server};
pub use state::FaucetState;
