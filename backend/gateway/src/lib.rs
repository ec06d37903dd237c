//! Billscope HTTP gateway.
//!
//! Serves the bill analysis endpoint, the health check, and the built
//! frontend, with per-client rate limiting and an optional response cache.

pub mod analyze;
pub mod cache;
pub mod control_ui;
pub mod error;
pub mod health_api;
pub mod identity;
pub mod rate_limit;
pub mod server;

pub use cache::ResponseCache;
pub use error::ApiError;
pub use rate_limit::{RateDecision, RateLimiter};
pub use server::{build_router, start_server, GatewayState};
