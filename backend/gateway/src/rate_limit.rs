//! Per-client fixed-window rate limiting for the analyze endpoint.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use billscope_core::BillError;
use billscope_logging::{AnalysisEvent, EventLogger};

use crate::error::ApiError;
use crate::identity::ClientIdentity;

/// Windows are pruned once this many clients are tracked.
const PRUNE_THRESHOLD: usize = 1024;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    // client -> (request_count, window_start)
    limits: Arc<RwLock<HashMap<String, (u32, Instant)>>>,
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Count a request from `client` and decide whether it may proceed.
    ///
    /// Rejected requests are not counted.
    pub async fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now()).await
    }

    async fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let mut limits = self.limits.write().await;
        if limits.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            limits.retain(|_, (_, start)| now.duration_since(*start) < window);
        }

        let state = limits.entry(client.to_string()).or_insert((0, now));

        if now.duration_since(state.1) >= self.window {
            state.0 = 0;
            state.1 = now;
            debug!(client, "Rate limit window reset");
        }

        if state.0 >= self.max_requests {
            let reset_in = self.window.saturating_sub(now.duration_since(state.1));
            let retry_after_secs = reset_in.as_secs() + u64::from(reset_in.subsec_nanos() > 0);
            warn!(client, retry_after_secs, "Rate limit exceeded");
            return RateDecision::Limited {
                retry_after_secs: retry_after_secs.max(1),
            };
        }

        state.0 += 1;
        debug!(client, count = state.0, max = self.max_requests, "Rate limit OK");
        RateDecision::Allowed
    }
}

/// Middleware rejecting over-limit clients with 429 before the handler runs.
pub async fn enforce(
    State(limiter): State<RateLimiter>,
    client: ClientIdentity,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check(client.as_str()).await {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Limited { retry_after_secs } => {
            EventLogger::log_event(
                "-",
                AnalysisEvent::RateLimited {
                    identity: client.0.clone(),
                    retry_after_secs,
                },
            );
            ApiError::from(BillError::RateLimited {
                identity: client.0,
                retry_after_secs,
            })
            .into_response()
        }
    }
}
