//! Analysis Event Logger
//!
//! One structured event per step of an upload's life, emitted under the
//! `analysis_events` target so it can be filtered or routed separately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    Received {
        filename: String,
        bytes: usize,
    },
    Completed {
        filename: String,
        page_count: usize,
        elapsed_ms: u64,
        cached: bool,
    },
    Failed {
        filename: String,
        error_kind: String,
        message: String,
    },
    RateLimited {
        identity: String,
        retry_after_secs: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: AnalysisEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Builds the log entry, scrubbing secrets from free-text fields.
    pub fn entry(request_id: &str, mut event: AnalysisEvent) -> EventLogEntry {
        if let AnalysisEvent::Failed { message, .. } = &mut event {
            *message = redact_sensitive_data(message);
        }
        EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(request_id: &str, event: AnalysisEvent) {
        let entry = Self::entry(request_id, event);
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "analysis_events", event = %json, "Analysis event"),
            Err(_) => info!(target: "analysis_events", event = ?entry, "Analysis event"),
        }
    }
}
