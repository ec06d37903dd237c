//! Structured logging for Billscope.
//!
//! Console output, optional rolling NDJSON files, secret redaction, and
//! analysis lifecycle events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{AnalysisEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
