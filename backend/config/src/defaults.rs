//! Config defaults: constants, serde default functions, and derived defaults
//! applied after loading.

use std::path::PathBuf;

use crate::schema::BillscopeConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3005;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend/build";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub use billscope_core::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Requests allowed per client per window on the analyze endpoint.
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_cors_origins() -> Vec<String> {
    vec![DEFAULT_CORS_ORIGIN.to_string()]
}

pub(crate) fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

pub(crate) fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_rate_limit_requests() -> u32 {
    DEFAULT_RATE_LIMIT_REQUESTS
}

pub(crate) fn default_rate_limit_window() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}

pub(crate) fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

pub(crate) fn default_cache_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}

pub(crate) fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Apply defaults that depend on the environment rather than constants.
pub fn apply_all_defaults(config: BillscopeConfig) -> BillscopeConfig {
    let config = apply_server_defaults(config);
    apply_analysis_defaults(config)
}

/// Serve the frontend from `frontend/build` when nothing else is configured.
fn apply_server_defaults(mut config: BillscopeConfig) -> BillscopeConfig {
    if config.server.frontend_dir.is_none() {
        config.server.frontend_dir = Some(PathBuf::from(DEFAULT_FRONTEND_DIR));
    }
    config
}

/// Buffer uploads in the OS temp directory unless told otherwise.
fn apply_analysis_defaults(mut config: BillscopeConfig) -> BillscopeConfig {
    if config.analysis.temp_dir.is_none() {
        config.analysis.temp_dir = Some(std::env::temp_dir());
    }
    config
}
