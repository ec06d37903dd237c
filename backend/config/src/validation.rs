//! Config validation with user-friendly error messages.

use crate::schema::BillscopeConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &BillscopeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_provider(config, &mut report);
    validate_rate_limit(config, &mut report);
    validate_cache(config, &mut report);
    report
}

fn validate_server(config: &BillscopeConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.port == 0 {
        report.error("server.port", "Port must be between 1 and 65535");
    } else if server.port < 1024 && server.port != 80 && server.port != 443 {
        report.warn(
            "server.port",
            format!(
                "Port {} requires elevated privileges; consider using a port >= 1024",
                server.port
            ),
        );
    }
    if server.bind_address.trim().is_empty() {
        report.error("server.bindAddress", "Bind address cannot be empty");
    }
    if server.max_upload_bytes == 0 {
        report.error("server.maxUploadBytes", "maxUploadBytes must be > 0");
    }
    if server.cors_origins.iter().any(|o| o == "*") {
        report.warn(
            "server.corsOrigins",
            "Wildcard origin cannot be combined with credentials; it will be ignored",
        );
    }
}

fn validate_provider(config: &BillscopeConfig, report: &mut ValidationReport) {
    let provider = &config.provider;
    if provider.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        report.warn(
            "provider.apiKey",
            "No API key configured; every analysis call will fail",
        );
    }
    if !(provider.base_url.starts_with("http://") || provider.base_url.starts_with("https://")) {
        report.error("provider.baseUrl", "Base URL must start with http:// or https://");
    }
    if provider.model.trim().is_empty() {
        report.error("provider.model", "Model cannot be empty");
    }
    if provider.max_tokens == 0 {
        report.error("provider.maxTokens", "maxTokens must be > 0");
    }
}

fn validate_rate_limit(config: &BillscopeConfig, report: &mut ValidationReport) {
    let rl = &config.rate_limit;
    if !rl.enabled {
        report.warn("rateLimit.enabled", "Rate limiting is disabled");
        return;
    }
    if rl.max_requests == 0 {
        report.error("rateLimit.maxRequests", "maxRequests must be > 0");
    }
    if rl.window_secs == 0 {
        report.error("rateLimit.windowSecs", "windowSecs must be > 0");
    }
}

fn validate_cache(config: &BillscopeConfig, report: &mut ValidationReport) {
    let cache = &config.cache;
    if !cache.enabled {
        return;
    }
    if cache.ttl_secs == 0 {
        report.warn("cache.ttlSecs", "ttlSecs of 0 means entries expire immediately");
    }
    if cache.max_entries == 0 {
        report.error("cache.maxEntries", "maxEntries must be > 0 when the cache is enabled");
    }
}
