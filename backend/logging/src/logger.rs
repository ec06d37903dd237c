//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional daily-rotated NDJSON
//! files, and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global logger.
///
/// `RUST_LOG` takes precedence over `level`. With `log_dir` set, a JSON copy
/// of every event goes to `billscope.log.YYYY-MM-DD` in that directory.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logger(log_dir: Option<&Path>, level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = log_dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, "billscope.log");
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let console_json = json.then(|| fmt::layer().json().with_writer(std::io::stdout));
    let console_plain = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_plain)
        .with(console_json)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_does_not_panic() {
        init_logger(None, "warn", false);
        init_logger(None, "debug", true);
        tracing::warn!("still alive");
    }
}
