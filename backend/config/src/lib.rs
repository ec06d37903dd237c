//! `billscope-config`: Billscope runtime configuration.
//!
//! Provides:
//! - Typed config schema with defaults for every field
//! - YAML loading from an explicit path, `BILLSCOPE_CONFIG`, or `~/.billscope/config.yaml`
//! - `${ENV_VAR}` substitution and `BILLSCOPE_*` overrides
//! - Redaction for safe logging
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_raw_config, resolve_config_path};
pub use redact::redact;
pub use schema::{
    AnalysisConfig, BillscopeConfig, CacheConfig, LoggingConfig, ProviderConfig, RateLimitConfig,
    ServerConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A validated config together with the warnings found while preparing it.
///
/// Loading happens before the logger is installed, so warnings are handed
/// back for the caller to report.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: BillscopeConfig,
    pub path: PathBuf,
    /// False when no file existed at `path` and only defaults applied.
    pub from_file: bool,
    pub warnings: Vec<ConfigValidationError>,
}

/// Load, substitute env vars, apply overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime. The first
/// validation error fails the load.
pub async fn load_and_prepare(path: Option<&Path>) -> Result<LoadedConfig> {
    let path = resolve_config_path(path);
    let from_file = path.exists();
    let value = load_raw_config(&path).await?;

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: BillscopeConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let (config, mut warnings) = apply_env_overrides(config);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    if let Some(first) = report.errors.into_iter().next() {
        return Err(first).context(format!("Invalid config at {}", path.display()));
    }
    warnings.extend(report.warnings);

    Ok(LoadedConfig {
        config,
        path,
        from_file,
        warnings,
    })
}
