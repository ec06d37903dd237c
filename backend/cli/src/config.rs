//! Runtime wiring from a loaded [`BillscopeConfig`].

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use billscope_analysis::providers::AnthropicProvider;
use billscope_analysis::{AnalysisPipeline, PipelineSettings};
use billscope_config::{redact, BillscopeConfig, LoadedConfig};
use billscope_understanding::PdfExtractor;
use tracing::{debug, info, warn};

/// Pipeline knobs taken from the `provider` and `analysis` sections.
pub fn pipeline_settings(config: &BillscopeConfig) -> PipelineSettings {
    let defaults = PipelineSettings::default();
    PipelineSettings {
        model: config.provider.model.clone(),
        max_tokens: config.provider.max_tokens,
        output_dir: config.analysis.output_dir.clone(),
        temp_dir: config.analysis.temp_dir.clone().unwrap_or(defaults.temp_dir),
    }
}

/// Builds the production pipeline: lopdf extraction and the Anthropic API.
pub fn build_pipeline(config: &BillscopeConfig) -> Result<AnalysisPipeline> {
    let Some(api_key) = config.provider.api_key.as_deref().filter(|k| !k.is_empty()) else {
        bail!("No Anthropic API key configured; set ANTHROPIC_API_KEY or provider.apiKey");
    };

    let settings = pipeline_settings(config);
    std::fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!("Failed to create output dir {}", settings.output_dir.display())
    })?;

    let provider = AnthropicProvider::new(api_key).with_base_url(&config.provider.base_url);
    info!(
        model = %settings.model,
        output_dir = %settings.output_dir.display(),
        "Analysis pipeline ready"
    );
    Ok(AnalysisPipeline::new(
        Arc::new(PdfExtractor),
        Arc::new(provider),
        settings,
    ))
}

pub fn listen_addr(config: &BillscopeConfig) -> Result<SocketAddr> {
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    addr.parse()
        .with_context(|| format!("Invalid listen address {addr}"))
}

/// Reports what config loading found, once the logger is installed.
pub fn log_loaded_config(loaded: &LoadedConfig) {
    if loaded.from_file {
        info!(path = %loaded.path.display(), "Loaded config");
    } else {
        info!(path = %loaded.path.display(), "Config file does not exist; using defaults");
    }
    for warning in &loaded.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if let Ok(snapshot) = serde_json::to_value(&loaded.config) {
        debug!(
            path = %loaded.path.display(),
            config = %redact(&snapshot),
            "Effective config"
        );
    }
}
