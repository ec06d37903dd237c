//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values of the YAML file, resolved
//!   at load time. Only uppercase `[A-Z_][A-Z0-9_]*` names match, and `$${VAR}`
//!   escapes to a literal `${VAR}`.
//! - Well-known `BILLSCOPE_*` / `ANTHROPIC_API_KEY` variables that override
//!   individual fields after the file is parsed.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::schema::BillscopeConfig;
use crate::validation::ConfigValidationError;

/// Matches `${VAR}` and, with the optional leading `$`, the escaped `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree using the process env.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in ENV_VAR_PATTERN.captures_iter(s) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&s[last..whole.start()]);
        let var_name = &caps[1];

        if whole.as_str().starts_with("$$") {
            out.push_str(&format!("${{{var_name}}}"));
        } else {
            match env.get(var_name) {
                Some(val) if !val.is_empty() => out.push_str(val),
                _ => {
                    return Err(MissingEnvVarError {
                        var_name: var_name.to_string(),
                        config_path: path.to_string(),
                    })
                }
            }
        }
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// Apply `BILLSCOPE_*` and `ANTHROPIC_API_KEY` overrides from the process env.
///
/// Variables that cannot be applied are returned as warnings rather than logged,
/// since this runs before the logger exists.
pub fn apply_env_overrides(
    config: BillscopeConfig,
) -> (BillscopeConfig, Vec<ConfigValidationError>) {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(
    mut config: BillscopeConfig,
    env: &HashMap<String, String>,
) -> (BillscopeConfig, Vec<ConfigValidationError>) {
    let mut ignored = Vec::new();
    let get = |name: &str| env.get(name).filter(|v| !v.is_empty()).cloned();

    if let Some(bind) = get("BILLSCOPE_BIND") {
        config.server.bind_address = bind;
    }
    if let Some(port) = get("BILLSCOPE_PORT") {
        match port.parse() {
            Ok(p) => config.server.port = p,
            Err(_) => ignored.push(ConfigValidationError {
                path: "BILLSCOPE_PORT".into(),
                message: format!("Ignoring unparsable port {port:?}"),
            }),
        }
    }
    if let Some(dir) = get("BILLSCOPE_FRONTEND_DIR") {
        config.server.frontend_dir = Some(PathBuf::from(dir));
    }
    if let Some(key) = get("ANTHROPIC_API_KEY") {
        config.provider.api_key = Some(key);
    }
    if let Some(url) = get("ANTHROPIC_BASE_URL") {
        config.provider.base_url = url;
    }
    if let Some(model) = get("BILLSCOPE_MODEL") {
        config.provider.model = model;
    }
    if let Some(dir) = get("BILLSCOPE_OUTPUT_DIR") {
        config.analysis.output_dir = PathBuf::from(dir);
    }
    if let Some(dir) = get("BILLSCOPE_TEMP_DIR") {
        config.analysis.temp_dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = get("RUST_LOG") {
        config.logging.level = level;
    }
    (config, ignored)
}
