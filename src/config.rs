//! Building a [`RawRequestConfig`] from a config file and command-line flags.
//!
//! Precedence, lowest first: config file, `--*-json` flags, individual
//! `--header`/`--param`/`--random-param` flags and scalar flags. Maps are
//! merged key by key; scalars are replaced.

use crate::RunArgs;
use anyhow::{anyhow, bail, Context, Result};
use loadtest_runner::RawRequestConfig;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Produce the effective configuration for `args`.
pub fn resolve(args: &RunArgs) -> Result<RawRequestConfig> {
    let mut config = match &args.config {
        Some(path) => load_file(path)?,
        None => RawRequestConfig::default(),
    };

    config.overlay(json_overrides(args)?);
    config.overlay(flag_overrides(args)?);

    debug!("Resolved request configuration: {:?}", config);
    Ok(config)
}

/// Load a configuration file, picking the format from its extension.
pub fn load_file(path: &Path) -> Result<RawRequestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let config = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(anyhow::Error::from),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
        Some("toml") => toml::from_str(&content).map_err(anyhow::Error::from),
        _ => bail!(
            "Unsupported config file extension for {} (expected .json, .yaml, .yml or .toml)",
            path.display()
        ),
    };

    config.with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn json_overrides(args: &RunArgs) -> Result<RawRequestConfig> {
    let mut config = RawRequestConfig::default();

    if let Some(raw) = &args.headers_json {
        config.headers = parse_json_flag("--headers-json", raw)?;
    }
    if let Some(raw) = &args.params_json {
        config.params = parse_json_flag("--params-json", raw)?;
    }
    if let Some(raw) = &args.random_param_json {
        config.random_param = parse_json_flag("--random-param-json", raw)?;
    }

    Ok(config)
}

fn flag_overrides(args: &RunArgs) -> Result<RawRequestConfig> {
    let mut config = RawRequestConfig {
        url: args.url.clone(),
        method: args.method.clone(),
        threads: args.threads,
        iterations: args.iterations,
        ..Default::default()
    };

    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        config.headers.insert(name, value);
    }
    for raw in &args.params {
        let (key, value) = parse_param(raw)?;
        config.params.insert(key, value);
    }
    for raw in &args.random_params {
        let (key, rule) = split_assignment("--random-param", raw)?;
        config.random_param.insert(key, rule.to_string());
    }

    Ok(config)
}

fn parse_json_flag<T: DeserializeOwned>(flag: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("Invalid JSON object for {flag}"))
}

/// Parse a `Name: value` header flag.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid header '{raw}' (expected 'Name: value')"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid header '{raw}' (empty name)");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse a `key=value` parameter flag.
///
/// Values that are valid JSON keep their JSON type (`3`, `true`, `[1,2]`);
/// anything else is sent as a string.
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = split_assignment("--param", raw)?;
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key, value))
}

fn split_assignment<'a>(flag: &str, raw: &'a str) -> Result<(String, &'a str)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid {flag} '{raw}' (expected 'key=value')"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid {flag} '{raw}' (empty key)");
    }
    Ok((key.to_string(), value))
}
