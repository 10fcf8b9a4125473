//! Validated, immutable description of a run.

use crate::config::RawRequestConfig;
use crate::error::ConfigError;
use loadtest_randomizer::{parse_rules, RandomizationRule};
use reqwest::Url;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Total timeout applied to every request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thread counts above this are honored but logged as a resource risk.
pub const FAN_OUT_WARNING_THRESHOLD: usize = 1000;

/// HTTP verb of a run, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// Any other token. Validity is checked when the request is built.
    Other(String),
}

impl HttpMethod {
    /// Parse a method name, case-insensitively. Empty input means `GET`.
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        match upper.as_str() {
            "" | "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            _ => HttpMethod::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(token) => token,
        }
    }

    /// Only POST and PUT carry the parameters as a JSON body.
    pub fn sends_json_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a run needs, validated once and shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    url: Url,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    params: Map<String, Value>,
    rules: BTreeMap<String, RandomizationRule>,
    threads: usize,
    iterations: usize,
    request_timeout: Duration,
}

impl RequestSpec {
    /// Validate a raw configuration.
    ///
    /// Only the URL can make this fail. Missing, zero or negative counts
    /// become 1; there is no upper bound.
    pub fn from_config(config: RawRequestConfig) -> Result<Self, ConfigError> {
        let url = parse_target(config.url.as_deref())?;
        let method = HttpMethod::parse(config.method.as_deref().unwrap_or_default());
        let threads = coerce_count(config.threads);
        let iterations = coerce_count(config.iterations);

        if threads > FAN_OUT_WARNING_THRESHOLD {
            warn!(
                "Requested {} threads (above {}); every thread is spawned as asked",
                threads, FAN_OUT_WARNING_THRESHOLD
            );
        }

        Ok(Self {
            url,
            method,
            headers: config.headers.into_iter().collect(),
            params: config.params,
            rules: parse_rules(&config.random_param),
            threads,
            iterations,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Replace the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    /// Static headers in the order they are applied, names as supplied.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn rules(&self) -> &BTreeMap<String, RandomizationRule> {
        &self.rules
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Number of outcomes a run of this spec produces.
    pub fn total_requests(&self) -> usize {
        self.threads.saturating_mul(self.iterations)
    }
}

fn parse_target(raw: Option<&str>) -> Result<Url, ConfigError> {
    let text = raw
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::MissingUrl)?;

    let url = Url::parse(text).map_err(|e| ConfigError::InvalidUrl {
        url: text.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            url: text.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingHost {
            url: text.to_string(),
        });
    }

    Ok(url)
}

fn coerce_count(raw: Option<i64>) -> usize {
    raw.filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(1)
}
