//! Raw, user-supplied run configuration.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Run configuration as supplied by the user. Every field is optional.
///
/// Turned into a validated [`RequestSpec`](crate::RequestSpec) by
/// [`RequestSpec::from_config`](crate::RequestSpec::from_config).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRequestConfig {
    /// Request target (required)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// HTTP verb, `GET` when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Static headers sent with every request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Static request parameters
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,

    /// Concurrent worker count
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub threads: Option<i64>,

    /// Requests per worker
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub iterations: Option<i64>,

    /// Per-parameter randomization rules, e.g. `{"id": "1-1000"}`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub random_param: BTreeMap<String, String>,
}

impl RawRequestConfig {
    /// Apply `overrides` on top of this configuration.
    ///
    /// Scalars are replaced when set; maps are merged key by key with the
    /// override winning.
    pub fn overlay(&mut self, overrides: RawRequestConfig) {
        if overrides.url.is_some() {
            self.url = overrides.url;
        }
        if overrides.method.is_some() {
            self.method = overrides.method;
        }
        if overrides.threads.is_some() {
            self.threads = overrides.threads;
        }
        if overrides.iterations.is_some() {
            self.iterations = overrides.iterations;
        }
        self.headers.extend(overrides.headers);
        self.params.extend(overrides.params);
        self.random_param.extend(overrides.random_param);
    }
}

/// Counts arrive as integers or, from loosely typed JSON producers, as floats.
#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Int(i64),
    Float(f64),
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = Option::<Count>::deserialize(deserializer)?;
    Ok(count.map(|c| match c {
        Count::Int(n) => n,
        // `as` saturates; NaN becomes 0 and is coerced to 1 later.
        Count::Float(f) => f.trunc() as i64,
    }))
}
