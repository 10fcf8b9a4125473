//! Building the concrete request for one cycle.

use crate::error::CycleError;
use crate::spec::{HttpMethod, RequestSpec};
use reqwest::Url;
use serde_json::{Map, Value};
use std::time::Duration;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A request ready to hand to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Header pairs in application order
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl PreparedRequest {
    /// Case-insensitive header lookup; the last matching header wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Assemble one request from a [`RequestSpec`] and this cycle's parameters.
///
/// POST and PUT send `params` as a JSON body and get a JSON content type
/// unless a static header already sets one. Every other method sends no
/// body and drops `params`; they are not moved to the query string.
pub fn prepare_request(
    spec: &RequestSpec,
    params: &Map<String, Value>,
) -> Result<PreparedRequest, CycleError> {
    let mut headers = spec.headers().to_vec();

    let body = if spec.method().sends_json_body() {
        let body = serde_json::to_vec(params)
            .map_err(|e| CycleError::Construction(format!("failed to encode JSON body: {e}")))?;
        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        Some(body)
    } else {
        None
    };

    Ok(PreparedRequest {
        method: spec.method().clone(),
        url: spec.url().clone(),
        headers,
        body,
        timeout: spec.request_timeout(),
    })
}
