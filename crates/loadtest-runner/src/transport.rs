//! Sending prepared requests over HTTP.

use crate::error::{error_chain, CycleError};
use crate::request::PreparedRequest;
use async_trait::async_trait;
use loadtest_report::BODY_PREVIEW_LIMIT;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::debug;

/// Response data kept from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Leading bytes of the body; at least the preview length when available
    pub body: Vec<u8>,
}

/// Something that can execute a [`PreparedRequest`].
///
/// One instance is shared by every worker of a run, so implementations must
/// tolerate concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send exactly one attempt. No retries.
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, CycleError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("request-runner/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Use an existing client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, CycleError> {
        let method = Method::from_bytes(request.method.as_str().as_bytes()).map_err(|e| {
            CycleError::Construction(format!("invalid HTTP method '{}': {e}", request.method))
        })?;
        let headers = build_headers(&request.headers)?;

        let mut builder = self
            .client
            .request(method, request.url)
            .headers(headers)
            .timeout(request.timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let mut response = builder.send().await.map_err(classify_error)?;
        let status = response.status().as_u16();

        // Only the preview is kept, so stop reading once it is covered.
        let mut body = Vec::new();
        while body.len() < BODY_PREVIEW_LIMIT {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    debug!("Failed to read response body: {}", error_chain(&e));
                    break;
                }
            }
        }

        Ok(TransportResponse { status, body })
    }
}

fn build_headers(pairs: &[(String, String)]) -> Result<HeaderMap, CycleError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CycleError::Construction(format!("invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            CycleError::Construction(format!("invalid value for header '{name}': {e}"))
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn classify_error(err: reqwest::Error) -> CycleError {
    let message = error_chain(&err);
    if err.is_builder() {
        CycleError::Construction(message)
    } else if err.is_timeout() {
        CycleError::Transport(format!("request timed out: {message}"))
    } else {
        CycleError::Transport(message)
    }
}
