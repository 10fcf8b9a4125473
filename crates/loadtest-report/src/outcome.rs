//! The record of one request cycle.

use serde::{Deserialize, Serialize};

/// Maximum number of response body bytes kept in an outcome.
pub const BODY_PREVIEW_LIMIT: usize = 100;

/// Result of one (thread, iteration) request cycle.
///
/// Created once by the worker that ran the cycle and never modified after it
/// is handed to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// 1-based worker index
    pub thread: usize,
    /// 1-based iteration index within the worker
    pub iteration: usize,
    /// HTTP status, 0 when no response was received
    pub status: u16,
    /// First bytes of the response body
    pub body_preview: String,
    /// Error description, empty when the request completed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl RequestOutcome {
    /// Outcome for a request that received a response.
    pub fn response(thread: usize, iteration: usize, status: u16, body: &[u8]) -> Self {
        Self {
            thread,
            iteration,
            status,
            body_preview: body_preview(body),
            error: String::new(),
        }
    }

    /// Outcome for a request that could not be built, sent or answered.
    pub fn failure(thread: usize, iteration: usize, error: impl Into<String>) -> Self {
        Self {
            thread,
            iteration,
            status: 0,
            body_preview: String::new(),
            error: error.into(),
        }
    }

    /// No error and a 2xx status.
    pub fn is_success(&self) -> bool {
        self.error.is_empty() && (200..300).contains(&self.status)
    }
}

/// Cut a response body down to at most [`BODY_PREVIEW_LIMIT`] bytes.
///
/// The cut is by bytes, so it may split a UTF-8 sequence. Invalid bytes are
/// replaced and the text is trimmed back to a char boundary to stay within
/// the limit.
pub fn body_preview(body: &[u8]) -> String {
    let head = &body[..body.len().min(BODY_PREVIEW_LIMIT)];
    let mut preview = String::from_utf8_lossy(head).into_owned();
    if preview.len() > BODY_PREVIEW_LIMIT {
        let mut end = BODY_PREVIEW_LIMIT;
        while !preview.is_char_boundary(end) {
            end -= 1;
        }
        preview.truncate(end);
    }
    preview
}
