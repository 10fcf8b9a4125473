//! Error types for the request runner.

use thiserror::Error;

/// Invalid run configuration. Fatal: the run never starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No target URL was supplied.
    #[error("url is required")]
    MissingUrl,

    /// The URL could not be parsed.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The URL does not point at an HTTP(S) endpoint.
    #[error("unsupported url scheme '{scheme}' in '{url}', expected http or https")]
    UnsupportedScheme { url: String, scheme: String },

    /// The URL has no host to connect to.
    #[error("url '{url}' has no host")]
    MissingHost { url: String },
}

/// Failure of a single request cycle.
///
/// Recorded in that cycle's outcome; never aborts the run or other workers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The request could not be built (method, header or body).
    #[error("request construction failed: {0}")]
    Construction(String),

    /// The request was sent but no response arrived (timeout, DNS, refused, TLS).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Render an error with its whole `source()` chain.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
