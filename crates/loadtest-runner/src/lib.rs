//! Concurrent HTTP request runner.
//!
//! A run validates a [`RawRequestConfig`] into a [`RequestSpec`], then spawns
//! one worker per thread slot. Each worker performs `iterations` sequential
//! request cycles: randomize params, prepare the request, send it, record the
//! outcome. After every worker has finished the outcomes are aggregated into a
//! [`RunReport`](loadtest_report::RunReport).
//!
//! ```no_run
//! use loadtest_runner::{RawRequestConfig, Runner};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = RawRequestConfig {
//!     url: Some("http://localhost:8080/health".to_string()),
//!     threads: Some(4),
//!     iterations: Some(10),
//!     ..Default::default()
//! };
//! let report = Runner::new()?.run_config(config).await?;
//! println!("{} of {} succeeded", report.summary.success_count, report.summary.total());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod request;
pub mod spec;
pub mod transport;

pub use config::RawRequestConfig;
pub use dispatcher::Runner;
pub use error::{ConfigError, CycleError};
pub use request::{prepare_request, PreparedRequest, JSON_CONTENT_TYPE};
pub use spec::{HttpMethod, RequestSpec, DEFAULT_REQUEST_TIMEOUT, FAN_OUT_WARNING_THRESHOLD};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
