//! Outcome model, collection and aggregation for request-runner.
//!
//! ```text
//!   worker 1 ──┐
//!   worker 2 ──┼──▶ ResultCollector ──(join)──▶ aggregate() ──▶ RunSummary ──▶ RunReport
//!   worker N ──┘     (mutex, N×M)
//! ```

pub mod collector;
pub mod format;
pub mod outcome;
pub mod summary;

pub use collector::{ResultCollector, MAX_PREALLOCATED_OUTCOMES};
pub use format::{format_json, format_markdown, format_table};
pub use outcome::{body_preview, RequestOutcome, BODY_PREVIEW_LIMIT};
pub use summary::{aggregate, RunReport, RunSummary};
