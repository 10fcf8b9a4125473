//! Reduction of collected outcomes into the final report.

use crate::outcome::RequestOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Success/failure counts plus every outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Outcomes with no error and a 2xx status
    pub success_count: usize,
    /// Every other outcome, transport failures included
    pub failure_count: usize,
    /// All outcomes in arrival order
    pub responses: Vec<RequestOutcome>,
}

impl RunSummary {
    /// Total number of request cycles.
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// Get the success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total > 0 {
            self.success_count as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Count of outcomes per status code. Status 0 means no response.
    pub fn status_breakdown(&self) -> BTreeMap<u16, usize> {
        let mut breakdown = BTreeMap::new();
        for outcome in &self.responses {
            *breakdown.entry(outcome.status).or_insert(0) += 1;
        }
        breakdown
    }

    /// (successes, failures) per worker, keyed by 1-based thread index.
    pub fn per_thread(&self) -> BTreeMap<usize, (usize, usize)> {
        let mut threads = BTreeMap::new();
        for outcome in &self.responses {
            let entry = threads.entry(outcome.thread).or_insert((0, 0));
            if outcome.is_success() {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        threads
    }

    /// Outcomes that did not count as a success.
    pub fn failures(&self) -> impl Iterator<Item = &RequestOutcome> {
        self.responses.iter().filter(|o| !o.is_success())
    }
}

/// Reduce the complete outcome list of a run.
///
/// Only called once every worker has finished.
pub fn aggregate(responses: Vec<RequestOutcome>) -> RunSummary {
    let success_count = responses.iter().filter(|o| o.is_success()).count();
    let failure_count = responses.len() - success_count;

    RunSummary {
        success_count,
        failure_count,
        responses,
    }
}

/// Final output of a run: the summary plus wall-clock timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub summary: RunSummary,
    /// Dispatch start
    pub started_at: DateTime<Utc>,
    /// Join barrier passed
    pub completed_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Request cycles per second over the whole run
    pub requests_per_second: f64,
}

impl RunReport {
    pub fn new(
        summary: RunSummary,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;
        let requests_per_second = if duration_ms > 0 {
            summary.total() as f64 / (duration_ms as f64 / 1000.0)
        } else {
            0.0
        };

        Self {
            summary,
            started_at,
            completed_at,
            duration_ms,
            requests_per_second,
        }
    }

    /// Get duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_outcomes() -> Vec<RequestOutcome> {
        vec![
            RequestOutcome::response(1, 1, 200, b"ok"),
            RequestOutcome::response(1, 2, 201, b"created"),
            RequestOutcome::response(2, 1, 404, b"missing"),
            RequestOutcome::response(2, 2, 302, b""),
            RequestOutcome::failure(3, 1, "connection refused"),
            RequestOutcome::response(3, 2, 500, b"oops"),
        ]
    }

    #[test]
    fn test_counts_add_up() {
        let summary = aggregate(sample_outcomes());
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 4);
        assert_eq!(summary.total(), summary.responses.len());
    }

    #[test]
    fn test_404_is_a_failure_without_error() {
        let summary = aggregate(vec![RequestOutcome::response(1, 1, 404, b"")]);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failure_count, 1);
        assert!(summary.responses[0].error.is_empty());
    }

    #[test]
    fn test_empty_run() {
        let summary = aggregate(Vec::new());
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn test_status_breakdown() {
        let breakdown = aggregate(sample_outcomes()).status_breakdown();
        assert_eq!(breakdown.get(&0), Some(&1));
        assert_eq!(breakdown.get(&200), Some(&1));
        assert_eq!(breakdown.get(&404), Some(&1));
        assert_eq!(breakdown.values().sum::<usize>(), 6);
    }

    #[test]
    fn test_per_thread() {
        let per_thread = aggregate(sample_outcomes()).per_thread();
        assert_eq!(per_thread[&1], (2, 0));
        assert_eq!(per_thread[&2], (0, 2));
        assert_eq!(per_thread[&3], (0, 2));
    }

    #[test]
    fn test_report_timing() {
        let started = Utc::now();
        let completed = started + Duration::milliseconds(2000);
        let report = RunReport::new(aggregate(sample_outcomes()), started, completed);

        assert_eq!(report.duration_ms, 2000);
        assert!((report.requests_per_second - 3.0).abs() < f64::EPSILON);
        assert!((report.duration_secs() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_json_shape() {
        let now = Utc::now();
        let report = RunReport::new(aggregate(sample_outcomes()), now, now);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success_count"], 2);
        assert_eq!(json["failure_count"], 4);
        assert_eq!(json["responses"].as_array().unwrap().len(), 6);
        assert_eq!(json["requests_per_second"], 0.0);
    }
}
