//! Worker pool that executes a run.

use crate::config::RawRequestConfig;
use crate::error::ConfigError;
use crate::request::prepare_request;
use crate::spec::{RequestSpec, FAN_OUT_WARNING_THRESHOLD};
use crate::transport::{ReqwestTransport, Transport};
use chrono::Utc;
use loadtest_randomizer::{randomize_params, RandomSource, ThreadRngSource};
use loadtest_report::{aggregate, RequestOutcome, ResultCollector, RunReport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs request grids against a target.
///
/// The transport and random source are shared by every worker of a run.
#[derive(Clone)]
pub struct Runner {
    transport: Arc<dyn Transport>,
    random: Arc<dyn RandomSource>,
}

impl Runner {
    /// Runner with the HTTP transport and the thread-local random source.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_parts(
            Arc::new(ReqwestTransport::new()?),
            Arc::new(ThreadRngSource),
        ))
    }

    pub fn with_parts(transport: Arc<dyn Transport>, random: Arc<dyn RandomSource>) -> Self {
        Self { transport, random }
    }

    /// Replace the transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Validate `config` and run it.
    ///
    /// A [`ConfigError`] is returned before any request is sent.
    pub async fn run_config(&self, config: RawRequestConfig) -> Result<RunReport, ConfigError> {
        let spec = RequestSpec::from_config(config)?;
        Ok(self.run(spec).await)
    }

    /// Execute `threads × iterations` request cycles and report on them.
    ///
    /// Returns only after every worker has finished, and the report always
    /// holds exactly `threads × iterations` outcomes.
    pub async fn run(&self, spec: RequestSpec) -> RunReport {
        let spec = Arc::new(spec);
        let collector = Arc::new(ResultCollector::with_capacity(spec.total_requests()));
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            "Starting request run: {} {} with {} threads x {} iterations",
            spec.method(),
            spec.url(),
            spec.threads(),
            spec.iterations()
        );

        let mut handles = Vec::with_capacity(spec.threads().min(FAN_OUT_WARNING_THRESHOLD));
        for thread in 1..=spec.threads() {
            let worker = Worker {
                thread,
                spec: Arc::clone(&spec),
                transport: Arc::clone(&self.transport),
                random: Arc::clone(&self.random),
                collector: Arc::clone(&collector),
            };
            handles.push(tokio::spawn(worker.run()));
        }

        // Join barrier: nothing is aggregated until every worker is done.
        for (idx, handle) in handles.into_iter().enumerate() {
            let thread = idx + 1;
            if let Err(e) = handle.await {
                warn!("Worker {} failed: {}", thread, e);
                let recorded = collector.count_for_thread(thread);
                for iteration in recorded + 1..=spec.iterations() {
                    collector.push(RequestOutcome::failure(
                        thread,
                        iteration,
                        format!("worker task failed: {e}"),
                    ));
                }
            }
        }

        let summary = aggregate(collector.take_outcomes());
        let report = RunReport::new(summary, started_at, Utc::now());

        info!(
            "Request run completed in {:.2}s: {} succeeded, {} failed",
            start.elapsed().as_secs_f64(),
            report.summary.success_count,
            report.summary.failure_count
        );

        report
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner").finish_non_exhaustive()
    }
}

/// One thread slot of a run.
struct Worker {
    thread: usize,
    spec: Arc<RequestSpec>,
    transport: Arc<dyn Transport>,
    random: Arc<dyn RandomSource>,
    collector: Arc<ResultCollector>,
}

impl Worker {
    async fn run(self) {
        for iteration in 1..=self.spec.iterations() {
            let outcome = self.run_cycle(iteration).await;
            if !outcome.error.is_empty() {
                debug!(
                    "Thread {} iteration {} failed: {}",
                    self.thread, iteration, outcome.error
                );
            }
            self.collector.push(outcome);
        }
        debug!("Worker {} completed", self.thread);
    }

    async fn run_cycle(&self, iteration: usize) -> RequestOutcome {
        let params = randomize_params(self.spec.params(), self.spec.rules(), self.random.as_ref());

        let request = match prepare_request(&self.spec, &params) {
            Ok(request) => request,
            Err(e) => return RequestOutcome::failure(self.thread, iteration, e.to_string()),
        };

        match self.transport.send(request).await {
            Ok(response) => {
                RequestOutcome::response(self.thread, iteration, response.status, &response.body)
            }
            Err(e) => RequestOutcome::failure(self.thread, iteration, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CycleError;
    use crate::request::PreparedRequest;
    use crate::spec::HttpMethod;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use loadtest_randomizer::SeededSource;
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every request and answers with a fixed status.
    struct RecordingTransport {
        status: u16,
        body: Vec<u8>,
        requests: Mutex<Vec<PreparedRequest>>,
    }

    impl RecordingTransport {
        fn new(status: u16, body: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: body.to_vec(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<PreparedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, CycleError> {
            self.requests.lock().unwrap().push(request);
            tokio::task::yield_now().await;
            Ok(TransportResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    /// Fails every other call at the transport level.
    struct FlakyTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn send(&self, _request: PreparedRequest) -> Result<TransportResponse, CycleError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(CycleError::Transport("connection refused".into()))
            } else {
                Ok(TransportResponse {
                    status: 200,
                    body: b"ok".to_vec(),
                })
            }
        }
    }

    /// Panics on the second call.
    struct PanickingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for PanickingTransport {
        async fn send(&self, _request: PreparedRequest) -> Result<TransportResponse, CycleError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
                panic!("transport blew up");
            }
            Ok(TransportResponse {
                status: 200,
                body: Vec::new(),
            })
        }
    }

    fn spec(value: Value) -> RequestSpec {
        let config: RawRequestConfig = serde_json::from_value(value).unwrap();
        RequestSpec::from_config(config).unwrap()
    }

    fn runner(transport: Arc<dyn Transport>) -> Runner {
        Runner::with_parts(transport, Arc::new(SeededSource::new(42)))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_outcome_count_is_threads_times_iterations() {
        let transport = RecordingTransport::new(200, b"ok");
        let report = runner(transport.clone())
            .run(spec(json!({"url": "http://example.test/ok", "threads": 3, "iterations": 2})))
            .await;

        let summary = &report.summary;
        assert_eq!(summary.responses.len(), 6);
        assert_eq!(summary.success_count, 6);
        assert_eq!(summary.failure_count, 0);
        assert_eq!(transport.requests().len(), 6);

        let pairs: HashSet<(usize, usize)> = summary
            .responses
            .iter()
            .map(|o| (o.thread, o.iteration))
            .collect();
        for thread in 1..=3 {
            for iteration in 1..=2 {
                assert!(pairs.contains(&(thread, iteration)));
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_iterations_are_ordered_within_a_thread() {
        let transport = RecordingTransport::new(200, b"");
        let report = runner(transport)
            .run(spec(json!({"url": "http://example.test", "threads": 5, "iterations": 20})))
            .await;

        for thread in 1..=5 {
            let iterations: Vec<usize> = report
                .summary
                .responses
                .iter()
                .filter(|o| o.thread == thread)
                .map(|o| o.iteration)
                .collect();
            assert_eq!(iterations, (1..=20).collect::<Vec<_>>());
        }
    }

    /// Counts calls without keeping the requests.
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn send(&self, _request: PreparedRequest) -> Result<TransportResponse, CycleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            Ok(TransportResponse {
                status: 200,
                body: Vec::new(),
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_huge_iteration_count_starts_sending() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let spec = spec(json!({
            "url": "http://example.test",
            "threads": 2,
            "iterations": i64::MAX,
        }));
        assert!(spec.total_requests() > i64::MAX as usize);

        let binding = runner(transport.clone());
        let run = binding.run(spec);
        let finished = tokio::time::timeout(std::time::Duration::from_millis(200), run).await;

        assert!(finished.is_err(), "a run this large cannot finish in 200ms");
        assert!(transport.calls.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_zero_counts_run_once() {
        let transport = RecordingTransport::new(200, b"");
        let report = runner(transport)
            .run_config(
                serde_json::from_value(json!({
                    "url": "http://example.test",
                    "threads": 0,
                    "iterations": -4,
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(report.summary.responses.len(), 1);
        assert_eq!(report.summary.responses[0].thread, 1);
        assert_eq!(report.summary.responses[0].iteration, 1);
    }

    #[tokio::test]
    async fn test_config_error_sends_nothing() {
        let transport = RecordingTransport::new(200, b"");
        let err = runner(transport.clone())
            .run_config(RawRequestConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err, ConfigError::MissingUrl);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_2xx_counts_as_failure() {
        let transport = RecordingTransport::new(404, b"not found");
        let report = runner(transport)
            .run(spec(json!({"url": "http://example.test", "iterations": 3})))
            .await;

        assert_eq!(report.summary.success_count, 0);
        assert_eq!(report.summary.failure_count, 3);
        for outcome in &report.summary.responses {
            assert_eq!(outcome.status, 404);
            assert!(outcome.error.is_empty());
            assert_eq!(outcome.body_preview, "not found");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_transport_errors_are_contained() {
        let transport = Arc::new(FlakyTransport {
            calls: AtomicUsize::new(0),
        });
        let report = runner(transport)
            .run(spec(json!({"url": "http://example.test", "threads": 2, "iterations": 5})))
            .await;

        let summary = &report.summary;
        assert_eq!(summary.responses.len(), 10);
        assert_eq!(summary.success_count, 5);
        assert_eq!(summary.failure_count, 5);
        for outcome in summary.failures() {
            assert_eq!(outcome.status, 0);
            assert_eq!(outcome.body_preview, "");
            assert_eq!(outcome.error, "transport error: connection refused");
        }
    }

    #[tokio::test]
    async fn test_body_preview_is_bounded() {
        let transport = RecordingTransport::new(200, &[b'z'; 4096]);
        let report = runner(transport)
            .run(spec(json!({"url": "http://example.test", "threads": 2, "iterations": 2})))
            .await;

        for outcome in &report.summary.responses {
            assert_eq!(outcome.body_preview.len(), 100);
        }
    }

    #[tokio::test]
    async fn test_post_bodies_carry_randomized_params() {
        let transport = RecordingTransport::new(201, b"");
        let report = runner(transport.clone())
            .run(spec(json!({
                "url": "http://example.test/items",
                "method": "post",
                "params": {"name": "widget", "id": "static"},
                "random_param": {"id": "1-1000", "kind": "foo"},
                "threads": 4,
                "iterations": 25,
            })))
            .await;

        assert_eq!(report.summary.success_count, 100);
        let requests = transport.requests();
        assert_eq!(requests.len(), 100);
        for request in requests {
            assert_eq!(request.method, HttpMethod::Post);
            assert_eq!(request.header("content-type"), Some("application/json"));
            let body: Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
            let id = body["id"].as_i64().expect("id is randomized to an integer");
            assert!((1..=1000).contains(&id));
            assert_eq!(body["kind"], "foo");
            assert_eq!(body["name"], "widget");
        }
    }

    #[tokio::test]
    async fn test_invalid_method_is_recorded_per_cycle() {
        let transport = Arc::new(ReqwestTransport::new().unwrap());
        let report = runner(transport)
            .run(spec(json!({
                "url": "http://127.0.0.1:9/",
                "method": "BAD METHOD",
                "threads": 2,
                "iterations": 2,
            })))
            .await;

        assert_eq!(report.summary.responses.len(), 4);
        assert_eq!(report.summary.failure_count, 4);
        for outcome in &report.summary.responses {
            assert_eq!(outcome.status, 0);
            assert!(
                outcome.error.starts_with("request construction failed"),
                "unexpected error: {}",
                outcome.error
            );
        }
    }

    #[tokio::test]
    async fn test_panicking_worker_still_yields_full_grid() {
        let transport = Arc::new(PanickingTransport {
            calls: AtomicUsize::new(0),
        });
        let report = runner(transport)
            .run(spec(json!({"url": "http://example.test", "iterations": 4})))
            .await;

        let summary = &report.summary;
        assert_eq!(summary.responses.len(), 4);
        assert_eq!(summary.success_count, 1);
        let iterations: Vec<usize> = summary.responses.iter().map(|o| o.iteration).collect();
        assert_eq!(iterations, vec![1, 2, 3, 4]);
        assert!(summary.responses[1].error.starts_with("worker task failed"));
    }
}
