//! request-runner library
//!
//! Fires a grid of concurrent HTTP requests (`threads × iterations`) at one
//! target, optionally randomizing request parameters per call, and reports
//! per-request outcomes with success and failure counts.
//!
//! # CLI Usage
//!
//! ```bash
//! # 4 workers, 25 sequential requests each
//! request-runner run --url http://localhost:8080/health --threads 4 --iterations 25
//!
//! # POST with a randomized id in every body
//! request-runner run --url http://localhost:8080/items --method POST \
//!   --header "Authorization: Bearer token" \
//!   --param name=widget --random-param id=1-1000
//!
//! # Load the request from a file and print a table
//! request-runner run --config request.yaml --output-format table
//! ```

use clap::{Args, ValueEnum};
use loadtest_report::RunReport;
use loadtest_runner::{RequestSpec, Runner};
use std::path::PathBuf;
use std::time::Duration;

pub mod config;
pub mod output;

/// Output format for the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Markdown,
}

/// Arguments for the `run` command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Target URL (http or https)
    #[arg(long, env = "RUNNER_URL")]
    pub url: Option<String>,

    /// HTTP method (default: GET)
    #[arg(long, short = 'X', env = "RUNNER_METHOD")]
    pub method: Option<String>,

    /// Request header, repeatable (format: "Name: value")
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Request parameter, repeatable; the value is parsed as JSON when valid
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Randomization rule, repeatable (format: "id=1-1000")
    #[arg(long = "random-param", value_name = "KEY=RULE")]
    pub random_params: Vec<String>,

    /// Number of concurrent workers; values below 1 mean 1
    #[arg(long, env = "RUNNER_THREADS", allow_hyphen_values = true)]
    pub threads: Option<i64>,

    /// Requests per worker; values below 1 mean 1
    #[arg(long, env = "RUNNER_ITERATIONS", allow_hyphen_values = true)]
    pub iterations: Option<i64>,

    /// Headers as a JSON object of strings
    #[arg(long, value_name = "JSON")]
    pub headers_json: Option<String>,

    /// Parameters as a JSON object
    #[arg(long, value_name = "JSON")]
    pub params_json: Option<String>,

    /// Randomization rules as a JSON object of strings
    #[arg(long, value_name = "JSON")]
    pub random_param_json: Option<String>,

    /// Per-request timeout in seconds (default: 10)
    #[arg(
        long,
        value_name = "SECONDS",
        env = "RUNNER_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Request configuration file (.json, .yaml, .yml or .toml)
    #[arg(long, short = 'c', env = "RUNNER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file (optional, defaults to stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Resolve the configuration described by `args` and execute the run.
///
/// Configuration problems are returned before any request is sent.
pub async fn run_requests(args: &RunArgs) -> anyhow::Result<RunReport> {
    let raw = config::resolve(args)?;
    let mut spec = RequestSpec::from_config(raw)?;
    if let Some(secs) = args.timeout {
        spec = spec.with_request_timeout(Duration::from_secs(secs));
    }

    let runner = Runner::new()?;
    Ok(runner.run(spec).await)
}
