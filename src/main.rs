//! Command-line interface for request-runner
//!
//! # Usage Examples
//!
//! ```bash
//! # 10 concurrent workers, 5 GET requests each
//! request-runner run --url http://localhost:8080/api/items --threads 10 --iterations 5
//!
//! # Randomized POST bodies, report as a table
//! request-runner run --url http://localhost:8080/api/items -X POST \
//!   --params-json '{"name": "widget"}' \
//!   --random-param-json '{"id": "1-1000"}' \
//!   --output-format table
//!
//! # Everything from a config file, overriding the worker count
//! request-runner run --config request.toml --threads 50 --output report.json
//! ```
//!
//! Logs go to stderr and are controlled with `RUST_LOG`, e.g.
//! `RUST_LOG=loadtest_runner=debug`.

use clap::{Parser, Subcommand};
use request_runner::{output, run_requests, RunArgs};
use tracing::info;

#[derive(Parser)]
#[command(name = "request-runner")]
#[command(about = "Fire concurrent, parameter-randomized HTTP requests and summarize the results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a request grid of threads x iterations against one URL
    Run(RunArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let report = run_requests(&args).await?;
            info!(
                "{} of {} requests succeeded ({:.1}%)",
                report.summary.success_count,
                report.summary.total(),
                report.summary.success_rate() * 100.0
            );
            output::write_report(&report, args.output_format, args.output.as_deref())?;
        }
    }

    Ok(())
}
