//! Rendering and writing the run report.

use crate::OutputFormat;
use anyhow::{Context, Result};
use loadtest_report::{format_json, format_markdown, format_table, RunReport};
use std::fs;
use std::path::Path;
use tracing::info;

/// Render `report` in the requested format.
pub fn render(report: &RunReport, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => format_json(report).context("Failed to serialize report")?,
        OutputFormat::Table => format_table(report),
        OutputFormat::Markdown => format_markdown(report),
    };
    Ok(rendered)
}

/// Write the rendered report to `output`, or to stdout when no path is given.
pub fn write_report(report: &RunReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let rendered = render(report, format)?;

    match output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
