//! Rendering a [`RunReport`] for humans and machines.

use crate::summary::RunReport;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

/// Number of failed outcomes listed in the table and markdown output.
const MAX_LISTED_FAILURES: usize = 10;

/// Format the report as pretty-printed JSON.
pub fn format_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Format the report as terminal tables.
pub fn format_table(report: &RunReport) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Thread", "Requests", "Success", "Failure"]);

    for (thread, (success, failure)) in summary.per_thread() {
        let failure_cell = if failure > 0 {
            Cell::new(format_number(failure)).fg(Color::Red)
        } else {
            Cell::new("0")
        };
        table.add_row(vec![
            Cell::new(thread),
            Cell::new(format_number(success + failure)),
            Cell::new(format_number(success)).fg(Color::Green),
            failure_cell,
        ]);
    }

    table.add_row(vec![
        Cell::new("TOTAL").fg(Color::Cyan),
        Cell::new(format_number(summary.total())),
        Cell::new(format_number(summary.success_count)),
        Cell::new(format_number(summary.failure_count)),
    ]);

    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\nDuration: {}  Throughput: {:.1} req/s  Success rate: {:.2}%\n",
        format_duration(report.duration_ms),
        report.requests_per_second,
        summary.success_rate() * 100.0
    ));

    let mut statuses = Table::new();
    statuses.load_preset(UTF8_FULL);
    statuses.set_header(vec!["Status", "Count"]);
    for (status, count) in summary.status_breakdown() {
        statuses.add_row(vec![
            Cell::new(status_label(status)),
            Cell::new(format_number(count)),
        ]);
    }
    output.push('\n');
    output.push_str(&statuses.to_string());
    output.push('\n');

    if summary.failure_count > 0 {
        output.push_str("\nFailed Requests:\n");
        for outcome in summary.failures().take(MAX_LISTED_FAILURES) {
            let detail = if outcome.error.is_empty() {
                format!("status {}", outcome.status)
            } else {
                outcome.error.clone()
            };
            output.push_str(&format!(
                "  thread {} iteration {}: {}\n",
                outcome.thread, outcome.iteration, detail
            ));
        }
        if summary.failure_count > MAX_LISTED_FAILURES {
            output.push_str(&format!(
                "  ... and {} more\n",
                summary.failure_count - MAX_LISTED_FAILURES
            ));
        }
    }

    output
}

/// Format the report as markdown.
pub fn format_markdown(report: &RunReport) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    output.push_str("# Request Run Results\n\n");
    output.push_str(&format!(
        "**Completed at:** {}\n\n",
        report.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str("## Summary\n\n");
    output.push_str(&format!(
        "- **Total Requests:** {}\n",
        format_number(summary.total())
    ));
    output.push_str(&format!(
        "- **Succeeded:** {}\n",
        format_number(summary.success_count)
    ));
    output.push_str(&format!(
        "- **Failed:** {}\n",
        format_number(summary.failure_count)
    ));
    output.push_str(&format!(
        "- **Success Rate:** {:.2}%\n",
        summary.success_rate() * 100.0
    ));
    output.push_str(&format!(
        "- **Duration:** {}\n",
        format_duration(report.duration_ms)
    ));
    output.push_str(&format!(
        "- **Throughput:** {:.1} req/sec\n\n",
        report.requests_per_second
    ));

    output.push_str("## Threads\n\n");
    output.push_str("| Thread | Requests | Success | Failure |\n");
    output.push_str("|--------|----------|---------|---------|\n");
    for (thread, (success, failure)) in summary.per_thread() {
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            thread,
            success + failure,
            success,
            failure
        ));
    }

    output.push_str("\n## Status Codes\n\n");
    output.push_str("| Status | Count |\n");
    output.push_str("|--------|-------|\n");
    for (status, count) in summary.status_breakdown() {
        output.push_str(&format!("| {} | {} |\n", status_label(status), count));
    }

    if summary.failure_count > 0 {
        output.push_str("\n## Failures\n\n");
        for outcome in summary.failures().take(MAX_LISTED_FAILURES) {
            let detail = if outcome.error.is_empty() {
                format!("status {}", outcome.status)
            } else {
                outcome.error.replace('|', "\\|")
            };
            output.push_str(&format!(
                "- thread {} iteration {}: {}\n",
                outcome.thread, outcome.iteration, detail
            ));
        }
    }

    output
}

fn status_label(status: u16) -> String {
    if status == 0 {
        "no response".to_string()
    } else {
        status.to_string()
    }
}

/// Render a run duration. Short runs keep millisecond precision.
fn format_duration(ms: u64) -> String {
    match ms {
        0..=999 => format!("{ms}ms"),
        1_000..=59_999 => format!("{:.2}s", ms as f64 / 1000.0),
        60_000..=3_599_999 => format!("{}m {:02}s", ms / 60_000, (ms % 60_000) / 1000),
        _ => format!("{}h {:02}m", ms / 3_600_000, (ms % 3_600_000) / 60_000),
    }
}

/// Group digits in threes: `1234567` becomes `1,234,567`.
fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut groups: Vec<&str> = Vec::new();
    let mut end = digits.len();
    while end > 3 {
        groups.push(&digits[end - 3..end]);
        end -= 3;
    }
    groups.push(&digits[..end]);
    groups.reverse();
    groups.join(",")
}
