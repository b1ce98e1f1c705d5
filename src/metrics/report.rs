use crate::args::OutputFormat;
use crate::error::AppResult;

use super::aggregate::{AggregateReport, RATE_SCALE};

/// Basis points per percent.
const BP_PER_PERCENT: u64 = 100;

/// Prints the final report to stdout.
///
/// # Errors
///
/// Returns an error when JSON serialization fails.
pub fn print_report(report: &AggregateReport, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in report_lines(report) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

#[must_use]
pub fn report_lines(report: &AggregateReport) -> Vec<String> {
    let mut lines = vec![
        format!("Hammers: {}", report.hammers),
        format!("Duration: {}s", report.duration_secs),
        format!("Passes: {}", report.passes),
        format!("Total Requests: {}", report.requests),
        format!("Succeeded: {}", report.succeeded),
        format!(
            "Errors: {} (timeouts {}, transport {}, unparsed {})",
            report.failed, report.timed_out, report.transport_errors, report.parse_errors
        ),
        format!("Bytes Received: {}", report.byte_count),
    ];

    lines.push(report.failure_rate_bp.map_or_else(
        || "Failure Rate (incl. timeouts): n/a (no requests completed)".to_owned(),
        |bp| {
            format!(
                "Failure Rate (incl. timeouts): {}.{:04} ({}.{:02}%)",
                bp / RATE_SCALE,
                bp % RATE_SCALE,
                bp / BP_PER_PERCENT,
                bp % BP_PER_PERCENT
            )
        },
    ));

    lines.push(report.throughput.map_or_else(
        || "Throughput: n/a (run shorter than 1s)".to_owned(),
        |throughput| {
            format!(
                "Throughput: {} req/s, {} KB/s",
                throughput.requests_per_sec, throughput.kb_per_sec
            )
        },
    ));

    match report.latency.as_ref() {
        Some(latency) => {
            lines.push(format!(
                "Latency Min/Max: {}ms / {}ms",
                latency.min_ms, latency.max_ms
            ));
            lines.push(format!(
                "Latency Mean/Median: {}ms / {}ms",
                latency.mean_ms, latency.median_ms
            ));
            lines.push(format!("Mean Server Time: {}ms", latency.mean_reported_ms));
            lines.push(format!("Mean Network Latency: {}ms", latency.mean_network_ms));
        }
        None => lines.push("Latency: n/a (no timing samples)".to_owned()),
    }

    for tag in &report.tags {
        let label = if tag.tag.is_empty() { "-" } else { &tag.tag };
        lines.push(format!(
            "Tag {}: {} samples, {}ms measured, {}ms reported",
            label, tag.count, tag.mean_measured_ms, tag.mean_reported_ms
        ));
    }

    lines
}
