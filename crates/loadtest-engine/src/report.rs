//! Report rendering for finished runs.

use crate::aggregator::OperationStats;
use crate::driver::RunReport;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::time::Duration;
use tracing::info;

/// Output format for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

/// Render `report` in the requested format.
pub fn render(report: &RunReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Table => Ok(format_table(report)),
        ReportFormat::Json => format_json(report),
        ReportFormat::Markdown => Ok(format_markdown(report)),
    }
}

pub fn format_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Format the report as terminal tables.
pub fn format_table(report: &RunReport) -> String {
    let stats = &report.stats;
    let mut output = String::new();

    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL);
    summary.set_header(vec!["Metric", "Value"]);
    summary.add_row(vec![
        Cell::new("Total duration"),
        Cell::new(format_duration(stats.elapsed.as_secs_f64())),
    ]);
    summary.add_row(vec![
        Cell::new("Total queries"),
        Cell::new(format_number(stats.total_queries)),
    ]);
    let errors_cell = Cell::new(format_number(stats.total_errors));
    summary.add_row(vec![
        Cell::new("Total errors"),
        if stats.total_errors > 0 {
            errors_cell.fg(Color::Red)
        } else {
            errors_cell.fg(Color::Green)
        },
    ]);
    summary.add_row(vec![
        Cell::new("Queries per second"),
        Cell::new(format!("{:.2}", stats.queries_per_second)),
    ]);
    summary.add_row(vec![
        Cell::new("Workers"),
        Cell::new(format!(
            "{} x {} queries",
            report.workers, report.queries_per_worker
        )),
    ]);
    summary.add_row(vec![
        Cell::new("Databases"),
        Cell::new(report.targets.join(", ")),
    ]);
    output.push_str(&summary.to_string());
    output.push('\n');

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Operation", "Count", "Errors", "Mean", "Median", "Min", "Max", "p95", "p99",
    ]);
    for op in stats.operations.iter().filter(|o| o.count > 0) {
        let errors = if op.errors > 0 {
            Cell::new(format_number(op.errors)).fg(Color::Red)
        } else {
            Cell::new("0")
        };
        table.add_row(vec![
            Cell::new(op.kind.to_string().to_uppercase()),
            Cell::new(format_number(op.count)),
            errors,
            Cell::new(format_latency(op.mean)),
            Cell::new(format_latency(op.median)),
            Cell::new(format_latency(op.min)),
            Cell::new(format_latency(op.max)),
            Cell::new(format_latency(op.p95)),
            Cell::new(format_latency(op.p99)),
        ]);
    }
    output.push_str(&table.to_string());
    output.push('\n');

    if !stats.errors_by_category.is_empty() {
        output.push_str("\nErrors by category:\n");
        for (category, count) in &stats.errors_by_category {
            output.push_str(&format!("  {category}: {}\n", format_number(*count)));
        }
    }

    if report.cancelled {
        output.push_str("\nRun was cancelled; skipped iterations are counted as 'cancelled' errors.\n");
    }

    output
}

/// Format the report as markdown.
pub fn format_markdown(report: &RunReport) -> String {
    let stats = &report.stats;
    let mut output = String::new();

    output.push_str("# Benchmark Results\n\n");
    output.push_str(&format!(
        "**Completed at:** {}\n\n",
        report.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str("## Summary\n\n");
    output.push_str(&format!(
        "- **Total Duration:** {}\n",
        format_duration(stats.elapsed.as_secs_f64())
    ));
    output.push_str(&format!(
        "- **Total Queries:** {}\n",
        format_number(stats.total_queries)
    ));
    output.push_str(&format!(
        "- **Total Errors:** {}\n",
        format_number(stats.total_errors)
    ));
    output.push_str(&format!(
        "- **Queries per Second:** {:.2}\n",
        stats.queries_per_second
    ));
    output.push_str(&format!(
        "- **Workers:** {} x {} queries (seed {})\n",
        report.workers, report.queries_per_worker, report.seed
    ));
    output.push_str(&format!(
        "- **Databases:** {}\n",
        report.targets.join(", ")
    ));
    if report.cancelled {
        output.push_str("- **Cancelled:** yes\n");
    }

    output.push_str("\n## Operations\n\n");
    output.push_str("| Operation | Count | Errors | Mean | Median | Min | Max | p95 | p99 |\n");
    output.push_str("|-----------|-------|--------|------|--------|-----|-----|-----|-----|\n");
    for op in stats.operations.iter().filter(|o| o.count > 0) {
        output.push_str(&markdown_row(op));
    }

    if !stats.errors_by_category.is_empty() {
        output.push_str("\n## Errors by Category\n\n");
        for (category, count) in &stats.errors_by_category {
            output.push_str(&format!("- **{category}:** {}\n", format_number(*count)));
        }
    }

    output
}

fn markdown_row(op: &OperationStats) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
        op.kind.to_string().to_uppercase(),
        format_number(op.count),
        format_number(op.errors),
        format_latency(op.mean),
        format_latency(op.median),
        format_latency(op.min),
        format_latency(op.max),
        format_latency(op.p95),
        format_latency(op.p99),
    )
}

/// Emit the report through `tracing`, one line per figure.
pub fn log_summary(report: &RunReport) {
    let stats = &report.stats;
    info!("Total duration: {:.2} seconds", stats.elapsed.as_secs_f64());
    info!("Total queries: {}", stats.total_queries);
    info!("Total errors: {}", stats.total_errors);
    info!("Queries per second: {:.2}", stats.queries_per_second);

    for op in stats.operations.iter().filter(|o| o.count > 0) {
        info!(
            "{} queries: count={} errors={} mean={:.6}s median={:.6}s min={:.6}s max={:.6}s",
            op.kind.to_string().to_uppercase(),
            op.count,
            op.errors,
            op.mean.as_secs_f64(),
            op.median.as_secs_f64(),
            op.min.as_secs_f64(),
            op.max.as_secs_f64()
        );
    }
}

/// Format a latency in milliseconds with microsecond resolution.
fn format_latency(duration: Duration) -> String {
    format!("{:.3}ms", duration.as_secs_f64() * 1000.0)
}

/// Format duration in human-readable format.
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        return format!("{secs:.2}s");
    }
    // Round before splitting so the lower unit never reaches 60.
    let total_secs = secs.round() as u64;
    if total_secs < 3600 {
        format!("{}m {:02}s", total_secs / 60, total_secs % 60)
    } else {
        let total_mins = (secs / 60.0).round() as u64;
        format!("{}h {:02}m", total_mins / 60, total_mins % 60)
    }
}

/// Format number with thousands separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}
