//! Output formatting utilities for CLI commands

use colored::Colorize;
use vantage_gpu::RangePerformance;
use vantage_shared::types::performance::{
    CrudePerformance, GpuPerformance, MetricDescriptor, NO_COVERAGE,
};

/// Print success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Render one metric value; missing values and uncovered counters show as `-`
fn format_value(perf: &GpuPerformance, metric: &MetricDescriptor) -> String {
    match perf.get(metric.id) {
        Some(v) if v == NO_COVERAGE => "-".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

fn header(metric: &MetricDescriptor) -> String {
    if metric.unit.is_empty() {
        metric.name.clone()
    } else {
        format!("{} ({})", metric.name, metric.unit)
    }
}

/// Print one row per group with a column per metric
pub fn print_performance_table(crude: &CrudePerformance) {
    let metrics = &crude.metadata.metrics;
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(crude.len() + 1);

    let mut head = vec!["Group".to_string(), "Command".to_string()];
    head.extend(metrics.iter().map(header));
    rows.push(head);

    for (group_id, command, perf) in crude.rows() {
        let mut row = vec![group_id.to_string(), command.to_string()];
        row.extend(metrics.iter().map(|m| format_value(perf, m)));
        rows.push(row);
    }

    let widths: Vec<usize> = (0..rows[0].len())
        .map(|col| rows.iter().map(|r| r[col].chars().count()).max().unwrap_or(0))
        .collect();

    for (i, row) in rows.iter().enumerate() {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:>w$}", cell, w = w))
            .collect::<Vec<_>>()
            .join("  ");
        if i == 0 {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }

    if crude.is_empty() {
        info("No linked commands in trace");
    }
}

/// Print the aggregated metrics of a command range
pub fn print_range_performance(result: &RangePerformance) {
    let width = result
        .metadata
        .metrics
        .iter()
        .map(|m| header(m).chars().count())
        .max()
        .unwrap_or(0);

    for metric in &result.metadata.metrics {
        if result.perf.get(metric.id).is_none() {
            continue;
        }
        println!(
            "  {:<w$}  {} {}",
            header(metric),
            format_value(&result.perf, metric).bold(),
            format!("[{}]", metric.kind).dimmed(),
            w = width
        );
    }
}
