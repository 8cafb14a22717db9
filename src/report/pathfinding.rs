//! Pathfinding report rendering: summary table, markdown, console, charts

use super::{escape_cell, fixed, markdown_table, min_by_key, title_case, Field, TableRow};
use crate::aggregate::GroupSummary;
use crate::config::PathfindingConfig;
use crate::pipeline::pathfinding::{PathfindingAnalysis, MIB};
use crate::svg_chart::{cov_color, Bar, BarChart};
use std::fmt::Write as _;

/// `summary_by_graph.csv` row
pub struct SummaryRow<'a>(pub &'a GroupSummary);

const SUMMARY_HEADERS: [&str; 16] = [
    "graph_type",
    "num_queries",
    "avg_runtime_ms",
    "median_runtime_ms",
    "std_runtime_ms",
    "min_runtime_ms",
    "max_runtime_ms",
    "p95_runtime_ms",
    "p99_runtime_ms",
    "coefficient_of_variation",
    "avg_nodes_visited",
    "avg_edges_relaxed",
    "avg_path_length",
    "success_rate",
    "avg_memory_MB",
    "avg_runtime_per_MB",
];

impl TableRow for SummaryRow<'_> {
    fn headers(&self) -> Vec<String> {
        SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect()
    }

    fn fields(&self) -> Vec<Field> {
        let s = self.0;
        vec![
            Field::Text(s.group.clone()),
            Field::Count(s.count),
            Field::float(s.timing.mean),
            Field::float(s.timing.median),
            Field::float(s.timing.std),
            Field::float(s.timing.min),
            Field::float(s.timing.max),
            Field::float(s.timing.p95),
            Field::float(s.timing.p99),
            Field::float(s.timing.cov),
            Field::float(s.covariate_mean("nodes_visited")),
            Field::float(s.covariate_mean("edges_relaxed")),
            Field::float(s.covariate_mean("path_length")),
            s.success_rate.map_or(Field::Missing, Field::float),
            Field::float(s.covariate_mean("memory_used_bytes") / MIB),
            Field::float(s.efficiency_ratio),
        ]
    }
}

pub fn summary_rows(summaries: &[GroupSummary]) -> Vec<SummaryRow<'_>> {
    summaries.iter().map(SummaryRow).collect()
}

/// Short display name used in comparison headings (`CSRGraph` -> `CSR`)
fn short_name(group: &str) -> &str {
    match group.strip_suffix("Graph") {
        Some(short) if !short.is_empty() => short,
        _ => group,
    }
}

fn ranking_table(out: &mut String, rows: &[(usize, &GroupSummary)]) {
    out.push_str("| Rank | Graph Type | Avg Runtime (ms) | Std Dev (ms) | CoV (%) |\n");
    out.push_str("|------|------------|-------------------|--------------|----------|\n");
    for (rank, s) in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            rank,
            escape_cell(&s.group),
            fixed(s.timing.mean, 4),
            fixed(s.timing.std, 4),
            fixed(s.timing.cov, 2)
        );
    }
}

/// Render `analysis_report.md`
pub fn markdown(analysis: &PathfindingAnalysis, config: &PathfindingConfig) -> String {
    let summaries = &analysis.summaries;
    let mut out = String::from("# Benchmark Analysis Report\n\n## Executive Summary\n\n");

    if let (Some(fastest), Some(slowest)) = (analysis.fastest(), analysis.slowest()) {
        let _ = writeln!(
            out,
            "**Fastest Graph**: {} ({} ms avg)",
            fastest.group,
            fixed(fastest.timing.mean, 4)
        );
        let _ = writeln!(
            out,
            "**Slowest Graph**: {} ({} ms avg)",
            slowest.group,
            fixed(slowest.timing.mean, 4)
        );
    }
    if let Some(stable) = min_by_key(summaries, |s| s.timing.cov) {
        let _ = writeln!(
            out,
            "**Most Stable**: {} (CoV: {}%)",
            stable.group,
            fixed(stable.timing.cov, 2)
        );
    }
    if let Some(efficient) = min_by_key(summaries, |s| s.efficiency_ratio) {
        let _ = writeln!(
            out,
            "**Most Memory Efficient**: {} ({} ms/MB)",
            efficient.group,
            fixed(efficient.efficiency_ratio, 4)
        );
    }

    let top_n = config.top_n.min(summaries.len());
    out.push_str("\n## Performance Rankings\n\n");
    let _ = writeln!(out, "### Top {} Fastest Graphs", top_n);
    let top: Vec<(usize, &GroupSummary)> =
        summaries.iter().take(top_n).enumerate().map(|(i, s)| (i + 1, s)).collect();
    ranking_table(&mut out, &top);

    let _ = writeln!(out, "\n### Bottom {} Slowest Graphs", top_n);
    let first_rank = summaries.len() - top_n + 1;
    let bottom: Vec<(usize, &GroupSummary)> = summaries[summaries.len() - top_n..]
        .iter()
        .enumerate()
        .map(|(i, s)| (first_rank + i, s))
        .collect();
    ranking_table(&mut out, &bottom);

    out.push_str("\n## Correlation Analysis\n\n");
    out.push_str("| Metric Pair | Correlation Coefficient |\n");
    out.push_str("|-------------|------------------------|\n");
    for corr in &analysis.correlations {
        let _ = writeln!(out, "| {} | {} |", title_case(&corr.name), fixed(corr.coefficient, 4));
    }

    if !analysis.anomalies.is_empty() {
        out.push_str("\n## Anomalies Detected\n\n");
        for finding in &analysis.anomalies {
            let _ = writeln!(out, "- {}", finding);
        }
    }

    out.push_str("\n## Complete Statistics Table\n\n");
    out.push_str(&markdown_table(&summary_rows(summaries)));

    out.push_str("\n## Hypothesis Validation\n\n");
    for cmp in &analysis.comparisons {
        if !cmp.is_defined() {
            let _ = writeln!(
                out,
                "**{} vs {}**: speedup undefined (zero mean runtime)",
                short_name(&cmp.group),
                short_name(&cmp.baseline)
            );
            continue;
        }
        let _ = writeln!(
            out,
            "**{} vs {}**: {} is {:.2}x {}",
            short_name(&cmp.group),
            short_name(&cmp.baseline),
            cmp.group,
            cmp.speedup,
            cmp.verdict()
        );
    }
    for probe in &analysis.rank_probes {
        let _ = writeln!(
            out,
            "**{} Performance**: Ranked {}/{} (1 = fastest)",
            probe.group, probe.rank, probe.total
        );
    }

    out
}

/// Console summary printed after a text-mode run
pub fn console(analysis: &PathfindingAnalysis, config: &PathfindingConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=".repeat(60));
    out.push_str("SUMMARY\n");
    let _ = writeln!(out, "{}", "=".repeat(60));

    let top_n = config.top_n.min(analysis.summaries.len());
    let _ = writeln!(out, "\nTop {} Fastest Graphs:", top_n);
    for (i, s) in analysis.summaries.iter().take(top_n).enumerate() {
        let _ = writeln!(
            out,
            "  {}. {}: {} ms (CoV: {}%)",
            i + 1,
            s.group,
            fixed(s.timing.mean, 4),
            fixed(s.timing.cov, 2)
        );
    }

    out.push_str("\nCorrelations:\n");
    for corr in &analysis.correlations {
        let _ = writeln!(out, "  {}: {}", corr.name, fixed(corr.coefficient, 4));
    }

    if !analysis.anomalies.is_empty() {
        out.push_str("\nAnomalies:\n");
        for finding in &analysis.anomalies {
            let _ = writeln!(out, "  - {}", finding);
        }
    }

    out
}

/// Runtime, stability and memory-efficiency charts
pub fn charts(
    analysis: &PathfindingAnalysis,
    config: &PathfindingConfig,
) -> Vec<(&'static str, BarChart)> {
    let summaries = &analysis.summaries;

    let mut runtime = BarChart::new(
        "Average Runtime by Graph Type (Fastest to Slowest)",
        "Average Runtime (ms)",
    );
    for s in summaries {
        runtime.push(Bar::new(&s.group, s.timing.mean));
    }

    let mut by_cov: Vec<&GroupSummary> = summaries.iter().collect();
    by_cov.sort_by(|a, b| crate::aggregate::cmp_nan_last(a.timing.cov, b.timing.cov));
    let mut stability = BarChart::new(
        "Runtime Stability (Lower = More Consistent)",
        "Coefficient of Variation (%)",
    )
    .with_threshold(config.cov_threshold, "High Variance Threshold");
    for s in by_cov {
        let color = cov_color(s.timing.cov, config.cov_threshold);
        stability.push(Bar::new(&s.group, s.timing.cov).with_color(color));
    }

    let mut by_ratio: Vec<&GroupSummary> = summaries.iter().collect();
    by_ratio.sort_by(|a, b| crate::aggregate::cmp_nan_last(a.efficiency_ratio, b.efficiency_ratio));
    let mut memory = BarChart::new(
        "Memory Efficiency (Lower = Better, Log Scale)",
        "Average Runtime per MB (ms/MB)",
    )
    .with_log_scale();
    for s in by_ratio {
        memory.push(Bar::new(&s.group, s.efficiency_ratio));
    }

    vec![
        ("avg_runtime_bar.svg", runtime),
        ("coefficient_of_variation.svg", stability),
        ("memory_efficiency.svg", memory),
    ]
}
