//! Neighbor iteration report rendering

use super::{escape_cell, fixed, markdown_table, title_case, Field, TableRow};
use crate::aggregate::{cmp_nan_last, BinSummary, BucketSummary, GroupSummary};
use crate::config::IterationConfig;
use crate::correlation::GroupCorrelation;
use crate::pipeline::iteration::{IterationAnalysis, DEGREE, TIME_PER_EDGE};
use crate::svg_chart::{cov_color, Bar, BarChart};
use std::fmt::Write as _;

/// `summary_by_graph.csv` row with one column block per configured category
pub struct SummaryRow<'a> {
    summary: &'a GroupSummary,
    median_time_per_edge: f64,
    categories: Vec<(&'a str, Option<&'a BucketSummary>)>,
}

impl TableRow for SummaryRow<'_> {
    fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = [
            "graph_type",
            "num_nodes_tested",
            "avg_iteration_time_ns",
            "median_iteration_time_ns",
            "std_iteration_time_ns",
            "avg_time_per_edge_ns",
            "median_time_per_edge_ns",
            "avg_degree",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();

        for (category, _) in &self.categories {
            headers.push(format!("avg_time_{}", category));
            headers.push(format!("avg_time_per_edge_{}", category));
            headers.push(format!("avg_degree_{}", category));
            headers.push(format!("num_nodes_{}", category));
        }

        headers.extend(
            ["p95_iteration_time_ns", "p99_iteration_time_ns", "coefficient_of_variation"]
                .iter()
                .map(|h| h.to_string()),
        );
        headers
    }

    fn fields(&self) -> Vec<Field> {
        let s = self.summary;
        let mut fields = vec![
            Field::Text(s.group.clone()),
            Field::Count(s.count),
            Field::float(s.timing.mean),
            Field::float(s.timing.median),
            Field::float(s.timing.std),
            Field::float(s.covariate_mean(TIME_PER_EDGE)),
            Field::float(self.median_time_per_edge),
            Field::float(s.covariate_mean(DEGREE)),
        ];

        for (_, bucket) in &self.categories {
            match bucket {
                Some(b) => fields.extend([
                    Field::float(b.mean_timing),
                    Field::float(b.covariate_mean(TIME_PER_EDGE)),
                    Field::float(b.covariate_mean(DEGREE)),
                    Field::Count(b.count),
                ]),
                None => fields.extend([
                    Field::Missing,
                    Field::Missing,
                    Field::Missing,
                    Field::Count(0),
                ]),
            }
        }

        fields.extend([
            Field::float(s.timing.p95),
            Field::float(s.timing.p99),
            Field::float(s.timing.cov),
        ]);
        fields
    }
}

/// Summary rows in ranking order
pub fn summary_rows<'a>(
    analysis: &'a IterationAnalysis,
    categories: &'a [String],
) -> Vec<SummaryRow<'a>> {
    analysis
        .summaries
        .iter()
        .map(|summary| SummaryRow {
            summary,
            median_time_per_edge: analysis
                .time_per_edge_of(&summary.group)
                .map_or(f64::NAN, |spread| spread.median),
            categories: categories
                .iter()
                .map(|c| (c.as_str(), analysis.bucket(&summary.group, c)))
                .collect(),
        })
        .collect()
}

/// `degree_scaling.csv` row
pub struct DegreeRow<'a>(pub &'a BinSummary);

impl TableRow for DegreeRow<'_> {
    fn headers(&self) -> Vec<String> {
        [
            "graph_type",
            "degree_range",
            "avg_degree",
            "avg_iteration_time",
            "avg_time_per_edge",
            "num_nodes",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    fn fields(&self) -> Vec<Field> {
        let b = self.0;
        vec![
            Field::Text(b.group.clone()),
            Field::Text(b.label.clone()),
            Field::float(b.mean_binned),
            Field::float(b.mean_timing),
            Field::float(b.covariate_mean(TIME_PER_EDGE)),
            Field::Count(b.count),
        ]
    }
}

pub fn degree_rows(bins: &[BinSummary]) -> Vec<DegreeRow<'_>> {
    bins.iter().map(DegreeRow).collect()
}

/// Defined correlations sorted by descending magnitude
fn strongest_correlations(correlations: &[GroupCorrelation]) -> Vec<&GroupCorrelation> {
    let mut defined: Vec<&GroupCorrelation> = correlations
        .iter()
        .filter(|c| !c.coefficient.is_nan())
        .collect();
    defined.sort_by(|a, b| cmp_nan_last(b.coefficient.abs(), a.coefficient.abs()));
    defined
}

/// Render `analysis_report.md`
pub fn markdown(analysis: &IterationAnalysis, config: &IterationConfig) -> String {
    let mut out =
        String::from("# Neighbor Iteration Performance Analysis\n\n## Executive Summary\n\n");

    if let (Some(fastest), Some(slowest)) = (analysis.fastest(), analysis.slowest()) {
        let _ = writeln!(
            out,
            "**Fastest Iteration** (time per edge): {} ({} ns/edge)",
            fastest.group,
            fixed(fastest.covariate_mean(TIME_PER_EDGE), 2)
        );
        let _ = writeln!(
            out,
            "**Slowest Iteration** (time per edge): {} ({} ns/edge)",
            slowest.group,
            fixed(slowest.covariate_mean(TIME_PER_EDGE), 2)
        );
    }
    match &analysis.baseline {
        Some(cmp) if cmp.group == cmp.baseline => {
            let _ = writeln!(
                out,
                "**Speedup vs Baseline**: {} is itself the fastest graph",
                cmp.baseline
            );
        }
        Some(cmp) if !cmp.is_defined() => {
            let _ = writeln!(
                out,
                "**Speedup vs Baseline**: undefined ({} vs {} has a zero mean time per edge)",
                cmp.group, cmp.baseline
            );
        }
        Some(cmp) => {
            let _ = writeln!(
                out,
                "**Speedup vs Baseline**: {} is {:.2}x {} than {}",
                cmp.group,
                cmp.speedup,
                cmp.verdict(),
                cmp.baseline
            );
        }
        None => {}
    }

    out.push_str("\n## Performance Rankings (by Time Per Edge)\n\n");
    out.push_str("| Rank | Graph Type | Avg Time/Edge (ns) | Avg Iteration (ns) | Avg Degree |\n");
    out.push_str("|------|------------|-------------------|-------------------|------------|\n");
    for (i, s) in analysis.summaries.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            i + 1,
            escape_cell(&s.group),
            fixed(s.covariate_mean(TIME_PER_EDGE), 2),
            fixed(s.timing.mean, 2),
            fixed(s.covariate_mean(DEGREE), 1)
        );
    }

    out.push_str("\n## Performance by Node Degree Category\n");
    for category in &config.categories {
        let _ = writeln!(out, "\n### {} Nodes", title_case(category));
        out.push_str("| Graph Type | Avg Time/Edge (ns) | Nodes Tested |\n");
        out.push_str("|------------|-------------------|--------------|\n");
        for s in &analysis.summaries {
            let Some(bucket) = analysis.bucket(&s.group, category) else {
                continue;
            };
            let per_edge = bucket.covariate_mean(TIME_PER_EDGE);
            if per_edge.is_nan() {
                continue;
            }
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                escape_cell(&s.group),
                fixed(per_edge, 2),
                bucket.count
            );
        }
    }

    out.push_str("\n## Degree Scaling Analysis\n\n");
    out.push_str("How iteration time scales with node degree:\n\n");
    for corr in analysis.correlations.iter().filter(|c| !c.coefficient.is_nan()) {
        let _ = writeln!(
            out,
            "- **{}**: Correlation = {:.3} ({})",
            corr.group,
            corr.coefficient,
            corr.strength()
        );
    }
    if !analysis.degree_scaling.is_empty() {
        out.push_str("\n### Degree Ranges\n\n");
        out.push_str(&markdown_table(&degree_rows(&analysis.degree_scaling)));
    }

    out.push_str("\n## Key Insights\n\n");
    if let Some(best) = analysis.best_scaling() {
        let (low, high) = scaling_buckets(config);
        let _ = writeln!(
            out,
            "**Best Scaling with Degree**: {} shows {:.1}% improvement from {} to {} nodes",
            best.group, best.improvement, low, high
        );
    }

    if !analysis.anomalies.is_empty() {
        out.push_str("\n## Anomalies Detected\n\n");
        for finding in &analysis.anomalies {
            let _ = writeln!(out, "- {}", finding);
        }
    }

    out
}

/// Bucket labels compared in the sparse-vs-dense contrast
fn scaling_buckets(config: &IterationConfig) -> (&str, &str) {
    let low = config.categories.first().map_or("sparse", String::as_str);
    let high = config.categories.last().map_or("dense", String::as_str);
    (low, high)
}

/// Console summary printed after a text-mode run
pub fn console(analysis: &IterationAnalysis, config: &IterationConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=".repeat(60));
    out.push_str("SUMMARY\n");
    let _ = writeln!(out, "{}", "=".repeat(60));

    let summaries = &analysis.summaries;
    let top_n = config.top_n.min(summaries.len());

    let _ = writeln!(out, "\nTop {} Most Efficient (Time Per Edge):", top_n);
    for (i, s) in summaries.iter().take(top_n).enumerate() {
        let _ = writeln!(
            out,
            "  {}. {}: {} ns/edge",
            i + 1,
            s.group,
            fixed(s.covariate_mean(TIME_PER_EDGE), 2)
        );
    }

    let _ = writeln!(out, "\nBottom {} Least Efficient (Time Per Edge):", top_n);
    let first_rank = summaries.len() - top_n + 1;
    for (i, s) in summaries[summaries.len() - top_n..].iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {}: {} ns/edge",
            first_rank + i,
            s.group,
            fixed(s.covariate_mean(TIME_PER_EDGE), 2)
        );
    }

    out.push_str("\nDegree Correlation (iteration time vs degree):\n");
    for corr in strongest_correlations(&analysis.correlations).into_iter().take(5) {
        let _ = writeln!(out, "  {}: {:.3}", corr.group, corr.coefficient);
    }

    if !analysis.anomalies.is_empty() {
        out.push_str("\nAnomalies:\n");
        for finding in &analysis.anomalies {
            let _ = writeln!(out, "  - {}", finding);
        }
    }

    out
}

/// Time-per-edge, consistency and sparse-vs-dense charts
pub fn charts(
    analysis: &IterationAnalysis,
    config: &IterationConfig,
) -> Vec<(&'static str, BarChart)> {
    let mut per_edge = BarChart::new(
        "Iteration Efficiency: Time Per Edge (Lower = Better)",
        "Average Time Per Edge (nanoseconds)",
    );
    for s in &analysis.summaries {
        per_edge.push(Bar::new(&s.group, s.covariate_mean(TIME_PER_EDGE)));
    }

    let mut spreads: Vec<_> = analysis.time_per_edge.iter().collect();
    spreads.sort_by(|a, b| cmp_nan_last(a.cov, b.cov));
    let mut consistency = BarChart::new(
        "Iteration Consistency (Lower = More Predictable)",
        "Coefficient of Variation (%)",
    )
    .with_threshold(config.cov_threshold, "High Variance Threshold");
    for spread in spreads {
        let color = cov_color(spread.cov, config.cov_threshold);
        consistency.push(Bar::new(&spread.group, spread.cov).with_color(color));
    }

    let (low, high) = scaling_buckets(config);
    let (low_title, high_title) = (title_case(low), title_case(high));
    let mut contrasts: Vec<_> = analysis.sparse_vs_dense.iter().collect();
    contrasts.sort_by(|a, b| cmp_nan_last(a.low, b.low));
    let mut sparse_dense = BarChart::new(
        format!("Iteration Efficiency: {} vs {} Nodes", low_title, high_title),
        "Average Time Per Edge (nanoseconds)",
    )
    .with_series(&[low_title.as_str(), high_title.as_str()]);
    for c in contrasts {
        sparse_dense.push(Bar::grouped(&c.group, vec![c.low, c.high]));
    }

    vec![
        ("time_per_edge_bar.svg", per_edge),
        ("iteration_consistency.svg", consistency),
        ("sparse_vs_dense.svg", sparse_dense),
    ]
}
