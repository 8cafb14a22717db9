//! Pathfinding benchmark pipeline (experiment 1, `benchmark.csv`)

use super::{write_report, write_table, Progress, RunOptions};
use crate::aggregate::{Aggregator, GroupSummary, RatioSpec};
use crate::anomaly::{AnomalyDetector, Finding};
use crate::cli::OutputFormat;
use crate::config::PathfindingConfig;
use crate::correlation::{global_correlations, Correlation};
use crate::dataset::{Dataset, Schema};
use crate::error::Result;
use crate::json_output;
use crate::loader::{LoadReport, Loader};
use crate::report::{self, pathfinding as render, BaselineComparison, RankMetric, RankProbe};
use serde::Serialize;
use tracing::info;

/// Bytes per megabyte for the runtime-per-MB ratio
pub const MIB: f64 = 1024.0 * 1024.0;

/// Covariates correlated against runtime, with their report keys
pub const CORRELATED: [(&str, &str); 4] = [
    ("nodes_visited", "nodes_visited_vs_runtime"),
    ("edges_relaxed", "edges_relaxed_vs_runtime"),
    ("memory_used_bytes", "memory_vs_runtime"),
    ("path_length", "path_length_vs_runtime"),
];

/// Complete result of one pathfinding analysis
#[derive(Debug, Clone, Serialize)]
pub struct PathfindingAnalysis {
    pub load: LoadReport,
    pub graph_types: usize,
    pub distinct_queries: usize,
    /// Fastest first
    pub summaries: Vec<GroupSummary>,
    pub anomalies: Vec<Finding>,
    pub correlations: Vec<Correlation>,
    pub comparisons: Vec<BaselineComparison>,
    pub rank_probes: Vec<RankProbe>,
}

impl PathfindingAnalysis {
    pub fn fastest(&self) -> Option<&GroupSummary> {
        self.summaries.first()
    }

    pub fn slowest(&self) -> Option<&GroupSummary> {
        self.summaries.last()
    }
}

/// Aggregator configured with the runtime-per-MB ratio
pub fn aggregator() -> Aggregator {
    Aggregator::new().with_ratio(RatioSpec {
        covariate: "memory_used_bytes",
        divisor: MIB,
    })
}

/// Analyze a cleaned pathfinding dataset
pub fn analyze(
    dataset: &Dataset,
    load: LoadReport,
    config: &PathfindingConfig,
) -> PathfindingAnalysis {
    let summaries = aggregator().summarize(dataset);
    info!(groups = summaries.len(), "computed pathfinding summaries");

    let detector = AnomalyDetector::new(config.outlier_sigma, config.cov_threshold);
    let anomalies = detector.detect(dataset, &summaries);
    let correlations = global_correlations(dataset, &CORRELATED);

    let comparisons = config
        .comparisons
        .iter()
        .filter_map(|group| {
            report::compare_to_baseline(&summaries, RankMetric::MeanTiming, &config.baseline, group)
        })
        .collect();

    let ranked: Vec<&GroupSummary> = summaries.iter().collect();
    let rank_probes = config
        .rank_probes
        .iter()
        .filter_map(|group| {
            report::rank_of(&ranked, group).map(|rank| RankProbe {
                group: group.clone(),
                rank,
                total: ranked.len(),
            })
        })
        .collect();

    PathfindingAnalysis {
        graph_types: dataset.groups().len(),
        distinct_queries: dataset.distinct_ids(),
        load,
        summaries,
        anomalies,
        correlations,
        comparisons,
        rank_probes,
    }
}

/// Load, analyze and write every pathfinding output
pub fn run(options: &RunOptions, config: &PathfindingConfig) -> Result<PathfindingAnalysis> {
    let progress = Progress::new(options.format);
    progress.banner("Dijkstra Benchmark Analysis");

    progress.step(format!("Loading data from {}...", options.input.display()));
    let schema = Schema::pathfinding();
    let (dataset, load) = Loader::new(schema).load_path(&options.input)?;
    progress.load_report(&load, schema.timing_label);
    progress.step(format!("Graph types: {}", dataset.groups().len()));
    progress.step(format!("Total queries: {}", dataset.distinct_ids()));

    progress.step("\nAnalyzing graph types...");
    let analysis = analyze(&dataset, load, config);

    let rows = render::summary_rows(&analysis.summaries);
    write_table(&options.output_dir, "summary_by_graph.csv", &rows, &progress)?;

    let charts = if options.charts {
        render::charts(&analysis, config)
    } else {
        Vec::new()
    };
    write_report(
        &options.output_dir,
        &render::markdown(&analysis, config),
        &charts,
        &progress,
    )?;

    match options.format {
        OutputFormat::Text => {
            print!("{}", render::console(&analysis, config));
            println!(
                "\nAnalysis complete! Results saved to {}",
                options.output_dir.display()
            );
        }
        OutputFormat::Json => {
            println!(
                "{}",
                json_output::render("pathfinding", &options.input, &analysis)?
            );
        }
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::FindingKind;

    const CSV: &str = "\
graph_type,query_id,origin,destination,runtime_ms,nodes_visited,edges_relaxed,path_length,path_found,total_weight,memory_used_bytes
AdjacencyListGraph,1,A,B,2.0,10,20,3,true,5.0,2097152
AdjacencyListGraph,2,A,C,4.0,20,40,4,true,6.0,2097152
CSRGraph,1,A,B,1.0,10,20,3,true,5.0,1048576
CSRGraph,2,A,C,1.0,20,40,4,false,6.0,1048576
MatrixGraph,1,A,B,8.0,10,20,3,true,5.0,4194304
MatrixGraph,2,A,C,0,20,40,4,true,6.0,4194304
";

    fn analysis() -> PathfindingAnalysis {
        let (dataset, load) = Loader::new(Schema::pathfinding())
            .load_reader(CSV.as_bytes())
            .unwrap();
        analyze(&dataset, load, &PathfindingConfig::default())
    }

    #[test]
    fn test_analyze_orders_and_counts() {
        let a = analysis();
        assert_eq!(a.load.removed_nonpositive, 1);
        assert_eq!(a.graph_types, 3);
        assert_eq!(a.distinct_queries, 2);
        assert_eq!(a.fastest().unwrap().group, "CSRGraph");
        assert_eq!(a.slowest().unwrap().group, "MatrixGraph");
    }

    #[test]
    fn test_analyze_baseline_comparison() {
        let a = analysis();
        assert_eq!(a.comparisons.len(), 1);
        assert_eq!(a.comparisons[0].group, "CSRGraph");
        assert_eq!(a.comparisons[0].speedup, 3.0);
        assert_eq!(a.comparisons[0].verdict(), "faster");
    }

    #[test]
    fn test_analyze_rank_probe() {
        let a = analysis();
        assert_eq!(
            a.rank_probes,
            vec![RankProbe {
                group: "MatrixGraph".to_string(),
                rank: 3,
                total: 3
            }]
        );
    }

    #[test]
    fn test_analyze_memory_ratio_and_failures() {
        let a = analysis();
        let adjacency = a.summaries.iter().find(|s| s.group == "AdjacencyListGraph").unwrap();
        assert_eq!(adjacency.efficiency_ratio, 1.5);
        assert!(a
            .anomalies
            .iter()
            .any(|f| f.kind == FindingKind::FailedOutcome && f.count == 1));
    }

    #[test]
    fn test_analyze_correlation_keys() {
        let a = analysis();
        let names: Vec<&str> = a.correlations.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "nodes_visited_vs_runtime",
                "edges_relaxed_vs_runtime",
                "memory_vs_runtime",
                "path_length_vs_runtime"
            ]
        );
    }
}
