//! Neighbor iteration pipeline (experiment 3, `iteration.csv`)
//!
//! Groups are ranked by mean time per edge rather than by raw iteration
//! time, since nodes of different degree are mixed within every group.

use super::{write_report, write_table, Progress, RunOptions};
use crate::aggregate::{
    bucket_breakdown, bucket_contrast, binned_by, covariate_spread, Aggregator, BinSummary,
    BucketContrast, BucketSummary, CovariateSpread, GroupSummary, RatioSpec, DEGREE_BINS,
};
use crate::anomaly::{AnomalyDetector, Finding};
use crate::cli::OutputFormat;
use crate::config::IterationConfig;
use crate::correlation::{per_group_correlations, GroupCorrelation};
use crate::dataset::{Dataset, Schema};
use crate::error::Result;
use crate::json_output;
use crate::loader::{LoadReport, Loader};
use crate::report::{self, iteration as render, BaselineComparison, RankMetric};
use serde::Serialize;
use tracing::info;

pub const TIME_PER_EDGE: &str = "time_per_edge_ns";
pub const DEGREE: &str = "degree";

/// Ranking metric for this pipeline
pub const RANK_METRIC: RankMetric = RankMetric::CovariateMean(TIME_PER_EDGE);

/// Complete result of one iteration analysis
#[derive(Debug, Clone, Serialize)]
pub struct IterationAnalysis {
    pub load: LoadReport,
    pub graph_types: usize,
    pub distinct_nodes: usize,
    /// Bucket labels seen in the data, first-appearance order
    pub categories: Vec<String>,
    /// Most efficient (lowest time per edge) first
    pub summaries: Vec<GroupSummary>,
    pub time_per_edge: Vec<CovariateSpread>,
    pub buckets: Vec<BucketSummary>,
    pub degree_scaling: Vec<BinSummary>,
    pub correlations: Vec<GroupCorrelation>,
    /// First configured category against the last one
    pub sparse_vs_dense: Vec<BucketContrast>,
    pub baseline: Option<BaselineComparison>,
    pub anomalies: Vec<Finding>,
}

impl IterationAnalysis {
    pub fn fastest(&self) -> Option<&GroupSummary> {
        self.summaries.first()
    }

    pub fn slowest(&self) -> Option<&GroupSummary> {
        self.summaries.last()
    }

    pub fn time_per_edge_of(&self, group: &str) -> Option<&CovariateSpread> {
        self.time_per_edge.iter().find(|s| s.group == group)
    }

    pub fn bucket(&self, group: &str, bucket: &str) -> Option<&BucketSummary> {
        self.buckets
            .iter()
            .find(|b| b.group == group && b.bucket == bucket)
    }

    /// Group whose time per edge improves most from sparse to dense nodes
    pub fn best_scaling(&self) -> Option<&BucketContrast> {
        self.sparse_vs_dense.iter().reduce(|best, c| {
            if c.improvement > best.improvement {
                c
            } else {
                best
            }
        })
    }
}

/// Loader for `iteration.csv`, with the extreme-outlier filter when enabled
pub fn loader(config: &IterationConfig) -> Loader {
    let loader = Loader::new(Schema::iteration());
    if config.filter_outliers {
        loader.with_outlier_filter(config.outlier_sigma)
    } else {
        loader
    }
}

/// Analyze a cleaned iteration dataset
pub fn analyze(dataset: &Dataset, load: LoadReport, config: &IterationConfig) -> IterationAnalysis {
    let by_time = Aggregator::new()
        .with_ratio(RatioSpec {
            covariate: DEGREE,
            divisor: 1.0,
        })
        .summarize(dataset);
    let anomalies =
        AnomalyDetector::new(config.outlier_sigma, config.cov_threshold).detect(dataset, &by_time);

    let summaries: Vec<GroupSummary> = report::rank_by(&by_time, RANK_METRIC)
        .into_iter()
        .cloned()
        .collect();
    info!(groups = summaries.len(), "computed iteration summaries");

    let categories: Vec<&str> = config.categories.iter().map(String::as_str).collect();
    let buckets = bucket_breakdown(dataset, &categories);
    let sparse_vs_dense = match (categories.first(), categories.last()) {
        (Some(low), Some(high)) if categories.len() > 1 => {
            bucket_contrast(&buckets, TIME_PER_EDGE, low, high)
        }
        _ => Vec::new(),
    };

    let baseline = summaries.first().and_then(|fastest| {
        report::compare_to_baseline(&summaries, RANK_METRIC, &config.baseline, &fastest.group)
    });

    IterationAnalysis {
        load,
        graph_types: dataset.groups().len(),
        distinct_nodes: dataset.distinct_ids(),
        categories: dataset.buckets().into_iter().map(str::to_string).collect(),
        time_per_edge: covariate_spread(dataset, TIME_PER_EDGE),
        degree_scaling: binned_by(dataset, DEGREE, &DEGREE_BINS),
        correlations: per_group_correlations(dataset, DEGREE),
        summaries,
        buckets,
        sparse_vs_dense,
        baseline,
        anomalies,
    }
}

/// Load, analyze and write every iteration output
pub fn run(options: &RunOptions, config: &IterationConfig) -> Result<IterationAnalysis> {
    let progress = Progress::new(options.format);
    progress.banner("Neighbor Iteration Performance Analysis");

    progress.step(format!("Loading data from {}...", options.input.display()));
    let (dataset, load) = loader(config).load_path(&options.input)?;
    progress.load_report(&load, Schema::iteration().timing_label);
    progress.step(format!("Graph types: {}", dataset.groups().len()));
    progress.step(format!("Total nodes tested: {}", dataset.distinct_ids()));
    progress.step(format!("Categories: {}", dataset.buckets().join(", ")));

    progress.step("\nAnalyzing graph types...");
    let analysis = analyze(&dataset, load, config);

    let rows = render::summary_rows(&analysis, &config.categories);
    write_table(&options.output_dir, "summary_by_graph.csv", &rows, &progress)?;
    let scaling = render::degree_rows(&analysis.degree_scaling);
    write_table(&options.output_dir, "degree_scaling.csv", &scaling, &progress)?;

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
                json_output::render("iteration", &options.input, &analysis)?
            );
        }
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
graph_type,node,category,degree,iteration_time_ns,time_per_edge_ns,phase
AdjacencyListGraph,1,sparse,2,40,20,measure
AdjacencyListGraph,2,dense,60,600,10,measure
CSRGraph,1,sparse,2,20,10,measure
CSRGraph,2,dense,60,120,2,measure
HashMapGraph,1,sparse,2,30,15,measure
HashMapGraph,2,medium,12,180,15,measure
HashMapGraph,3,dense,,900,15,measure
";

    fn analysis() -> IterationAnalysis {
        let config = IterationConfig::default();
        let (dataset, load) = loader(&config).load_reader(CSV.as_bytes()).unwrap();
        analyze(&dataset, load, &config)
    }

    #[test]
    fn test_missing_degree_dropped() {
        let a = analysis();
        assert_eq!(a.load.removed_missing, 1);
        assert_eq!(a.load.cleaned_rows, 6);
        assert_eq!(a.distinct_nodes, 2);
    }

    #[test]
    fn test_ranked_by_time_per_edge() {
        let a = analysis();
        let order: Vec<&str> = a.summaries.iter().map(|s| s.group.as_str()).collect();
        assert_eq!(order, vec!["CSRGraph", "HashMapGraph", "AdjacencyListGraph"]);
        assert_eq!(a.fastest().unwrap().covariate_mean(TIME_PER_EDGE), 6.0);
    }

    #[test]
    fn test_baseline_speedup() {
        let baseline = analysis().baseline.unwrap();
        assert_eq!(baseline.group, "CSRGraph");
        assert_eq!(baseline.speedup, 2.5);
        assert_eq!(baseline.verdict(), "faster");
    }

    #[test]
    fn test_sparse_vs_dense() {
        let a = analysis();
        assert_eq!(a.sparse_vs_dense.len(), 2);
        let best = a.best_scaling().unwrap();
        assert_eq!(best.group, "CSRGraph");
        assert_eq!(best.improvement, 80.0);
    }

    #[test]
    fn test_degree_scaling_and_buckets() {
        let a = analysis();
        assert!(a
            .degree_scaling
            .iter()
            .any(|b| b.group == "HashMapGraph" && b.label == "11-20" && b.count == 1));
        assert_eq!(a.bucket("CSRGraph", "dense").unwrap().mean_timing, 120.0);
        assert!(a.bucket("CSRGraph", "medium").is_none());
        assert_eq!(a.categories, vec!["sparse", "dense", "medium"]);
    }

    #[test]
    fn test_per_group_correlation() {
        let a = analysis();
        let csr = a.correlations.iter().find(|c| c.group == "CSRGraph").unwrap();
        assert_eq!(csr.pairs, 2);
        assert!((csr.coefficient - 1.0).abs() < 1e-12);
    }
}
