//! CSV loading and row-level cleaning
//!
//! Cleaning order per row:
//! 1. drop rows whose timing parses to a value <= 0
//! 2. coerce numeric columns, non-parseable values become missing
//! 3. drop rows missing the group key, the timing, or a required covariate
//!
//! An optional per-group extreme-outlier filter runs after row cleaning.
//! Only a missing file, a header without the required columns, an unreadable
//! CSV, or an empty cleaned dataset is fatal.

use crate::dataset::{Dataset, Observation, Schema};
use crate::error::{AnalysisError, Result};
use crate::stats;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Row counts before and after cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub original_rows: usize,
    /// Rows removed because timing was zero or negative
    pub removed_nonpositive: usize,
    /// Rows removed because the group key, timing or a required covariate was missing
    pub removed_missing: usize,
    /// Rows the CSV reader could not decode
    pub removed_malformed: usize,
    /// Rows removed by the per-group extreme-outlier filter
    pub removed_outliers: usize,
    pub cleaned_rows: usize,
}

impl LoadReport {
    pub fn total_removed(&self) -> usize {
        self.removed_nonpositive
            + self.removed_missing
            + self.removed_malformed
            + self.removed_outliers
    }
}

/// Header positions resolved against a schema
struct ColumnMap {
    group: usize,
    timing: usize,
    covariates: Vec<Option<usize>>,
    outcome: Option<usize>,
    bucket: Option<usize>,
    id: Option<usize>,
}

impl ColumnMap {
    fn resolve(schema: &Schema, headers: &csv::StringRecord) -> Result<Self> {
        let index: HashMap<&str, usize> =
            headers.iter().enumerate().map(|(i, h)| (h, i)).collect();
        let find = |name: &str| index.get(name).copied();

        let mut missing = Vec::new();

        let group = find(schema.group_column);
        if group.is_none() {
            missing.push(schema.group_column.to_string());
        }

        let timing = std::iter::once(schema.timing_column)
            .chain(schema.timing_aliases.iter().copied())
            .find_map(find);
        if timing.is_none() {
            missing.push(schema.timing_column.to_string());
        }

        for required in schema.required_covariates {
            if find(*required).is_none() {
                missing.push(required.to_string());
            }
        }

        match (group, timing) {
            (Some(group), Some(timing)) if missing.is_empty() => Ok(Self {
                group,
                timing,
                covariates: schema.covariates.iter().map(|c| find(*c)).collect(),
                outcome: schema.outcome_column.and_then(find),
                bucket: schema.bucket_column.and_then(find),
                id: schema.id_column.and_then(find),
            }),
            _ => Err(AnalysisError::SchemaMismatch { missing }),
        }
    }
}

/// Parse a numeric cell; empty, non-numeric and non-finite values are missing
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a boolean outcome cell
///
/// Accepts true/false, 1/0 and yes/no in any case. Anything else is unknown.
pub fn parse_outcome(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// CSV loader for one schema
#[derive(Debug, Clone)]
pub struct Loader {
    schema: Schema,
    outlier_filter_sigma: Option<f64>,
}

impl Loader {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            outlier_filter_sigma: None,
        }
    }

    /// Remove rows whose timing exceeds `group mean + sigma * group std`
    pub fn with_outlier_filter(mut self, sigma: f64) -> Self {
        self.outlier_filter_sigma = Some(sigma);
        self
    }

    /// Load and clean a CSV file
    pub fn load_path(&self, path: &Path) -> Result<(Dataset, LoadReport)> {
        if !path.exists() {
            return Err(AnalysisError::InputNotFound(path.to_path_buf()));
        }
        info!(path = %path.display(), "loading benchmark csv");
        let file = File::open(path)?;
        self.load_reader(file)
    }

    /// Load and clean CSV data from any reader
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<(Dataset, LoadReport)> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let columns = ColumnMap::resolve(&self.schema, &headers)?;

        let mut report = LoadReport::default();
        let mut observations = Vec::new();

        for result in reader.records() {
            report.original_rows += 1;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    debug!(error = %e, "skipping undecodable row");
                    report.removed_malformed += 1;
                    continue;
                }
            };

            match self.parse_row(&columns, &record) {
                RowOutcome::Keep(obs) => observations.push(obs),
                RowOutcome::NonPositive => report.removed_nonpositive += 1,
                RowOutcome::Missing => report.removed_missing += 1,
            }
        }

        if report.removed_nonpositive > 0 {
            info!(
                removed = report.removed_nonpositive,
                "dropped rows with zero/negative {}", self.schema.timing_label
            );
        }
        if report.removed_missing > 0 {
            info!(removed = report.removed_missing, "dropped rows with missing fields");
        }

        if let Some(sigma) = self.outlier_filter_sigma {
            let before = observations.len();
            observations = filter_extreme_outliers(observations, sigma);
            report.removed_outliers = before - observations.len();
            if report.removed_outliers > 0 {
                info!(removed = report.removed_outliers, sigma, "dropped extreme outliers");
            }
        }

        report.cleaned_rows = observations.len();
        if observations.is_empty() {
            warn!(rows = report.original_rows, "no rows survived cleaning");
            return Err(AnalysisError::EmptyDataset {
                original_rows: report.original_rows,
            });
        }

        Ok((Dataset::new(self.schema, observations), report))
    }

    fn parse_row(&self, columns: &ColumnMap, record: &csv::StringRecord) -> RowOutcome {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let timing = coerce_numeric(cell(Some(columns.timing)));
        if matches!(timing, Some(t) if t <= 0.0) {
            return RowOutcome::NonPositive;
        }

        let covariates: Vec<Option<f64>> = columns
            .covariates
            .iter()
            .map(|idx| coerce_numeric(cell(*idx)))
            .collect();

        let group = cell(Some(columns.group));
        let Some(timing) = timing else {
            return RowOutcome::Missing;
        };
        if group.is_empty() {
            return RowOutcome::Missing;
        }
        for required in self.schema.required_covariates {
            let present = self
                .schema
                .covariate_index(required)
                .and_then(|i| covariates[i])
                .is_some();
            if !present {
                return RowOutcome::Missing;
            }
        }

        let optional_text = |idx: Option<usize>| {
            let value = cell(idx);
            (!value.is_empty()).then(|| value.to_string())
        };

        RowOutcome::Keep(Observation {
            group: group.to_string(),
            timing,
            covariates,
            outcome: columns.outcome.map(|i| cell(Some(i))).and_then(parse_outcome),
            bucket: optional_text(columns.bucket),
            id: optional_text(columns.id),
        })
    }
}

enum RowOutcome {
    Keep(Observation),
    NonPositive,
    Missing,
}

/// Drop observations above `mean + sigma * std` of their own group
///
/// Thresholds are computed once per group from the unfiltered rows.
pub fn filter_extreme_outliers(observations: Vec<Observation>, sigma: f64) -> Vec<Observation> {
    let mut samples: HashMap<&str, Vec<f64>> = HashMap::new();
    for obs in &observations {
        samples.entry(obs.group.as_str()).or_default().push(obs.timing);
    }
    let thresholds: HashMap<String, f64> = samples
        .into_iter()
        .map(|(group, values)| {
            let threshold = stats::mean(&values) + sigma * stats::sample_std(&values);
            (group.to_string(), threshold)
        })
        .collect();

    observations
        .into_iter()
        .filter(|obs| {
            thresholds
                .get(&obs.group)
                .map_or(true, |threshold| obs.timing <= *threshold)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENCHMARK_CSV: &str = "\
graph_type,query_id,origin,destination,runtime_ms,nodes_visited,edges_relaxed,path_length,path_found,total_weight,memory_used_bytes
CSRGraph,0,A,B,1.5000,10,20,4,true,12.500,1048576
CSRGraph,1,A,C,0.0000,10,20,4,true,12.500,1048576
CSRGraph,2,A,D,-3.0,10,20,4,true,12.500,1048576
MatrixGraph,0,A,B,9.2500,12,abc,4,false,12.500,2097152
MatrixGraph,1,A,C,oops,12,30,4,false,12.500,2097152
,2,A,D,2.0,12,30,4,false,12.500,2097152
";

    #[test]
    fn test_cleaning_counts() {
        let (dataset, report) = Loader::new(Schema::pathfinding())
            .load_reader(BENCHMARK_CSV.as_bytes())
            .unwrap();

        assert_eq!(report.original_rows, 6);
        assert_eq!(report.removed_nonpositive, 2);
        assert_eq!(report.removed_missing, 2);
        assert_eq!(report.cleaned_rows, 2);
        assert_eq!(report.total_removed() + report.cleaned_rows, report.original_rows);
        assert_eq!(dataset.groups(), vec!["CSRGraph", "MatrixGraph"]);
    }

    #[test]
    fn test_numeric_coercion_marks_missing() {
        let (dataset, _) = Loader::new(Schema::pathfinding())
            .load_reader(BENCHMARK_CSV.as_bytes())
            .unwrap();
        let matrix = &dataset.observations()[1];
        let edges = Schema::pathfinding().covariate_index("edges_relaxed").unwrap();
        assert_eq!(matrix.covariate(edges), None);
        assert_eq!(matrix.outcome, Some(false));
        assert_eq!(matrix.covariate(0), Some(12.0));
    }

    #[test]
    fn test_schema_mismatch_is_fatal() {
        let csv = "graph_type,nodes_visited\nCSRGraph,10\n";
        let err = Loader::new(Schema::pathfinding())
            .load_reader(csv.as_bytes())
            .unwrap_err();
        match err {
            AnalysisError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["runtime_ms".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_rows_invalid_is_fatal() {
        let csv = "graph_type,runtime_ms\nA,0\nB,-1\n";
        let err = Loader::new(Schema::pathfinding())
            .load_reader(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyDataset { original_rows: 2 }));
    }

    #[test]
    fn test_missing_file() {
        let err = Loader::new(Schema::pathfinding())
            .load_path(Path::new("/nonexistent/benchmark.csv"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InputNotFound(_)));
    }

    #[test]
    fn test_timing_alias_and_required_covariate() {
        let csv = "\
graph_type,node,category,degree,avg_time_ns,std_dev_ns,cov_percent,p95_ns,time_per_edge_ns,phase
CSRGraph,n1,sparse,3,120.00,1.0,1.0,130,40.00,random
CSRGraph,n2,dense,,900.00,1.0,1.0,950,15.00,random
";
        let (dataset, report) = Loader::new(Schema::iteration())
            .load_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(report.removed_missing, 1);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.observations()[0].timing, 120.0);
        assert_eq!(dataset.observations()[0].bucket.as_deref(), Some("sparse"));
    }

    #[test]
    fn test_iteration_requires_degree_column() {
        let csv = "graph_type,iteration_time_ns\nA,10\n";
        let err = Loader::new(Schema::iteration())
            .load_reader(csv.as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("degree"));
    }

    #[test]
    fn test_iteration_requires_time_per_edge_column() {
        let csv = "graph_type,iteration_time_ns,degree\nA,10,2\n";
        let err = Loader::new(Schema::iteration())
            .load_reader(csv.as_bytes())
            .unwrap_err();
        match err {
            AnalysisError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["time_per_edge_ns".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_outlier_filter_removes_spike() {
        let mut csv = String::from("graph_type,iteration_time_ns,degree,time_per_edge_ns\n");
        for _ in 0..40 {
            csv.push_str("A,100,5,20\n");
        }
        csv.push_str("A,100000,5,20000\n");
        csv.push_str("B,50,5,10\n");

        let (dataset, report) = Loader::new(Schema::iteration())
            .with_outlier_filter(5.0)
            .load_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(report.removed_outliers, 1);
        assert_eq!(dataset.timings("A").len(), 40);
        assert_eq!(dataset.timings("B"), vec![50.0]);
    }

    #[test]
    fn test_parse_outcome_variants() {
        assert_eq!(parse_outcome("True"), Some(true));
        assert_eq!(parse_outcome("0"), Some(false));
        assert_eq!(parse_outcome(" no "), Some(false));
        assert_eq!(parse_outcome("maybe"), None);
        assert_eq!(parse_outcome(""), None);
    }

    #[test]
    fn test_coerce_numeric_rejects_non_finite() {
        assert_eq!(coerce_numeric("1.25"), Some(1.25));
        assert_eq!(coerce_numeric("NaN"), None);
        assert_eq!(coerce_numeric("inf"), None);
        assert_eq!(coerce_numeric(""), None);
    }
}
