//! Benchmark observations and the CSV schemas that produce them

use serde::Serialize;

/// Column layout of one upstream CSV file
///
/// The group and timing columns must be present in the header. Columns in
/// `required_covariates` must be present too, and a row missing one of those
/// values is dropped. All other declared columns are optional: an absent
/// column reads as missing for every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub group_column: &'static str,
    pub timing_column: &'static str,
    /// Alternate header names accepted for the timing column
    pub timing_aliases: &'static [&'static str],
    pub covariates: &'static [&'static str],
    pub required_covariates: &'static [&'static str],
    pub outcome_column: Option<&'static str>,
    pub bucket_column: Option<&'static str>,
    /// Identifier column used only for distinct-count reporting
    pub id_column: Option<&'static str>,
    /// Plural noun for one row ("queries", "nodes")
    pub subject: &'static str,
    /// Human-readable name of the timing metric
    pub timing_label: &'static str,
    /// Phrase describing a failed outcome
    pub failure_phrase: &'static str,
}

impl Schema {
    /// Experiment 1: `benchmark.csv` from the pathfinding benchmark
    pub const fn pathfinding() -> Self {
        Self {
            group_column: "graph_type",
            timing_column: "runtime_ms",
            timing_aliases: &[],
            covariates: &[
                "nodes_visited",
                "edges_relaxed",
                "path_length",
                "total_weight",
                "memory_used_bytes",
            ],
            required_covariates: &[],
            outcome_column: Some("path_found"),
            bucket_column: None,
            id_column: Some("query_id"),
            subject: "queries",
            timing_label: "runtime",
            failure_phrase: "path was not found",
        }
    }

    /// Experiment 3: `iteration.csv` from the neighbor iteration benchmark
    pub const fn iteration() -> Self {
        Self {
            group_column: "graph_type",
            timing_column: "iteration_time_ns",
            timing_aliases: &["avg_time_ns"],
            covariates: &["time_per_edge_ns", "degree"],
            required_covariates: &["time_per_edge_ns", "degree"],
            outcome_column: None,
            bucket_column: Some("category"),
            id_column: Some("node"),
            subject: "nodes",
            timing_label: "iteration time",
            failure_phrase: "iteration failed",
        }
    }

    /// Position of a covariate in `Observation::covariates`
    pub fn covariate_index(&self, name: &str) -> Option<usize> {
        self.covariates.iter().position(|c| *c == name)
    }
}

/// One benchmark run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub group: String,
    pub timing: f64,
    /// Covariate values in `Schema::covariates` order
    pub covariates: Vec<Option<f64>>,
    pub outcome: Option<bool>,
    pub bucket: Option<String>,
    pub id: Option<String>,
}

impl Observation {
    pub fn covariate(&self, index: usize) -> Option<f64> {
        self.covariates.get(index).copied().flatten()
    }
}

/// Cleaned observations together with the schema that produced them
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(schema: Schema, observations: Vec<Observation>) -> Self {
        Self {
            schema,
            observations,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct group keys in first-appearance order
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for obs in &self.observations {
            if !groups.contains(&obs.group.as_str()) {
                groups.push(&obs.group);
            }
        }
        groups
    }

    /// Observations belonging to one group
    pub fn group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations.iter().filter(move |o| o.group == group)
    }

    /// Timing values of one group in input order
    pub fn timings(&self, group: &str) -> Vec<f64> {
        self.group(group).map(|o| o.timing).collect()
    }

    /// Present values of a covariate for one group
    pub fn covariate_values(&self, group: &str, covariate: &str) -> Vec<f64> {
        match self.schema.covariate_index(covariate) {
            Some(idx) => self.group(group).filter_map(|o| o.covariate(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Distinct bucket labels in first-appearance order
    pub fn buckets(&self) -> Vec<&str> {
        let mut buckets: Vec<&str> = Vec::new();
        for bucket in self.observations.iter().filter_map(|o| o.bucket.as_deref()) {
            if !buckets.contains(&bucket) {
                buckets.push(bucket);
            }
        }
        buckets
    }

    /// Number of distinct row identifiers
    pub fn distinct_ids(&self) -> usize {
        let mut ids: Vec<&str> = self
            .observations
            .iter()
            .filter_map(|o| o.id.as_deref())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}
