//! Per-group aggregation of cleaned observations

use crate::dataset::Dataset;
use crate::stats::{self, TimingStats};
use serde::Serialize;
use std::cmp::Ordering;

/// Mean of one covariate within a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovariateMean {
    pub name: String,
    /// NaN when the group has no values for this covariate
    pub mean: f64,
}

/// Derived efficiency ratio: mean timing over a scaled covariate mean
///
/// The denominator is `covariate mean / divisor`, so a divisor of 1 MiB turns
/// a byte count into megabytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioSpec {
    pub covariate: &'static str,
    pub divisor: f64,
}

/// Aggregated statistics for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub timing: TimingStats,
    pub covariate_means: Vec<CovariateMean>,
    /// Percentage of known outcomes that succeeded
    pub success_rate: Option<f64>,
    /// 0 when the scaled covariate mean is not positive
    pub efficiency_ratio: f64,
}

impl GroupSummary {
    /// Mean of a named covariate, NaN if unknown
    pub fn covariate_mean(&self, name: &str) -> f64 {
        self.covariate_means
            .iter()
            .find(|c| c.name == name)
            .map_or(f64::NAN, |c| c.mean)
    }
}

/// Groups observations and computes summaries
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    ratio: Option<RatioSpec>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ratio(mut self, ratio: RatioSpec) -> Self {
        self.ratio = Some(ratio);
        self
    }

    /// One summary per group, sorted ascending by mean timing
    ///
    /// Equal means keep first-appearance group order.
    pub fn summarize(&self, dataset: &Dataset) -> Vec<GroupSummary> {
        let mut summaries: Vec<GroupSummary> = dataset
            .groups()
            .into_iter()
            .filter_map(|group| self.summarize_group(dataset, group))
            .collect();

        summaries.sort_by(|a, b| cmp_nan_last(a.timing.mean, b.timing.mean));
        summaries
    }

    fn summarize_group(&self, dataset: &Dataset, group: &str) -> Option<GroupSummary> {
        let timings = dataset.timings(group);
        let timing = TimingStats::from_values(&timings)?;

        let covariate_means: Vec<CovariateMean> = dataset
            .schema()
            .covariates
            .iter()
            .map(|name| CovariateMean {
                name: name.to_string(),
                mean: stats::mean(&dataset.covariate_values(group, name)),
            })
            .collect();

        let outcomes: Vec<bool> = dataset.group(group).filter_map(|o| o.outcome).collect();
        let success_rate = (!outcomes.is_empty()).then(|| {
            outcomes.iter().filter(|ok| **ok).count() as f64 / outcomes.len() as f64 * 100.0
        });

        let efficiency_ratio = match self.ratio {
            Some(spec) => {
                let denominator = stats::mean(&dataset.covariate_values(group, spec.covariate))
                    / spec.divisor;
                stats::safe_ratio(timing.mean, denominator)
            }
            None => 0.0,
        };

        Some(GroupSummary {
            group: group.to_string(),
            count: timing.count,
            timing,
            covariate_means,
            success_rate,
            efficiency_ratio,
        })
    }
}

/// Ascending order with NaN sorted after every number
pub fn cmp_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Statistics for one group within one bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub group: String,
    pub bucket: String,
    pub count: usize,
    pub mean_timing: f64,
    pub covariate_means: Vec<CovariateMean>,
}

impl BucketSummary {
    pub fn covariate_mean(&self, name: &str) -> f64 {
        self.covariate_means
            .iter()
            .find(|c| c.name == name)
            .map_or(f64::NAN, |c| c.mean)
    }
}

/// Per-group, per-bucket breakdown
///
/// Groups come in first-appearance order and buckets in the order given.
/// Empty (group, bucket) pairs are omitted.
pub fn bucket_breakdown(dataset: &Dataset, buckets: &[&str]) -> Vec<BucketSummary> {
    let covariates = dataset.schema().covariates;
    let mut rows = Vec::new();

    for group in dataset.groups() {
        for bucket in buckets {
            let members: Vec<_> = dataset
                .group(group)
                .filter(|o| o.bucket.as_deref() == Some(*bucket))
                .collect();
            if members.is_empty() {
                continue;
            }

            let timings: Vec<f64> = members.iter().map(|o| o.timing).collect();
            let covariate_means = covariates
                .iter()
                .enumerate()
                .map(|(idx, name)| CovariateMean {
                    name: name.to_string(),
                    mean: stats::mean_present(members.iter().map(|o| o.covariate(idx))),
                })
                .collect();

            rows.push(BucketSummary {
                group: group.to_string(),
                bucket: bucket.to_string(),
                count: members.len(),
                mean_timing: stats::mean(&timings),
                covariate_means,
            });
        }
    }

    rows
}

/// One covariate compared between two buckets of the same group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketContrast {
    pub group: String,
    pub low: f64,
    pub high: f64,
    /// `(low - high) / low * 100`, 0 when `low` is not positive
    pub improvement: f64,
}

/// Compare a covariate's bucket means for every group that has both buckets
///
/// Groups keep the order of `rows`.
pub fn bucket_contrast(
    rows: &[BucketSummary],
    covariate: &str,
    low_bucket: &str,
    high_bucket: &str,
) -> Vec<BucketContrast> {
    let mut contrasts = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for row in rows {
        if seen.contains(&row.group.as_str()) {
            continue;
        }
        seen.push(&row.group);

        let mean_in = |bucket: &str| {
            rows.iter()
                .find(|r| r.group == row.group && r.bucket == bucket)
                .map(|r| r.covariate_mean(covariate))
        };
        let (Some(low), Some(high)) = (mean_in(low_bucket), mean_in(high_bucket)) else {
            continue;
        };

        let improvement = if low > 0.0 {
            (low - high) / low * 100.0
        } else {
            0.0
        };
        contrasts.push(BucketContrast {
            group: row.group.clone(),
            low,
            high,
            improvement,
        });
    }

    contrasts
}

/// Spread of one covariate within a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovariateSpread {
    pub group: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub cov: f64,
}

/// Mean, median and coefficient of variation of a covariate per group
///
/// Groups without any value for the covariate are omitted.
pub fn covariate_spread(dataset: &Dataset, covariate: &str) -> Vec<CovariateSpread> {
    dataset
        .groups()
        .into_iter()
        .filter_map(|group| {
            let values = dataset.covariate_values(group, covariate);
            let summary = TimingStats::from_values(&values)?;
            Some(CovariateSpread {
                group: group.to_string(),
                mean: summary.mean,
                median: summary.median,
                std: summary.std,
                cov: summary.cov,
            })
        })
        .collect()
}

/// Right-closed interval `(lower, upper]` with a display label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub label: &'static str,
}

impl Bin {
    pub const fn new(lower: f64, upper: f64, label: &'static str) -> Self {
        Self {
            lower,
            upper,
            label,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.lower && value <= self.upper
    }
}

/// Node degree bins used for scaling analysis
pub const DEGREE_BINS: [Bin; 5] = [
    Bin::new(0.0, 5.0, "1-5"),
    Bin::new(5.0, 10.0, "6-10"),
    Bin::new(10.0, 20.0, "11-20"),
    Bin::new(20.0, 50.0, "21-50"),
    Bin::new(50.0, 1000.0, "50+"),
];

/// Statistics for one group within one covariate bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSummary {
    pub group: String,
    pub label: String,
    pub count: usize,
    /// Mean of the binned covariate itself
    pub mean_binned: f64,
    pub mean_timing: f64,
    pub covariate_means: Vec<CovariateMean>,
}

impl BinSummary {
    pub fn covariate_mean(&self, name: &str) -> f64 {
        self.covariate_means
            .iter()
            .find(|c| c.name == name)
            .map_or(f64::NAN, |c| c.mean)
    }
}

/// Bin each group's rows by a covariate and summarize every non-empty bin
///
/// Rows whose covariate is missing or outside every bin are skipped.
pub fn binned_by(dataset: &Dataset, covariate: &str, bins: &[Bin]) -> Vec<BinSummary> {
    let Some(binned_idx) = dataset.schema().covariate_index(covariate) else {
        return Vec::new();
    };
    let covariates = dataset.schema().covariates;
    let mut rows = Vec::new();

    for group in dataset.groups() {
        for bin in bins {
            let members: Vec<_> = dataset
                .group(group)
                .filter(|o| o.covariate(binned_idx).is_some_and(|v| bin.contains(v)))
                .collect();
            if members.is_empty() {
                continue;
            }

            let timings: Vec<f64> = members.iter().map(|o| o.timing).collect();
            let covariate_means: Vec<CovariateMean> = covariates
                .iter()
                .enumerate()
                .map(|(idx, name)| CovariateMean {
                    name: name.to_string(),
                    mean: stats::mean_present(members.iter().map(|o| o.covariate(idx))),
                })
                .collect();

            rows.push(BinSummary {
                group: group.to_string(),
                label: bin.label.to_string(),
                count: members.len(),
                mean_binned: stats::mean_present(members.iter().map(|o| o.covariate(binned_idx))),
                mean_timing: stats::mean(&timings),
                covariate_means,
            });
        }
    }

    rows
}
