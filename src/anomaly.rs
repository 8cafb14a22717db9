//! Anomaly detection over cleaned observations and group summaries
//!
//! Every check runs independently and yields a human-readable finding.
//! Findings are informational only and never feed back into statistics.

use crate::aggregate::GroupSummary;
use crate::dataset::Dataset;
use crate::stats;
use serde::Serialize;
use std::fmt;

/// Category of a detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Observations with exactly zero timing
    ZeroTiming,
    /// Observations above `mean + sigma * std` of their group
    Outliers,
    /// Observations whose outcome indicator is false
    FailedOutcome,
    /// Groups whose coefficient of variation exceeds the threshold
    HighVariance,
}

/// Detected anomaly with metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Number of affected observations (or groups, for high variance)
    pub count: usize,
    /// Groups involved, empty for dataset-wide findings
    pub groups: Vec<String>,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Threshold-based anomaly detector
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// Outlier threshold in standard deviations above the group mean
    outlier_sigma: f64,
    /// Coefficient of variation (percent) above which a group is flagged
    cov_threshold: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(3.0, 30.0)
    }
}

impl AnomalyDetector {
    pub fn new(outlier_sigma: f64, cov_threshold: f64) -> Self {
        Self {
            outlier_sigma,
            cov_threshold,
        }
    }

    /// Run all checks
    ///
    /// `summaries` must come from the same dataset; their order decides the
    /// order of groups in the high-variance finding.
    pub fn detect(&self, dataset: &Dataset, summaries: &[GroupSummary]) -> Vec<Finding> {
        let mut findings = Vec::new();
        findings.extend(self.zero_timing(dataset));
        findings.extend(self.outliers(dataset));
        findings.extend(self.failed_outcomes(dataset));
        findings.extend(self.high_variance(summaries));
        findings
    }

    fn zero_timing(&self, dataset: &Dataset) -> Option<Finding> {
        // The loader already drops these; kept so hand-built datasets are checked too.
        let count = dataset
            .observations()
            .iter()
            .filter(|o| o.timing == 0.0)
            .count();
        let schema = dataset.schema();
        (count > 0).then(|| Finding {
            kind: FindingKind::ZeroTiming,
            count,
            groups: Vec::new(),
            message: format!(
                "Found {} {} with zero {}",
                count, schema.subject, schema.timing_label
            ),
        })
    }

    fn outliers(&self, dataset: &Dataset) -> Vec<Finding> {
        dataset
            .groups()
            .into_iter()
            .filter_map(|group| {
                let timings = dataset.timings(group);
                let threshold =
                    stats::mean(&timings) + self.outlier_sigma * stats::sample_std(&timings);
                let count = timings.iter().filter(|t| **t > threshold).count();
                (count > 0).then(|| Finding {
                    kind: FindingKind::Outliers,
                    count,
                    groups: vec![group.to_string()],
                    message: format!(
                        "{}: {} outliers (>{}σ)",
                        group,
                        count,
                        format_sigma(self.outlier_sigma)
                    ),
                })
            })
            .collect()
    }

    fn failed_outcomes(&self, dataset: &Dataset) -> Option<Finding> {
        let count = dataset
            .observations()
            .iter()
            .filter(|o| o.outcome == Some(false))
            .count();
        let schema = dataset.schema();
        (count > 0).then(|| Finding {
            kind: FindingKind::FailedOutcome,
            count,
            groups: Vec::new(),
            message: format!(
                "Found {} {} where {}",
                count, schema.subject, schema.failure_phrase
            ),
        })
    }

    fn high_variance(&self, summaries: &[GroupSummary]) -> Option<Finding> {
        let groups: Vec<String> = summaries
            .iter()
            .filter(|s| s.timing.cov > self.cov_threshold)
            .map(|s| s.group.clone())
            .collect();
        (!groups.is_empty()).then(|| Finding {
            kind: FindingKind::HighVariance,
            count: groups.len(),
            message: format!(
                "High variance (CoV > {}%): {}",
                format_sigma(self.cov_threshold),
                groups.join(", ")
            ),
            groups,
        })
    }
}

/// Render a threshold without a trailing `.0` for whole numbers
fn format_sigma(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::dataset::{Observation, Schema};

    fn obs(group: &str, timing: f64, found: Option<bool>) -> Observation {
        Observation {
            group: group.to_string(),
            timing,
            covariates: vec![None; 5],
            outcome: found,
            bucket: None,
            id: None,
        }
    }

    fn detect(observations: Vec<Observation>) -> Vec<Finding> {
        let dataset = Dataset::new(Schema::pathfinding(), observations);
        let summaries = Aggregator::new().summarize(&dataset);
        AnomalyDetector::default().detect(&dataset, &summaries)
    }

    #[test]
    fn test_clean_data_has_no_findings() {
        let findings = detect(vec![
            obs("A", 10.0, Some(true)),
            obs("A", 10.5, Some(true)),
            obs("A", 11.0, Some(true)),
        ]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_zero_timing_flagged() {
        let findings = detect(vec![obs("A", 0.0, Some(true)), obs("A", 1.0, Some(true))]);
        let zero = findings
            .iter()
            .find(|f| f.kind == FindingKind::ZeroTiming)
            .unwrap();
        assert_eq!(zero.count, 1);
        assert_eq!(zero.message, "Found 1 queries with zero runtime");
    }

    #[test]
    fn test_outlier_beyond_three_sigma() {
        let mut observations: Vec<Observation> =
            (0..30).map(|_| obs("A", 10.0, Some(true))).collect();
        observations.push(obs("A", 1000.0, Some(true)));
        let findings = detect(observations);

        let outliers = findings
            .iter()
            .find(|f| f.kind == FindingKind::Outliers)
            .unwrap();
        assert_eq!(outliers.count, 1);
        assert_eq!(outliers.message, "A: 1 outliers (>3σ)");
    }

    #[test]
    fn test_constant_group_has_no_outliers() {
        let findings = detect((0..5).map(|_| obs("A", 2.0, Some(true))).collect());
        assert!(findings.iter().all(|f| f.kind != FindingKind::Outliers));
    }

    #[test]
    fn test_failed_outcomes_counted() {
        let findings = detect(vec![
            obs("A", 1.0, Some(false)),
            obs("A", 1.0, Some(false)),
            obs("B", 1.0, None),
        ]);
        let failed = findings
            .iter()
            .find(|f| f.kind == FindingKind::FailedOutcome)
            .unwrap();
        assert_eq!(failed.count, 2);
        assert_eq!(failed.message, "Found 2 queries where path was not found");
    }

    #[test]
    fn test_high_variance_groups_listed() {
        let findings = detect(vec![
            obs("Stable", 10.0, Some(true)),
            obs("Stable", 10.1, Some(true)),
            obs("Noisy", 1.0, Some(true)),
            obs("Noisy", 50.0, Some(true)),
        ]);
        let high = findings
            .iter()
            .find(|f| f.kind == FindingKind::HighVariance)
            .unwrap();
        assert_eq!(high.groups, vec!["Noisy".to_string()]);
        assert_eq!(high.message, "High variance (CoV > 30%): Noisy");
    }

    #[test]
    fn test_findings_do_not_change_summaries() {
        let dataset = Dataset::new(
            Schema::pathfinding(),
            vec![obs("A", 1.0, Some(false)), obs("A", 90.0, Some(true))],
        );
        let summaries = Aggregator::new().summarize(&dataset);
        let before = summaries.clone();
        let _ = AnomalyDetector::new(5.0, 10.0).detect(&dataset, &summaries);
        assert_eq!(summaries, before);
    }

    #[test]
    fn test_format_sigma() {
        assert_eq!(format_sigma(3.0), "3");
        assert_eq!(format_sigma(2.5), "2.5");
    }
}
