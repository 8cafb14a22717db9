//! Descriptive statistics over timing samples
//!
//! All functions work on `f64` so summaries match the upstream harness
//! output digit-for-digit. Standard deviation is the sample (n-1) estimator
//! everywhere in the crate.

use serde::Serialize;
use std::cmp::Ordering;

/// Descriptive statistics for one group's timing samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64, // P50
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
    /// Coefficient of variation (std/mean as percentage)
    pub cov: f64,
}

impl TimingStats {
    /// Compute statistics for a sample. Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mean = mean(values);
        let std = sample_std(values);

        Some(Self {
            count: values.len(),
            mean,
            median: percentile(&sorted, 50.0),
            std,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
            cov: coefficient_of_variation(std, mean),
        })
    }
}

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the present values, skipping missing ones; NaN if none are present
pub fn mean_present<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    mean(&present)
}

/// Sample standard deviation (n-1 denominator)
///
/// Fewer than two samples, or a constant sample, yields exactly 0.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 || is_constant(values) {
        return 0.0;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Median of an unsorted sample; NaN for an empty slice
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    percentile(&sorted, 50.0)
}

/// Calculate percentile from sorted data using linear interpolation
/// between the two closest ranks.
pub fn percentile(sorted_data: &[f64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }
    if sorted_data.len() == 1 {
        return sorted_data[0];
    }

    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let (low, high) = (sorted_data[lower], sorted_data[upper]);
        let weight = index - lower as f64;
        (low + (high - low) * weight).clamp(low, high)
    }
}

/// Standard deviation as a percentage of the mean; 0 when the mean is not positive
pub fn coefficient_of_variation(std: f64, mean: f64) -> f64 {
    if mean > 0.0 {
        std / mean * 100.0
    } else {
        0.0
    }
}

/// Division that yields 0 when the denominator is not positive (or NaN)
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// True when every value equals the first one
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}
