//! Pearson correlation between timing and covariates
//!
//! NaN means "undefined" (zero variance or fewer than two complete pairs)
//! and must never be read as zero.

use crate::dataset::{Dataset, Observation};
use crate::stats;
use serde::Serialize;
use std::fmt;

/// Pearson correlation coefficient of two equal-length series
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    if stats::is_constant(xs) || stats::is_constant(ys) {
        return f64::NAN;
    }

    let mean_x = stats::mean(xs);
    let mean_y = stats::mean(ys);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Qualitative strength of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
    Undefined,
}

impl Strength {
    pub fn from_coefficient(r: f64) -> Self {
        if r.is_nan() {
            Strength::Undefined
        } else if r.abs() > 0.7 {
            Strength::Strong
        } else if r.abs() > 0.4 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
            Strength::Undefined => "undefined",
        };
        f.write_str(label)
    }
}

/// Correlation of timing against one covariate across the whole dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    /// Report key, e.g. `memory_vs_runtime`
    pub name: String,
    pub covariate: String,
    pub coefficient: f64,
    pub pairs: usize,
}

/// Correlation of timing against a covariate within one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCorrelation {
    pub group: String,
    pub covariate: String,
    pub coefficient: f64,
    pub pairs: usize,
}

impl GroupCorrelation {
    pub fn strength(&self) -> Strength {
        Strength::from_coefficient(self.coefficient)
    }
}

/// (covariate, timing) pairs where both values are present
fn complete_pairs<'a, I>(observations: I, covariate_idx: usize) -> (Vec<f64>, Vec<f64>)
where
    I: IntoIterator<Item = &'a Observation>,
{
    observations
        .into_iter()
        .filter_map(|o| o.covariate(covariate_idx).map(|c| (c, o.timing)))
        .unzip()
}

/// Correlate timing with each `(covariate, name)` over all observations
///
/// Covariates unknown to the schema yield NaN with zero pairs.
pub fn global_correlations(dataset: &Dataset, covariates: &[(&str, &str)]) -> Vec<Correlation> {
    covariates
        .iter()
        .map(|(covariate, name)| {
            let (xs, ys) = match dataset.schema().covariate_index(covariate) {
                Some(idx) => complete_pairs(dataset.observations(), idx),
                None => (Vec::new(), Vec::new()),
            };
            Correlation {
                name: name.to_string(),
                covariate: covariate.to_string(),
                coefficient: pearson(&xs, &ys),
                pairs: xs.len(),
            }
        })
        .collect()
}

/// Correlate timing with one covariate separately inside each group
///
/// Groups come in first-appearance order.
pub fn per_group_correlations(dataset: &Dataset, covariate: &str) -> Vec<GroupCorrelation> {
    let idx = dataset.schema().covariate_index(covariate);
    dataset
        .groups()
        .into_iter()
        .map(|group| {
            let (xs, ys) = match idx {
                Some(idx) => complete_pairs(dataset.group(group), idx),
                None => (Vec::new(), Vec::new()),
            };
            GroupCorrelation {
                group: group.to_string(),
                covariate: covariate.to_string(),
                coefficient: pearson(&xs, &ys),
                pairs: xs.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Schema;

    fn obs(group: &str, timing: f64, degree: Option<f64>) -> Observation {
        Observation {
            group: group.to_string(),
            timing,
            covariates: vec![None, degree],
            outcome: None,
            bucket: None,
            id: None,
        }
    }

    #[test]
    fn test_perfect_positive_and_negative() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_is_nan() {
        assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_nan());
        assert!(pearson(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_too_few_pairs_is_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[], &[]).is_nan());
    }

    #[test]
    fn test_known_coefficient() {
        // r for (1,2),(2,1),(3,4),(4,3) = 0.6
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]);
        assert!((r - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_strength_labels() {
        assert_eq!(Strength::from_coefficient(0.95), Strength::Strong);
        assert_eq!(Strength::from_coefficient(-0.5), Strength::Moderate);
        assert_eq!(Strength::from_coefficient(0.4), Strength::Weak);
        assert_eq!(Strength::from_coefficient(f64::NAN), Strength::Undefined);
        assert_eq!(Strength::Strong.to_string(), "strong");
    }

    #[test]
    fn test_per_group_skips_missing_pairs() {
        let dataset = Dataset::new(
            Schema::iteration(),
            vec![
                obs("A", 10.0, Some(1.0)),
                obs("A", 20.0, Some(2.0)),
                obs("A", 999.0, None),
                obs("A", 30.0, Some(3.0)),
                obs("B", 7.0, Some(1.0)),
                obs("B", 7.0, Some(9.0)),
            ],
        );
        let correlations = per_group_correlations(&dataset, "degree");
        assert_eq!(correlations.len(), 2);
        assert_eq!(correlations[0].pairs, 3);
        assert!((correlations[0].coefficient - 1.0).abs() < 1e-12);
        assert!(correlations[1].coefficient.is_nan());
        assert_eq!(correlations[1].strength(), Strength::Undefined);
    }

    #[test]
    fn test_global_unknown_covariate() {
        let dataset = Dataset::new(Schema::iteration(), vec![obs("A", 1.0, Some(1.0))]);
        let correlations = global_correlations(&dataset, &[("memory_used_bytes", "memory")]);
        assert_eq!(correlations[0].pairs, 0);
        assert!(correlations[0].coefficient.is_nan());
    }
}
