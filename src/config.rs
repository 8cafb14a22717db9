//! Analysis configuration
//!
//! Thresholds and report settings, optionally loaded from a TOML file.
//! Each pipeline keeps its own outlier threshold: pathfinding flags rows
//! beyond 3σ, iteration filters rows beyond 5σ before analysis.
//!
//! # Example TOML
//! ```toml
//! [pathfinding]
//! outlier_sigma = 3.0
//! cov_threshold = 30.0
//! baseline = "AdjacencyListGraph"
//! comparisons = ["CSRGraph", "OffsetArrayGraph"]
//!
//! [iteration]
//! outlier_sigma = 5.0
//! filter_outliers = true
//! ```

use crate::error::AnalysisError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for the pathfinding benchmark pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Rows above `group mean + outlier_sigma * std` are reported as outliers
    pub outlier_sigma: f64,
    /// Groups with a coefficient of variation above this percentage are flagged
    pub cov_threshold: f64,
    /// Rows in the fastest/slowest ranking tables
    pub top_n: usize,
    /// Reference implementation for speedup comparisons
    pub baseline: String,
    /// Groups compared against the baseline
    pub comparisons: Vec<String>,
    /// Groups whose overall rank is reported
    pub rank_probes: Vec<String>,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            outlier_sigma: 3.0,
            cov_threshold: 30.0,
            top_n: 5,
            baseline: "AdjacencyListGraph".to_string(),
            comparisons: vec!["CSRGraph".to_string(), "OffsetArrayGraph".to_string()],
            rank_probes: vec!["MatrixGraph".to_string()],
        }
    }
}

/// Settings for the neighbor iteration pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationConfig {
    /// Extreme-outlier threshold in standard deviations above the group mean
    pub outlier_sigma: f64,
    /// Remove extreme outliers while loading instead of only reporting them
    pub filter_outliers: bool,
    pub cov_threshold: f64,
    pub top_n: usize,
    pub baseline: String,
    /// Bucket labels in report order
    pub categories: Vec<String>,
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            outlier_sigma: 5.0,
            filter_outliers: true,
            cov_threshold: 30.0,
            top_n: 5,
            baseline: "AdjacencyListGraph".to_string(),
            categories: vec![
                "sparse".to_string(),
                "medium".to_string(),
                "dense".to_string(),
            ],
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pathfinding: PathfindingConfig,
    pub iteration: IterationConfig,
}

impl AnalysisConfig {
    /// Load configuration from a TOML file; missing keys take defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate().map_err(AnalysisError::Config)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let checks = [
            ("pathfinding.outlier_sigma", self.pathfinding.outlier_sigma),
            ("pathfinding.cov_threshold", self.pathfinding.cov_threshold),
            ("iteration.outlier_sigma", self.iteration.outlier_sigma),
            ("iteration.cov_threshold", self.iteration.cov_threshold),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be non-negative, got {}", name, value));
            }
        }

        if self.pathfinding.top_n == 0 {
            return Err("pathfinding.top_n must be >= 1".to_string());
        }
        if self.iteration.top_n == 0 {
            return Err("iteration.top_n must be >= 1".to_string());
        }
        if self.iteration.categories.is_empty() {
            return Err("iteration.categories must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.pathfinding.outlier_sigma, 3.0);
        assert_eq!(config.iteration.outlier_sigma, 5.0);
        assert_eq!(config.pathfinding.cov_threshold, 30.0);
        assert_eq!(config.pathfinding.baseline, "AdjacencyListGraph");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [pathfinding]
            outlier_sigma = 4.0
            comparisons = ["HashMapGraph"]
            "#,
        )
        .unwrap();
        assert_eq!(config.pathfinding.outlier_sigma, 4.0);
        assert_eq!(config.pathfinding.comparisons, vec!["HashMapGraph"]);
        assert_eq!(config.pathfinding.top_n, 5);
        assert_eq!(config.iteration, IterationConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = AnalysisConfig::from_toml_str("[iteration]\noutlier_sigma = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("iteration.outlier_sigma"));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let mut config = AnalysisConfig::default();
        config.pathfinding.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_syntax() {
        assert!(AnalysisConfig::from_toml_str("[pathfinding\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[iteration]\nfilter_outliers = false").unwrap();
        let config = AnalysisConfig::from_toml_file(file.path()).unwrap();
        assert!(!config.iteration.filter_outliers);
    }

    #[test]
    fn test_missing_file() {
        let err = AnalysisConfig::from_toml_file("/nonexistent/dijkstat.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
