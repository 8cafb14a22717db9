//! JSON output format for analysis results
//!
//! `--format json` prints one document to stdout in place of the text
//! summary. NaN statistics serialize as `null`.

use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Envelope around a pipeline's analysis
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a, T: Serialize> {
    /// Format version identifier
    pub version: &'static str,
    /// Format name
    pub format: &'static str,
    /// Pipeline that produced the analysis
    pub pipeline: &'static str,
    /// CSV file that was analyzed
    pub input: String,
    pub analysis: &'a T,
}

impl<'a, T: Serialize> JsonOutput<'a, T> {
    pub fn new(pipeline: &'static str, input: &Path, analysis: &'a T) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            format: "dijkstat-json-v1",
            pipeline,
            input: input.display().to_string(),
            analysis,
        }
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render an analysis as a pretty-printed JSON document
pub fn render<T: Serialize>(pipeline: &'static str, input: &Path, analysis: &T) -> Result<String> {
    JsonOutput::new(pipeline, input, analysis).to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        mean: f64,
        groups: Vec<&'static str>,
    }

    #[test]
    fn test_json_envelope() {
        let sample = Sample {
            mean: 1.5,
            groups: vec!["CSRGraph"],
        };
        let json = render("pathfinding", Path::new("bench.csv"), &sample).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["format"], "dijkstat-json-v1");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["pipeline"], "pathfinding");
        assert_eq!(value["input"], "bench.csv");
        assert_eq!(value["analysis"]["mean"], 1.5);
        assert_eq!(value["analysis"]["groups"][0], "CSRGraph");
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let sample = Sample {
            mean: f64::NAN,
            groups: Vec::new(),
        };
        let json = render("iteration", Path::new("iteration.csv"), &sample).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["analysis"]["mean"].is_null());
    }
}
