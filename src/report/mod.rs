//! Report generation shared by both pipelines
//!
//! Rankings, baseline comparisons and flat table rows. Pipeline-specific
//! markdown, console output and charts live in the submodules.

pub mod iteration;
pub mod pathfinding;

use crate::aggregate::{cmp_nan_last, GroupSummary};
use crate::stats;
use serde::Serialize;
use std::fmt;

/// Metric used to rank groups (ascending = best first)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankMetric {
    MeanTiming,
    CovariateMean(&'static str),
}

impl RankMetric {
    pub fn value(&self, summary: &GroupSummary) -> f64 {
        match self {
            RankMetric::MeanTiming => summary.timing.mean,
            RankMetric::CovariateMean(name) => summary.covariate_mean(name),
        }
    }
}

/// Groups ordered by a metric, fastest first; ties keep the input order
pub fn rank_by(summaries: &[GroupSummary], metric: RankMetric) -> Vec<&GroupSummary> {
    let mut ranked: Vec<&GroupSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| cmp_nan_last(metric.value(a), metric.value(b)));
    ranked
}

/// 1-based rank of a group in a ranking
pub fn rank_of(ranked: &[&GroupSummary], group: &str) -> Option<usize> {
    ranked.iter().position(|s| s.group == group).map(|i| i + 1)
}

/// Group with the smallest value of `key`, first one wins on ties
pub fn min_by_key<'a, F>(summaries: &'a [GroupSummary], key: F) -> Option<&'a GroupSummary>
where
    F: Fn(&GroupSummary) -> f64,
{
    summaries
        .iter()
        .reduce(|best, s| if cmp_nan_last(key(s), key(best)).is_lt() { s } else { best })
}

/// Ratio of the baseline's metric to another group's metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineComparison {
    pub baseline: String,
    pub group: String,
    /// `baseline / group`; above 1 means `group` is faster, 0 when undefined
    pub speedup: f64,
}

impl BaselineComparison {
    /// False when either mean was zero or missing
    pub fn is_defined(&self) -> bool {
        self.speedup > 0.0
    }

    pub fn verdict(&self) -> &'static str {
        if !self.is_defined() {
            "undefined"
        } else if self.speedup > 1.0 {
            "faster"
        } else {
            "slower"
        }
    }
}

/// Compare a group against the baseline; `None` if either is absent
pub fn compare_to_baseline(
    summaries: &[GroupSummary],
    metric: RankMetric,
    baseline: &str,
    group: &str,
) -> Option<BaselineComparison> {
    let find = |name: &str| summaries.iter().find(|s| s.group == name);
    let base = find(baseline)?;
    let other = find(group)?;
    Some(BaselineComparison {
        baseline: baseline.to_string(),
        group: group.to_string(),
        speedup: stats::safe_ratio(metric.value(base), metric.value(other)),
    })
}

/// Overall rank of a named group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankProbe {
    pub group: String,
    pub rank: usize,
    pub total: usize,
}

/// One cell of a flat output table
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(String),
    Count(usize),
    Float(f64),
    Missing,
}

impl Field {
    /// Float that renders as missing when NaN
    pub fn float(value: f64) -> Self {
        if value.is_nan() {
            Field::Missing
        } else {
            Field::Float(value)
        }
    }

    /// CSV rendering: missing values are empty cells
    pub fn to_csv(&self) -> String {
        match self {
            Field::Missing => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Text(text) => f.write_str(text),
            Field::Count(count) => write!(f, "{}", count),
            Field::Float(value) => write!(f, "{}", value),
            Field::Missing => f.write_str("nan"),
        }
    }
}

/// A row that can be written to CSV and rendered as a markdown table
pub trait TableRow {
    fn headers(&self) -> Vec<String>;
    fn fields(&self) -> Vec<Field>;
}

/// Render rows as a markdown table with their own headers
pub fn markdown_table<R: TableRow>(rows: &[R]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let headers = first.headers();

    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}|\n", vec!["---"; headers.len()].join("|")));
    for row in rows {
        let cells: Vec<String> = row.fields().iter().map(|f| escape_cell(&f.to_string())).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

/// Escape pipe characters so a value cannot break a markdown table
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Convert `snake_case` keys to `Title Case` words
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a float with fixed decimals, `nan` for NaN
pub fn fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}
