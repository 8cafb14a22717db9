//! Dijkstat - statistical analysis of Dijkstra graph benchmark results
//!
//! This library loads benchmark CSVs produced by the graph benchmark
//! harness, aggregates timings per graph implementation, flags anomalies,
//! correlates timing with work performed, and renders CSV, markdown, SVG
//! and JSON reports.

pub mod aggregate;
pub mod anomaly;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod csv_output;
pub mod dataset;
pub mod error;
pub mod json_output;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod svg_chart;
