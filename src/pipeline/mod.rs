//! End-to-end analysis runs: load, aggregate, detect, correlate, report
//!
//! Both pipelines share the same shape. `analyze` is pure and returns a
//! serializable analysis; `run` adds file output and the console summary.

pub mod iteration;
pub mod pathfinding;

use crate::cli::OutputFormat;
use crate::csv_output;
use crate::error::Result;
use crate::loader::LoadReport;
use crate::report::TableRow;
use crate::svg_chart::BarChart;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where to read from, where to write to, and how to talk to the user
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub charts: bool,
}

/// Stage messages: printed in text mode, always logged
pub(crate) struct Progress {
    echo: bool,
}

impl Progress {
    pub(crate) fn new(format: OutputFormat) -> Self {
        Self {
            echo: format == OutputFormat::Text,
        }
    }

    pub(crate) fn step(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{}", message.trim());
        if self.echo {
            println!("{}", message);
        }
    }

    pub(crate) fn banner(&self, title: &str) {
        if self.echo {
            println!("{}", "=".repeat(60));
            println!("{}", title);
            println!("{}", "=".repeat(60));
        }
    }

    pub(crate) fn load_report(&self, report: &LoadReport, timing_label: &str) {
        self.step(format!("Original rows: {}", report.original_rows));
        if report.removed_nonpositive > 0 {
            self.step(format!(
                "Removed {} rows with zero/negative {}",
                report.removed_nonpositive, timing_label
            ));
        }
        if report.removed_missing > 0 {
            self.step(format!(
                "Removed {} rows with missing required fields",
                report.removed_missing
            ));
        }
        if report.removed_malformed > 0 {
            self.step(format!("Removed {} malformed rows", report.removed_malformed));
        }
        if report.removed_outliers > 0 {
            self.step(format!("Removed {} extreme outliers", report.removed_outliers));
        }
        self.step(format!("Cleaned rows: {}", report.cleaned_rows));
    }
}

/// Write one summary table as CSV into the output directory
pub(crate) fn write_table<R: TableRow>(
    output_dir: &Path,
    file_name: &str,
    rows: &[R],
    progress: &Progress,
) -> Result<()> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    csv_output::write_csv_file(&path, rows)?;
    progress.step(format!("Table saved to {}", path.display()));
    Ok(())
}

/// Write charts (skipping empty ones) and the markdown report
pub(crate) fn write_report(
    output_dir: &Path,
    report: &str,
    charts: &[(&'static str, BarChart)],
    progress: &Progress,
) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    if !charts.is_empty() {
        progress.step("\nCreating visualizations...");
        let mut written = 0;
        for (file_name, chart) in charts {
            if chart.is_empty() {
                debug!(chart = *file_name, "skipping empty chart");
                continue;
            }
            fs::write(output_dir.join(file_name), chart.to_svg())?;
            written += 1;
        }
        progress.step(format!(
            "{} visualizations saved to {}",
            written,
            output_dir.display()
        ));
    }

    progress.step("\nGenerating report...");
    let report_path = output_dir.join("analysis_report.md");
    fs::write(&report_path, report)?;
    progress.step(format!("Report saved to {}", report_path.display()));

    Ok(())
}
