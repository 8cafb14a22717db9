//! CLI argument parsing for dijkstat

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the console summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text summary (default)
    Text,
    /// Complete analysis as JSON on stdout
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dijkstat")]
#[command(version)]
#[command(about = "Statistical analysis of Dijkstra graph benchmark results", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Analysis configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for the console summary
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Skip SVG chart generation
    #[arg(long = "no-charts", global = true)]
    pub no_charts: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze pathfinding benchmark results (benchmark.csv)
    Pathfinding(PathArgs),
    /// Analyze neighbor iteration results (iteration.csv)
    Iteration(PathArgs),
}

/// Input and output locations
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Benchmark CSV to analyze
    #[arg(short = 'i', long = "input", value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Directory for the summary CSV, charts and markdown report
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Default harness layout for experiment 1
pub const PATHFINDING_INPUT: &str =
    "out/experiments/experiment1_pathfinding_benchmark/benchmark.csv";
pub const PATHFINDING_OUTPUT: &str = "out/experiments/experiment1_pathfinding_benchmark/analysis";

/// Default harness layout for experiment 3
pub const ITERATION_INPUT: &str = "out/experiments/experiment3_neighbor_iteration/iteration.csv";
pub const ITERATION_OUTPUT: &str = "out/experiments/experiment3_neighbor_iteration/analysis";

impl Command {
    /// Input path, falling back to the harness default
    pub fn input(&self) -> PathBuf {
        match self {
            Command::Pathfinding(args) => {
                args.input.clone().unwrap_or_else(|| PATHFINDING_INPUT.into())
            }
            Command::Iteration(args) => {
                args.input.clone().unwrap_or_else(|| ITERATION_INPUT.into())
            }
        }
    }

    /// Output directory, falling back to the harness default
    pub fn output_dir(&self) -> PathBuf {
        match self {
            Command::Pathfinding(args) => args
                .output_dir
                .clone()
                .unwrap_or_else(|| PATHFINDING_OUTPUT.into()),
            Command::Iteration(args) => args
                .output_dir
                .clone()
                .unwrap_or_else(|| ITERATION_OUTPUT.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_pathfinding() {
        let cli = Cli::parse_from(["dijkstat", "pathfinding", "--input", "bench.csv"]);
        assert!(matches!(cli.command, Command::Pathfinding(_)));
        assert_eq!(cli.command.input(), PathBuf::from("bench.csv"));
        assert_eq!(cli.command.output_dir(), PathBuf::from(PATHFINDING_OUTPUT));
    }

    #[test]
    fn test_cli_iteration_defaults() {
        let cli = Cli::parse_from(["dijkstat", "iteration"]);
        assert_eq!(cli.command.input(), PathBuf::from(ITERATION_INPUT));
        assert_eq!(cli.command.output_dir(), PathBuf::from(ITERATION_OUTPUT));
    }

    #[test]
    fn test_cli_format_default_text() {
        let cli = Cli::parse_from(["dijkstat", "pathfinding"]);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.no_charts);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "dijkstat",
            "iteration",
            "-o",
            "analysis",
            "--format",
            "json",
            "--no-charts",
            "--config",
            "dijkstat.toml",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_charts);
        assert_eq!(cli.config, Some(PathBuf::from("dijkstat.toml")));
        assert_eq!(cli.command.output_dir(), PathBuf::from("analysis"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["dijkstat"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["dijkstat", "pathfinding", "--format", "xml"]).is_err());
    }
}
