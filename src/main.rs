use anyhow::{Context, Result};
use clap::Parser;
use dijkstat::cli::{Cli, Command};
use dijkstat::config::AnalysisConfig;
use dijkstat::pipeline::{self, RunOptions};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    match &cli.config {
        Some(path) => AnalysisConfig::from_toml_file(path),
        None => Ok(AnalysisConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    let options = RunOptions {
        input: cli.command.input(),
        output_dir: cli.command.output_dir(),
        format: cli.format,
        charts: !cli.no_charts,
    };
    tracing::debug!(?options, "starting analysis");

    match cli.command {
        Command::Pathfinding(_) => {
            pipeline::pathfinding::run(&options, &config.pathfinding)
                .context("Pathfinding analysis failed")?;
        }
        Command::Iteration(_) => {
            pipeline::iteration::run(&options, &config.iteration)
                .context("Iteration analysis failed")?;
        }
    }

    Ok(())
}
