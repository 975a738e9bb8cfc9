//! # tally-cli
//!
//! Binary entry point for Tally.
//!
//! This crate provides:
//! - `tally generate`: resolve configuration, aggregate sample data and
//!   declared tests from a manifest, write the JSON report
//! - `tally summary`: print the summary of an existing report

mod display;
mod manifest;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{ReportConfig, ReportWriter, Tracker, read_report, sample};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Classified test execution reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a report and write it to the output directory
    Generate(GenerateArgs),

    /// Print the summary of a written report
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to a YAML configuration file
    #[arg(short, long, default_value = "tally.yml")]
    config: PathBuf,

    /// Output directory (overrides config and TALLY_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Report file name (overrides config and TALLY_REPORT_FILE)
    #[arg(long)]
    file_name: Option<String>,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// Include the built-in sample results
    #[arg(long)]
    sample_data: bool,

    /// Do not scan the manifest for declared tests
    #[arg(long)]
    no_scan: bool,

    /// YAML manifest of test classes to scan
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// Report file to read
    file: PathBuf,
}

impl GenerateArgs {
    fn resolve_config(&self) -> Result<ReportConfig> {
        let mut config = ReportConfig::load(Some(&self.config))
            .with_context(|| format!("Failed to load config {}", self.config.display()))?
            .with_env_overrides();

        if let Some(dir) = &self.output_dir {
            config.output_directory.clone_from(dir);
        }
        if let Some(name) = &self.file_name {
            config.report_file_name.clone_from(name);
        }
        if self.compact {
            config.pretty_print = false;
        }
        if self.sample_data {
            config.generate_sample_data = true;
        }
        if self.no_scan {
            config.scan_test_classes = false;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_filter = if verbose { "tally=debug" } else { "tally=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let tracker = Tracker::new();

    if config.generate_sample_data {
        sample::populate(tracker.aggregator());
    }

    if config.scan_test_classes {
        match &args.manifest {
            Some(path) => {
                info!("Scanning manifest {}", path.display());
                let classes = manifest::load(path)?;
                let found = manifest::scan(&classes, tracker.aggregator());
                info!("Found {} declared test method(s)", found);
            }
            None => warn!("Scanning enabled but no manifest given, nothing to scan"),
        }
    }

    let writer = ReportWriter::new(&config);
    let path = tracker
        .close(&writer)
        .with_context(|| format!("Failed to write report to {}", writer.report_path().display()))?;

    display::print_summary(&tracker.current_report());
    println!("\nReport written to: {}", path.display());
    Ok(())
}

fn summary(args: &SummaryArgs) -> Result<()> {
    let report = read_report(&args.file)
        .with_context(|| format!("Failed to read report {}", args.file.display()))?;
    display::print_summary(&report);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Summary(args) => summary(args),
    }
}
