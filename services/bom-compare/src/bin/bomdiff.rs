use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use bomdiff_models::ComparisonOutcome;
use bomdiff_utils::{
    format_summary, format_table, init_logging, save_json, validate_model, validate_target_count, AppConfig,
    BatchComparator, BomLoader, ReportStyle,
};

#[derive(Parser)]
#[command(name = "bomdiff")]
#[command(about = "Compare a master BOM against one or more target BOMs")]
#[command(version)]
pub struct Cli {
    #[arg(long, short, value_name = "FILE", help = "Path to the master BOM")]
    master: PathBuf,
    #[arg(long = "target", short, value_name = "FILE", required = true, help = "Path to a target BOM (repeatable)")]
    targets: Vec<PathBuf>,
    #[arg(long, short, value_name = "PATH", help = "Where to write the JSON report")]
    output: Option<PathBuf>,
    #[arg(long, help = "Highlight table rows with ANSI colors")]
    color: bool,
    #[arg(long, short, help = "Quiet mode: only write the JSON report")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load_or_default();
    validate_model(&config).context("Invalid configuration")?;
    init_logging(&config.logging)?;

    validate_target_count(cli.targets.len(), config.comparison.max_targets as usize)?;

    let loader = Arc::new(BomLoader::new(config.aliases.clone()));
    let report = match BatchComparator::new()
        .load_and_run(loader, &cli.master, &cli.targets)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: could not load master BOM: {}", e);
            return Ok(ExitCode::from(1));
        }
    };

    if !cli.quiet {
        let style = if cli.color { ReportStyle::ansi() } else { config.report.style() };

        for comparison in &report.comparisons {
            println!("=== {} vs {} ===", report.master_source, comparison.target_source);
            match &comparison.outcome {
                ComparisonOutcome::Compared(diff) => {
                    println!("{}", format_summary(diff));
                    println!();
                    println!("{}", format_table(diff, &style));
                }
                ComparisonOutcome::Failed(failure) => {
                    println!("Failed [{}]: {}", failure.code, failure.message);
                }
            }
            println!();
        }
    }

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.comparison.output_path));
    save_json(&report, &output).with_context(|| format!("Failed to write report to {}", output.display()))?;

    if !cli.quiet {
        println!("Report written to {}", output.display());
    }

    Ok(ExitCode::SUCCESS)
}
