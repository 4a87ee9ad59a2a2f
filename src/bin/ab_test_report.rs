//! A/B test report CLI.
//!
//! Usage:
//!   cargo run --bin ab_test_report -- --data data/ab_test_data.csv

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use abtest_analyzer::commands::report;
use abtest_analyzer::{Config, PdfExport};

#[derive(Parser, Debug)]
#[command(name = "ab_test_report")]
#[command(about = "Conversion report for a two-group A/B test")]
struct Args {
    /// Config file (defaults to ./abtest.yml when present)
    #[arg(long, env = "ABTEST_CONFIG")]
    config: Option<PathBuf>,

    /// Input CSV file
    #[arg(long, env = "ABTEST_DATA")]
    data: Option<PathBuf>,

    /// Output directory for the report
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Skip PDF conversion
    #[arg(long, default_value_t = false)]
    no_pdf: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("abtest_analyzer=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(data) = args.data {
        config.data_path = data;
    }
    if let Some(dir) = args.report_dir {
        config.report_dir = dir;
    }

    let pdf = if args.no_pdf {
        PdfExport::Disabled
    } else {
        config.pdf_export()
    };

    report::run(&config, pdf)
        .await
        .with_context(|| format!("report failed for {}", config.data_path.display()))?;
    Ok(())
}
