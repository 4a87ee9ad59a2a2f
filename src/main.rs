//! A/B analyzer CLI - main entry point
//!
//! Unified interface for the summary, report, dashboard and simulate commands.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use abtest_analyzer::commands::{self, OutputFormat, SimulateArgs};
use abtest_analyzer::{metrics, Config};
use tracing::warn;

#[derive(Parser)]
#[command(name = "abtest_analyzer")]
#[command(about = "A/B test conversion report & dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./abtest.yml when present)
    #[arg(long, global = true, env = "ABTEST_CONFIG")]
    config: Option<PathBuf>,

    /// Input CSV file, overrides the configured path
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Significance threshold, overrides the configured alpha
    #[arg(long, global = true)]
    alpha: Option<f64>,

    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print group sizes, conversion rates and the z-test
    Summary {
        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write chart, Markdown/JSON report and (if possible) PDF
    Report {
        /// Report directory
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Chart directory
        #[arg(long)]
        plots_dir: Option<PathBuf>,

        /// Skip PDF conversion even if a converter is installed
        #[arg(long, default_value_t = false)]
        no_pdf: bool,
    },

    /// Serve the interactive dashboard
    Dashboard {
        /// Listen address (e.g., 127.0.0.1:8050)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Generate a synthetic dataset
    Simulate {
        /// Output CSV (defaults to the configured data path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Users per group
        #[arg(long, default_value = "5000")]
        users: u64,

        /// True conversion rate of the control group (0..1)
        #[arg(long, default_value = "0.12")]
        control_rate: f64,

        /// True conversion rate of the variant group (0..1)
        #[arg(long, default_value = "0.14")]
        variant_rate: f64,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Summary { .. } => "summary",
            Commands::Report { .. } => "report",
            Commands::Dashboard { .. } => "dashboard",
            Commands::Simulate { .. } => "simulate",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("abtest_analyzer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    if let Some(alpha) = cli.alpha {
        config.alpha = alpha;
    }

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let command_name = cli.command.name();
    metrics::record_command_start(command_name);
    let start = Instant::now();

    let result = execute_command(cli.command, config).await;

    metrics::record_command_result(command_name, start.elapsed(), result.is_ok());

    result
}

async fn execute_command(command: Commands, mut config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Summary { format } => {
            let format: OutputFormat = format.parse()?;
            commands::summary::run(&config, format)?;
        }
        Commands::Report {
            report_dir,
            plots_dir,
            no_pdf,
        } => {
            if let Some(dir) = report_dir {
                config.report_dir = dir;
            }
            if let Some(dir) = plots_dir {
                config.plots_dir = dir;
            }
            let pdf = if no_pdf {
                abtest_analyzer::PdfExport::Disabled
            } else {
                config.pdf_export()
            };
            commands::report::run(&config, pdf).await?;
        }
        Commands::Dashboard { addr } => {
            commands::dashboard::run(&config, addr.as_deref()).await?;
        }
        Commands::Simulate {
            output,
            users,
            control_rate,
            variant_rate,
            seed,
        } => {
            commands::simulate::run(
                &config,
                SimulateArgs {
                    output,
                    users_per_group: users,
                    control_rate,
                    variant_rate,
                    seed,
                },
            )?;
        }
    }

    Ok(())
}
