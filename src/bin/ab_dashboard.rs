//! Interactive A/B dashboard.
//!
//! Usage:
//!   cargo run --bin ab_dashboard -- --addr 127.0.0.1:8050

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use abtest_analyzer::commands::dashboard;
use abtest_analyzer::Config;

#[derive(Parser, Debug)]
#[command(name = "ab_dashboard")]
#[command(about = "Serve the A/B test dashboard")]
struct Args {
    /// Config file (defaults to ./abtest.yml when present)
    #[arg(long, env = "ABTEST_CONFIG")]
    config: Option<PathBuf>,

    /// Input CSV file
    #[arg(long, env = "ABTEST_DATA")]
    data: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "ABTEST_DASHBOARD_ADDR")]
    addr: Option<String>,
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

    dashboard::run(&config, args.addr.as_deref()).await
}
