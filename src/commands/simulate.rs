//! Write a synthetic dataset for trying out the report and dashboard.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::simulate::{write_csv, SimulationConfig};

/// Arguments of the simulate command.
#[derive(Debug, Clone)]
pub struct SimulateArgs {
    pub output: Option<PathBuf>,
    pub users_per_group: u64,
    pub control_rate: f64,
    pub variant_rate: f64,
    pub seed: Option<u64>,
}

pub fn run(config: &Config, args: SimulateArgs) -> Result<PathBuf> {
    let output = args.output.unwrap_or_else(|| config.data_path.clone());

    let mut sim = SimulationConfig::two_arm(
        config.control.clone(),
        config.variant.clone(),
        args.users_per_group,
        args.control_rate,
        args.variant_rate,
    );
    if let Some(seed) = args.seed {
        sim = sim.with_seed(seed);
    }

    let rows = write_csv(&sim, &output)?;
    println!("Wrote {} rows to {}", rows, output.display());
    Ok(output)
}
