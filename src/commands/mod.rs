//! Command implementations
//!
//! Each module corresponds to a subcommand in the CLI.

pub mod dashboard;
pub mod report;
pub mod simulate;
pub mod summary;

use std::sync::Arc;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::Result;

/// Load the configured dataset once, for sharing across computations.
pub fn load_dataset(config: &Config) -> Result<Arc<Dataset>> {
    let dataset = Dataset::load_csv(&config.data_path, &config.columns)?;
    Ok(Arc::new(dataset))
}

// Re-export commonly used types
pub use dashboard::run as dashboard_run;
pub use report::run as report_run;
pub use simulate::{run as simulate_run, SimulateArgs};
pub use summary::{run as summary_run, OutputFormat};
