//! Print the conversion summary to stdout.

use std::str::FromStr;

use crate::analytics::ConversionSummary;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::ReportSummary;

/// Output format of the summary command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::InvalidArgument(format!(
                "unknown output format '{}', expected text or json",
                other
            ))),
        }
    }
}

/// Compute the summary and render it in `format`.
pub fn render(config: &Config, format: OutputFormat) -> Result<String> {
    let dataset = super::load_dataset(config)?;
    let summary = ConversionSummary::new(config.alpha)?;
    let report = ReportSummary::compute(
        &dataset,
        &summary,
        config.test_groups(),
        config.data_path.display().to_string(),
    )?;

    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
    }
}

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    println!("{}", render(config, format)?);
    Ok(())
}
