//! Generate the A/B test report files.

use tracing::info;

use crate::analytics::ConversionSummary;
use crate::config::{Config, PdfExport};
use crate::error::Result;
use crate::report::{self, ReportArtifacts, ReportOptions};

/// Run the report shell. `pdf` is the capability resolved at startup.
pub async fn run(config: &Config, pdf: PdfExport) -> Result<ReportArtifacts> {
    let dataset = super::load_dataset(config)?;
    let summary = ConversionSummary::new(config.alpha)?;
    let options = ReportOptions::from_config(config, pdf);

    let source = config.data_path.display().to_string();
    let (report, artifacts) = report::generate(&dataset, &summary, &source, &options).await?;

    println!("{}", report.render_text());
    println!();
    println!("Chart saved to: {}", artifacts.chart.display());
    println!("Report saved to: {}", artifacts.markdown.display());
    println!("Summary saved to: {}", artifacts.json.display());
    match &artifacts.pdf {
        Some(path) => println!("PDF report saved to: {}", path.display()),
        None => println!("PDF report not generated."),
    }

    info!(
        users = report.total_users,
        significant = report.test.as_ref().map(|t| t.significant),
        "Report finished"
    );
    Ok(artifacts)
}
