//! One-shot A/B test report.
//!
//! Computes the conversion summary once, then writes:
//! - `plots/conversion_rate_plot.svg`
//! - `report/ab_test_report.md` (text + chart)
//! - `report/ab_test_report.json`
//! - `report/ab_test_report.pdf` when a converter is available

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tracing::{info, warn};

use crate::analytics::{ConversionSummary, GroupStats, TestResult};
use crate::chart::{Bar, BarChart};
use crate::config::{Config, PdfExport};
use crate::dataset::{Dataset, GroupLabel};
use crate::metrics;
use crate::{Error, Result};

pub const CHART_FILE: &str = "conversion_rate_plot.svg";
pub const REPORT_STEM: &str = "ab_test_report";
/// Upper bound of the report chart's y axis, in percent.
pub const REPORT_Y_MAX: f64 = 20.0;

/// Everything the report shows.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub total_users: u64,
    pub overall_rate: f64,
    pub groups: Vec<GroupStats>,
    pub test: Option<TestResult>,
    pub test_note: Option<String>,
}

impl ReportSummary {
    /// Compute the summary over the whole dataset.
    pub fn compute(
        dataset: &Dataset,
        summary: &ConversionSummary,
        groups: (&GroupLabel, &GroupLabel),
        source: impl Into<String>,
    ) -> Result<Self> {
        let observations = dataset.observations();
        let overall_rate = summary.overall_rate(observations)?;
        let group_stats: Vec<GroupStats> =
            summary.group_stats(observations).into_values().collect();

        let (test, test_note) = match summary.significance_test(observations, groups) {
            Ok(result) => {
                metrics::record_significance_test(result.significant);
                (Some(result), None)
            }
            Err(Error::InsufficientData(reason)) => {
                warn!(%reason, "Significance test skipped");
                (None, Some(format!("Z-test not run: {}.", reason)))
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            generated_at: Utc::now(),
            source: source.into(),
            total_users: observations.len() as u64,
            overall_rate,
            groups: group_stats,
            test,
            test_note,
        })
    }

    /// Conclusion sentence for the report.
    pub fn conclusion(&self) -> String {
        match (&self.test, &self.test_note) {
            (Some(test), _) => test.verdict().to_string(),
            (None, Some(note)) => note.clone(),
            (None, None) => String::new(),
        }
    }

    /// Plain-text summary printed to the console.
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();
        lines.push("A/B TESTING ANALYSIS REPORT".to_string());
        lines.push(String::new());
        lines.push(format!("Total Users: {}", self.total_users));
        lines.push(String::new());
        lines.push("Group Size:".to_string());
        for g in &self.groups {
            lines.push(format!("{:<8} {:>8}", g.group.as_str(), g.count));
        }
        lines.push(String::new());
        lines.push(format!("Overall Conversion Rate: {:.2}%", self.overall_rate));
        lines.push(String::new());
        lines.push("Conversion Rate by Group:".to_string());
        for g in &self.groups {
            lines.push(format!("{:<8} {:>7.2}%", g.group.as_str(), g.rate));
        }
        lines.push(String::new());
        lines.push("Hypothesis Test Results:".to_string());
        match &self.test {
            Some(test) => {
                lines.push(format!("Z-statistic: {:.3}", test.z_statistic));
                lines.push(format!("P-value: {:.4}", test.p_value));
            }
            None => lines.push("Z-statistic: n/a".to_string()),
        }
        lines.push(String::new());
        lines.push("Conclusion:".to_string());
        lines.push(self.conclusion());
        lines.join("\n")
    }

    /// Markdown document linking the chart at `chart_link`.
    pub fn render_markdown(&self, chart_link: &str) -> String {
        let mut lines = Vec::new();

        lines.push("# A/B Testing Report".to_string());
        lines.push(String::new());
        lines.push(format!(
            "- Generated: {} UTC",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(format!("- Source: `{}`", self.source));
        lines.push(format!("- Total users: {}", self.total_users));
        lines.push(format!(
            "- Overall conversion rate: {:.2}%",
            self.overall_rate
        ));
        lines.push(String::new());

        lines.push("## Conversion by group".to_string());
        lines.push("| Group | Users | Conversions | Rate |".to_string());
        lines.push("| --- | --- | --- | --- |".to_string());
        for g in &self.groups {
            lines.push(format!(
                "| {} | {} | {} | {:.2}% |",
                g.group, g.count, g.conversions, g.rate
            ));
        }
        lines.push(String::new());

        lines.push("## Hypothesis test".to_string());
        match &self.test {
            Some(test) => {
                lines.push(format!(
                    "Two-proportion z-test, {} vs {} (alpha = {}):",
                    test.groups.0, test.groups.1, test.alpha
                ));
                lines.push(String::new());
                lines.push(format!("- Z-statistic: {:.3}", test.z_statistic));
                lines.push(format!("- P-value: {:.4}", test.p_value));
            }
            None => lines.push("Not run.".to_string()),
        }
        lines.push(String::new());
        lines.push("**Conclusion**".to_string());
        lines.push(String::new());
        lines.push(self.conclusion());
        lines.push(String::new());

        lines.push("## Conversion rate plot".to_string());
        lines.push(String::new());
        lines.push(format!("![Conversion Rate by Group]({})", chart_link));
        lines.push(String::new());

        lines.join("\n")
    }

    /// Bar chart of per-group rates on the report's fixed axis.
    pub fn chart(&self) -> BarChart {
        BarChart::new("Conversion Rate by Group", REPORT_Y_MAX)
            .with_y_label("Conversion Rate (%)")
            .with_bars(
                self.groups
                    .iter()
                    .map(|g| Bar::new(g.group.as_str(), g.rate)),
            )
    }
}

/// Output locations and capabilities for a report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub report_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub groups: (GroupLabel, GroupLabel),
    pub pdf: PdfExport,
}

impl ReportOptions {
    pub fn from_config(config: &Config, pdf: PdfExport) -> Self {
        Self {
            report_dir: config.report_dir.clone(),
            plots_dir: config.plots_dir.clone(),
            groups: (config.control.clone(), config.variant.clone()),
            pdf,
        }
    }
}

/// Files written by a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub chart: PathBuf,
    pub markdown: PathBuf,
    pub json: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Compute the summary and write every report artifact.
pub async fn generate(
    dataset: &Dataset,
    summary: &ConversionSummary,
    source: &str,
    options: &ReportOptions,
) -> Result<(ReportSummary, ReportArtifacts)> {
    let report = ReportSummary::compute(
        dataset,
        summary,
        (&options.groups.0, &options.groups.1),
        source,
    )?;

    fs::create_dir_all(&options.report_dir).await?;
    fs::create_dir_all(&options.plots_dir).await?;

    let chart_path = options.plots_dir.join(CHART_FILE);
    fs::write(&chart_path, report.chart().render_svg()).await?;
    info!(path = %chart_path.display(), "Saved chart");

    let markdown_path = options.report_dir.join(format!("{}.md", REPORT_STEM));
    let chart_link = relative_link(&options.report_dir, &chart_path);
    fs::write(&markdown_path, report.render_markdown(&chart_link)).await?;
    info!(path = %markdown_path.display(), "Saved report");

    let json_path = options.report_dir.join(format!("{}.json", REPORT_STEM));
    fs::write(&json_path, serde_json::to_string_pretty(&report)?).await?;

    let pdf = match &options.pdf {
        PdfExport::Available(converter) => {
            let pdf_path = options.report_dir.join(format!("{}.pdf", REPORT_STEM));
            match convert_to_pdf(converter, &markdown_path, &pdf_path, &options.report_dir).await
            {
                Ok(()) if pdf_path.is_file() => {
                    info!(path = %pdf_path.display(), "Saved PDF report");
                    Some(pdf_path)
                }
                Ok(()) => {
                    warn!(converter = %converter.display(), "PDF converter wrote no output");
                    None
                }
                Err(err) => {
                    warn!("PDF report not generated: {}", err);
                    None
                }
            }
        }
        PdfExport::Missing(converter) => {
            warn!(%converter, "PDF report not generated (converter not installed)");
            None
        }
        PdfExport::Disabled => None,
    };

    Ok((
        report,
        ReportArtifacts {
            chart: chart_path,
            markdown: markdown_path,
            json: json_path,
            pdf,
        },
    ))
}

/// Run a pandoc-compatible converter: `<converter> <input> -o <output>`.
async fn convert_to_pdf(
    converter: &Path,
    input: &Path,
    output: &Path,
    resource_dir: &Path,
) -> Result<()> {
    let status = Command::new(converter)
        .arg(input)
        .arg("-o")
        .arg(output)
        .arg(format!("--resource-path={}", resource_dir.display()))
        .status()
        .await
        .map_err(|e| {
            Error::ExportError(format!("failed to run {}: {}", converter.display(), e))
        })?;

    if !status.success() {
        return Err(Error::ExportError(format!(
            "{} exited with {}",
            converter.display(),
            status
        )));
    }
    Ok(())
}

/// Link to `target` as seen from a document in `from_dir`.
///
/// Relative paths are taken from the current working directory.
pub fn relative_link(from_dir: &Path, target: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => relative_link_from(&cwd, from_dir, target),
        Err(err) => {
            warn!("Cannot resolve working directory for chart link: {}", err);
            target.display().to_string().replace('\\', "/")
        }
    }
}

/// `relative_link` with relative paths resolved against `base`.
pub fn relative_link_from(base: &Path, from_dir: &Path, target: &Path) -> String {
    let from_abs = base.join(from_dir);
    let to_abs = base.join(target);
    let from = normalize(&from_abs);
    let to = normalize(&to_abs);

    // Different roots (e.g. drive letters) have no relative path.
    if from.first() != to.first() {
        return target.display().to_string().replace('\\', "/");
    }

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for c in &to[common..] {
        parts.push(c.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

/// Lexically resolve `.` and `..` in an absolute path.
fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}
