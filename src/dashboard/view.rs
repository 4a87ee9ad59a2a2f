//! Dashboard view model.
//!
//! `render_view` maps the current group selection to everything the page
//! shows. It does not touch the HTTP layer, so any front end can drive it.

use serde::Serialize;

use crate::analytics::{ConversionSummary, GroupStats, TestResult};
use crate::chart::{Bar, BarChart};
use crate::config::Config;
use crate::dataset::{Dataset, GroupLabel};
use crate::Error;

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one group.";
/// Upper bound of the dashboard chart's y axis, in percent.
pub const DASHBOARD_Y_MAX: f64 = 100.0;

/// Fixed inputs of every dashboard render.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub control: GroupLabel,
    pub variant: GroupLabel,
    pub summary: ConversionSummary,
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            control: config.control.clone(),
            variant: config.variant.clone(),
            summary: ConversionSummary::new(config.alpha)?,
        })
    }
}

/// User count of one configured arm (zero when filtered out).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmCount {
    pub group: GroupLabel,
    pub users: u64,
}

/// Significance panel state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestPanel {
    /// The z-test ran.
    Ran {
        result: TestResult,
        conclusion: String,
    },
    /// The selection does not contain both arms.
    Skipped { reason: String },
    /// Both arms were selected but the data cannot support the test.
    Unavailable { reason: String },
}

impl TestPanel {
    pub fn result(&self) -> Option<&TestResult> {
        match self {
            TestPanel::Ran { result, .. } => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Vec<GroupLabel>,
    pub message: Option<String>,
    pub total_users: u64,
    pub arms: Vec<ArmCount>,
    pub rates: Vec<GroupStats>,
    pub test: TestPanel,
    pub chart_svg: Option<String>,
}

impl DashboardView {
    fn empty(selection: &[GroupLabel]) -> Self {
        Self {
            selection: selection.to_vec(),
            message: Some(EMPTY_SELECTION_MESSAGE.to_string()),
            total_users: 0,
            arms: Vec::new(),
            rates: Vec::new(),
            test: TestPanel::Skipped {
                reason: EMPTY_SELECTION_MESSAGE.to_string(),
            },
            chart_svg: None,
        }
    }
}

/// Compute the view for `selection` over the shared dataset.
pub fn render_view(
    dataset: &Dataset,
    selection: &[GroupLabel],
    settings: &DashboardSettings,
) -> DashboardView {
    if selection.is_empty() {
        return DashboardView::empty(selection);
    }

    let summary = &settings.summary;
    let filtered = dataset.filter(selection);
    let stats = summary.group_stats(filtered.observations());

    let arms = [&settings.control, &settings.variant]
        .into_iter()
        .map(|group| ArmCount {
            group: group.clone(),
            users: stats.get(group).map(|s| s.count).unwrap_or(0),
        })
        .collect();

    let both_present = stats.contains_key(&settings.control) && stats.contains_key(&settings.variant);
    let test = if both_present {
        match summary.significance_test(
            filtered.observations(),
            (&settings.control, &settings.variant),
        ) {
            Ok(result) => {
                crate::metrics::record_significance_test(result.significant);
                TestPanel::Ran {
                    conclusion: result.verdict().label().to_string(),
                    result,
                }
            }
            Err(Error::InsufficientData(reason)) | Err(Error::InvalidArgument(reason)) => {
                TestPanel::Unavailable { reason }
            }
            Err(other) => TestPanel::Unavailable {
                reason: other.to_string(),
            },
        }
    } else {
        TestPanel::Skipped {
            reason: format!(
                "Z-test only runs when both Group {} and {} are selected.",
                settings.control, settings.variant
            ),
        }
    };

    let rates: Vec<GroupStats> = stats.into_values().collect();
    let chart = BarChart::new("Conversion Rate by Group", DASHBOARD_Y_MAX)
        .with_y_label("Conversion Rate (%)")
        .with_bars(rates.iter().map(|g| Bar::new(g.group.as_str(), g.rate)));

    DashboardView {
        selection: selection.to_vec(),
        message: None,
        total_users: filtered.len() as u64,
        arms,
        rates,
        test,
        chart_svg: Some(chart.render_svg()),
    }
}
