//! Conversion summary and two-proportion z-test.
//!
//! Pure functions over a slice of observations:
//! - per-group counts and conversion rates
//! - overall conversion rate
//! - pooled two-proportion z-test between two named groups

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::dataset::{GroupLabel, Observation};
use crate::{Error, Result};

/// Default significance threshold.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Counts and conversion rate of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group: GroupLabel,
    pub count: u64,
    pub conversions: u64,
    /// Conversion rate in percent.
    pub rate: f64,
}

impl GroupStats {
    /// Build stats from raw counts. `conversions` must not exceed `count`.
    pub fn from_counts(group: GroupLabel, count: u64, conversions: u64) -> Result<Self> {
        if conversions > count {
            return Err(Error::InvalidArgument(format!(
                "group {}: {} conversions exceed {} observations",
                group, conversions, count
            )));
        }
        let rate = if count > 0 {
            conversions as f64 / count as f64 * 100.0
        } else {
            0.0
        };
        Ok(Self {
            group,
            count,
            conversions,
            rate,
        })
    }

    /// Conversion rate as a fraction in [0, 1].
    pub fn proportion(&self) -> f64 {
        self.rate / 100.0
    }
}

/// Outcome of a two-proportion z-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub groups: (GroupLabel, GroupLabel),
    pub z_statistic: f64,
    pub p_value: f64,
    pub alpha: f64,
    pub significant: bool,
}

impl TestResult {
    pub fn verdict(&self) -> Verdict {
        if self.significant {
            Verdict::Significant
        } else {
            Verdict::NotSignificant
        }
    }
}

/// Human-readable conclusion of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Significant,
    NotSignificant,
}

impl Verdict {
    /// Short label for dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Significant => "Statistically significant",
            Verdict::NotSignificant => "Not statistically significant",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Significant => f.write_str(
                "Statistically significant: the variant likely improves conversion.",
            ),
            Verdict::NotSignificant => f.write_str(
                "Not statistically significant: no strong evidence of a difference.",
            ),
        }
    }
}

/// Stateless summary calculator parameterised by the significance threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionSummary {
    alpha: f64,
}

impl Default for ConversionSummary {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl ConversionSummary {
    /// Create a summary with a custom threshold in the open interval (0, 1).
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::InvalidArgument(format!(
                "alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Per-group counts and rates. Groups without observations are absent.
    pub fn group_stats(&self, observations: &[Observation]) -> BTreeMap<GroupLabel, GroupStats> {
        let mut tallies: BTreeMap<&GroupLabel, (u64, u64)> = BTreeMap::new();
        for obs in observations {
            let entry = tallies.entry(&obs.group).or_default();
            entry.0 += 1;
            if obs.converted {
                entry.1 += 1;
            }
        }

        tallies
            .into_iter()
            .map(|(group, (count, conversions))| {
                let stats = GroupStats {
                    group: group.clone(),
                    count,
                    conversions,
                    rate: conversions as f64 / count as f64 * 100.0,
                };
                (group.clone(), stats)
            })
            .collect()
    }

    /// Mean of the converted flag across all observations, in percent.
    pub fn overall_rate(&self, observations: &[Observation]) -> Result<f64> {
        if observations.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let converted = observations.iter().filter(|o| o.converted).count();
        Ok(converted as f64 / observations.len() as f64 * 100.0)
    }

    /// Two-proportion z-test between groups `a` and `b`.
    ///
    /// Observations of any other group are ignored. The statistic is
    /// signed as `p_a - p_b`.
    pub fn significance_test(
        &self,
        observations: &[Observation],
        groups: (&GroupLabel, &GroupLabel),
    ) -> Result<TestResult> {
        let (a, b) = groups;
        if a == b {
            return Err(Error::InvalidArgument(format!(
                "significance test needs two distinct groups, got {} twice",
                a
            )));
        }

        let stats = self.group_stats(observations);
        let stats_a = stats.get(a).ok_or_else(|| missing_group(a))?;
        let stats_b = stats.get(b).ok_or_else(|| missing_group(b))?;

        self.z_test(stats_a, stats_b)
    }

    /// Pooled two-proportion z-test from precomputed counts.
    pub fn z_test(&self, a: &GroupStats, b: &GroupStats) -> Result<TestResult> {
        if a.count == 0 {
            return Err(missing_group(&a.group));
        }
        if b.count == 0 {
            return Err(missing_group(&b.group));
        }

        let (n_a, n_b) = (a.count as f64, b.count as f64);
        let (x_a, x_b) = (a.conversions as f64, b.conversions as f64);

        let pooled = (x_a + x_b) / (n_a + n_b);
        let variance = pooled * (1.0 - pooled) * (1.0 / n_a + 1.0 / n_b);
        if variance <= 0.0 {
            return Err(Error::InsufficientData(format!(
                "groups {} and {} share the same outcome for every observation",
                a.group, b.group
            )));
        }

        let z = (x_a / n_a - x_b / n_b) / variance.sqrt();
        let p_value = two_sided_p_value(z);

        Ok(TestResult {
            groups: (a.group.clone(), b.group.clone()),
            z_statistic: z,
            p_value,
            alpha: self.alpha,
            significant: p_value < self.alpha,
        })
    }
}

fn missing_group(group: &GroupLabel) -> Error {
    Error::InsufficientData(format!("group {} has no observations", group))
}

/// Two-sided tail probability of |z| under the standard normal.
pub fn two_sided_p_value(z: f64) -> f64 {
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Error function approximation (Abramowitz and Stegun 7.1.26).
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}
