//! Synthetic A/B dataset generator.
//!
//! Writes `user_id,timestamp,group,landing_page,converted` rows so the
//! report and dashboard can run without production data.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::dataset::GroupLabel;
use crate::{Error, Result};

/// One simulated experiment arm.
#[derive(Debug, Clone)]
pub struct ArmSpec {
    pub group: GroupLabel,
    pub landing_page: String,
    pub users: u64,
    /// True conversion probability in [0, 1].
    pub conversion_rate: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub arms: Vec<ArmSpec>,
    pub start: DateTime<Utc>,
    /// Span over which timestamps are spread.
    pub window: Duration,
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Classic two-arm setup: control on `old_page`, variant on `new_page`.
    pub fn two_arm(
        control: GroupLabel,
        variant: GroupLabel,
        users_per_arm: u64,
        control_rate: f64,
        variant_rate: f64,
    ) -> Self {
        Self {
            arms: vec![
                ArmSpec {
                    group: control,
                    landing_page: "old_page".to_string(),
                    users: users_per_arm,
                    conversion_rate: control_rate,
                },
                ArmSpec {
                    group: variant,
                    landing_page: "new_page".to_string(),
                    users: users_per_arm,
                    conversion_rate: variant_rate,
                },
            ],
            start: Utc::now() - Duration::days(14),
            window: Duration::days(14),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.arms.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one arm is required".to_string(),
            ));
        }
        for arm in &self.arms {
            if !(0.0..=1.0).contains(&arm.conversion_rate) {
                return Err(Error::InvalidArgument(format!(
                    "conversion rate for group {} must be in [0, 1], got {}",
                    arm.group, arm.conversion_rate
                )));
            }
        }
        if self.window <= Duration::zero() {
            return Err(Error::InvalidArgument(
                "simulation window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A generated row.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedRow {
    pub user_id: u64,
    pub timestamp: String,
    pub group: GroupLabel,
    pub landing_page: String,
    pub converted: u8,
}

/// Generate rows in user-id order, arms interleaved by timestamp.
pub fn generate(config: &SimulationConfig) -> Result<Vec<SimulatedRow>> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let window_secs = config.window.num_seconds().max(1);

    let mut rows: Vec<(DateTime<Utc>, &ArmSpec, bool)> = Vec::new();
    for arm in &config.arms {
        for _ in 0..arm.users {
            let offset = rng.gen_range(0..window_secs);
            let converted = rng.gen_bool(arm.conversion_rate);
            rows.push((config.start + Duration::seconds(offset), arm, converted));
        }
    }
    rows.sort_by_key(|(ts, _, _)| *ts);

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, (ts, arm, converted))| SimulatedRow {
            user_id: 100_000 + i as u64,
            timestamp: ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            group: arm.group.clone(),
            landing_page: arm.landing_page.clone(),
            converted: converted as u8,
        })
        .collect())
}

/// Generate a dataset and write it as CSV.
pub fn write_csv<P: AsRef<Path>>(config: &SimulationConfig, path: P) -> Result<usize> {
    let path = path.as_ref();
    let rows = generate(config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Wrote synthetic dataset");
    Ok(rows.len())
}
