//! Configuration for the A/B analyzer
//!
//! Loads configuration from abtest.yml, with environment overrides.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::analytics::DEFAULT_ALPHA;
use crate::dataset::{ColumnNames, GroupLabel, DEFAULT_CONVERTED_COLUMN, DEFAULT_GROUP_COLUMN};
use crate::{Error, Result};

/// Default constants (fallback if abtest.yml not found)
pub const CONFIG_FILE: &str = "abtest.yml";
pub const DEFAULT_DATA_PATH: &str = "ab_test_data.csv";
pub const DEFAULT_REPORT_DIR: &str = "report";
pub const DEFAULT_PLOTS_DIR: &str = "plots";
pub const DEFAULT_DASHBOARD_ADDR: &str = "127.0.0.1:8050";
pub const DEFAULT_PDF_CONVERTER: &str = "pandoc";
pub const DEFAULT_CONTROL: &str = "A";
pub const DEFAULT_VARIANT: &str = "B";

/// Whether the report can be converted to PDF.
///
/// Resolved once at startup and passed to the report shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfExport {
    /// Converter executable found.
    Available(PathBuf),
    /// Converter configured but not found.
    Missing(String),
    /// PDF export turned off in configuration.
    Disabled,
}

impl PdfExport {
    /// Look up `converter` as a path or on `PATH`.
    pub fn detect(converter: &str) -> Self {
        let converter = converter.trim();
        if converter.is_empty() || converter.eq_ignore_ascii_case("none") {
            return PdfExport::Disabled;
        }

        let direct = Path::new(converter);
        if direct.components().count() > 1 {
            return if direct.is_file() {
                PdfExport::Available(direct.to_path_buf())
            } else {
                PdfExport::Missing(converter.to_string())
            };
        }

        let found = env::var_os("PATH").and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join(converter))
                .find(|candidate| candidate.is_file())
        });

        match found {
            Some(path) => {
                debug!(path = %path.display(), "PDF converter found");
                PdfExport::Available(path)
            }
            None => PdfExport::Missing(converter.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PdfExport::Available(_))
    }
}

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    data: Option<DataConfig>,
    experiment: Option<ExperimentConfig>,
    report: Option<ReportConfig>,
    dashboard: Option<DashboardConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DataConfig {
    path: Option<String>,
    group_column: Option<String>,
    converted_column: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExperimentConfig {
    control: Option<String>,
    variant: Option<String>,
    alpha: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportConfig {
    dir: Option<String>,
    plots_dir: Option<String>,
    pdf_converter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DashboardConfig {
    addr: Option<String>,
}

/// Main configuration struct
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    pub columns: ColumnNames,
    pub control: GroupLabel,
    pub variant: GroupLabel,
    pub alpha: f64,
    pub report_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub pdf_converter: String,
    pub dashboard_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load configuration from an explicit file, or abtest.yml if present.
    /// Environment variables take precedence over file values
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_dotenv();

        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        let parent = PathBuf::from("..").join(CONFIG_FILE);
        for candidate in [Path::new(CONFIG_FILE), parent.as_path()] {
            if candidate.is_file() {
                return Self::load_from_file(candidate);
            }
        }

        debug!("No config file found, using defaults");
        Self::from_yaml(YamlConfig::default())
    }

    /// Built-in defaults, without consulting files or the environment.
    pub fn defaults() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            columns: ColumnNames::default(),
            control: GroupLabel::new(DEFAULT_CONTROL).expect("default label is non-empty"),
            variant: GroupLabel::new(DEFAULT_VARIANT).expect("default label is non-empty"),
            alpha: DEFAULT_ALPHA,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            plots_dir: PathBuf::from(DEFAULT_PLOTS_DIR),
            pdf_converter: DEFAULT_PDF_CONVERTER.to_string(),
            dashboard_addr: DEFAULT_DASHBOARD_ADDR.to_string(),
        }
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.as_ref().display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let yaml: Option<YamlConfig> = serde_yaml::from_str(content)?;
        Self::from_yaml(yaml.unwrap_or_default())
    }

    fn from_yaml(yaml: YamlConfig) -> Result<Self> {
        let data = yaml.data.unwrap_or_default();
        let experiment = yaml.experiment.unwrap_or_default();
        let report = yaml.report.unwrap_or_default();
        let dashboard = yaml.dashboard.unwrap_or_default();

        let alpha = match env::var("ABTEST_ALPHA") {
            Ok(raw) => raw.trim().parse::<f64>().map_err(|e| {
                Error::ConfigError(format!("ABTEST_ALPHA is not a number: {}", e))
            })?,
            Err(_) => experiment.alpha.unwrap_or(DEFAULT_ALPHA),
        };
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::ConfigError(format!(
                "alpha must be in (0, 1), got {}",
                alpha
            )));
        }

        let control = GroupLabel::new(resolve_or(experiment.control, "", DEFAULT_CONTROL))?;
        let variant = GroupLabel::new(resolve_or(experiment.variant, "", DEFAULT_VARIANT))?;
        if control == variant {
            return Err(Error::ConfigError(format!(
                "control and variant must differ, both are '{}'",
                control
            )));
        }

        Ok(Self {
            data_path: PathBuf::from(resolve_or(data.path, "ABTEST_DATA", DEFAULT_DATA_PATH)),
            columns: ColumnNames {
                group: resolve_or(data.group_column, "", DEFAULT_GROUP_COLUMN),
                converted: resolve_or(data.converted_column, "", DEFAULT_CONVERTED_COLUMN),
            },
            control,
            variant,
            alpha,
            report_dir: PathBuf::from(resolve_or(report.dir, "", DEFAULT_REPORT_DIR)),
            plots_dir: PathBuf::from(resolve_or(report.plots_dir, "", DEFAULT_PLOTS_DIR)),
            pdf_converter: resolve_or(
                report.pdf_converter,
                "ABTEST_PDF_CONVERTER",
                DEFAULT_PDF_CONVERTER,
            ),
            dashboard_addr: resolve_or(
                dashboard.addr,
                "ABTEST_DASHBOARD_ADDR",
                DEFAULT_DASHBOARD_ADDR,
            ),
        })
    }

    /// The configured (control, variant) pair.
    pub fn test_groups(&self) -> (&GroupLabel, &GroupLabel) {
        (&self.control, &self.variant)
    }

    /// Resolve the PDF export capability for this configuration.
    pub fn pdf_export(&self) -> PdfExport {
        let pdf = PdfExport::detect(&self.pdf_converter);
        if let PdfExport::Missing(ref name) = pdf {
            warn!(converter = %name, "PDF converter not found, PDF export will be skipped");
        }
        pdf
    }
}

/// Resolve a value: prefer env var if config value looks like ${VAR}
pub fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
    if let Some(ref v) = value {
        if v.starts_with("${") && v.ends_with('}') {
            let var_name = &v[2..v.len() - 1];
            if let Ok(env_val) = env::var(var_name) {
                return Some(env_val);
            }
        }
    }
    // Also check explicit env_key as fallback
    if !env_key.is_empty() {
        if let Ok(env_val) = env::var(env_key) {
            return Some(env_val);
        }
    }
    value.filter(|v| !(v.starts_with("${") && v.ends_with('}')))
}

fn resolve_or(value: Option<String>, env_key: &str, default: &str) -> String {
    resolve_env_string(value, env_key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
