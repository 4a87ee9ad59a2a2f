//! A/B Test Conversion Analysis Library
//!
//! This library provides tools to:
//! - Load per-user A/B observations from CSV
//! - Compute per-group conversion rates and a two-proportion z-test
//! - Generate a report (Markdown + SVG chart, optional PDF)
//! - Serve an interactive dashboard with group filtering
//! - Generate synthetic datasets for trials

pub mod analytics;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod report;
pub mod simulate;

// Re-export common types
pub use analytics::{ConversionSummary, GroupStats, TestResult, Verdict};
pub use config::{Config, PdfExport};
pub use dataset::{ColumnNames, Dataset, GroupLabel, Observation};
pub use error::{Error, Result};

pub mod commands;
