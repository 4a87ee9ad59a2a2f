//! Conversion analytics
//!
//! Provides:
//! - Per-group conversion statistics
//! - Two-proportion significance testing

pub mod summary;

pub use summary::{ConversionSummary, GroupStats, TestResult, Verdict, DEFAULT_ALPHA};
