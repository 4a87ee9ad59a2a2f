//! Integration tests for abtest_analyzer library
//!
//! These tests verify the public API and module interactions.

mod commands;

use std::io::Write;

use abtest_analyzer::{
    config::DEFAULT_DASHBOARD_ADDR,
    error::Error,
    ColumnNames, Config, ConversionSummary, Dataset, GroupLabel, Verdict,
};

fn label(s: &str) -> GroupLabel {
    GroupLabel::new(s).unwrap()
}

/// CSV with `a_conv`/`a_total` in A and `b_conv`/`b_total` in B.
pub fn write_ab_csv(dir: &std::path::Path, a: (u64, u64), b: (u64, u64)) -> std::path::PathBuf {
    let path = dir.join("ab_test_data.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "user_id,timestamp,group,landing_page,converted").unwrap();
    let mut id = 1;
    for (group, page, (conv, total)) in [("A", "old_page", a), ("B", "new_page", b)] {
        for i in 0..total {
            writeln!(
                file,
                "{},2024-03-01 10:00:00,{},{},{}",
                id,
                group,
                page,
                (i < conv) as u8
            )
            .unwrap();
            id += 1;
        }
    }
    path
}

// ============================================================================
// Dataset + Summary Tests
// ============================================================================

#[test]
fn test_csv_to_significant_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ab_csv(dir.path(), (100, 1000), (150, 1000));

    let dataset = Dataset::load_csv(&path, &ColumnNames::default()).unwrap();
    let summary = ConversionSummary::default();

    assert_eq!(dataset.len(), 2000);
    let stats = summary.group_stats(dataset.observations());
    assert!((stats[&label("A")].rate - 10.0).abs() < 1e-12);
    assert!((stats[&label("B")].rate - 15.0).abs() < 1e-12);
    assert!((summary.overall_rate(dataset.observations()).unwrap() - 12.5).abs() < 1e-12);

    let result = summary
        .significance_test(dataset.observations(), (&label("A"), &label("B")))
        .unwrap();
    assert!((result.z_statistic + 3.3806).abs() < 1e-3);
    assert!(result.p_value < 0.001);
    assert_eq!(result.verdict(), Verdict::Significant);
}

#[test]
fn test_csv_to_non_significant_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ab_csv(dir.path(), (100, 1000), (105, 1000));

    let dataset = Dataset::load_csv(&path, &ColumnNames::default()).unwrap();
    let result = ConversionSummary::default()
        .significance_test(dataset.observations(), (&label("A"), &label("B")))
        .unwrap();

    assert!((result.p_value - 0.7124).abs() < 1e-3);
    assert!(!result.significant);
    assert_eq!(result.verdict().label(), "Not statistically significant");
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Dataset::load_csv("/nonexistent/ab_test_data.csv", &ColumnNames::default());
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_missing_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "user_id,variant,converted\n1,A,1\n").unwrap();

    let result = Dataset::load_csv(&path, &ColumnNames::default());
    assert!(matches!(result, Err(Error::MissingColumn(ref c)) if c == "group"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abtest.yml");
    std::fs::write(
        &path,
        r#"
data:
  path: data/custom.csv
  group_column: arm
experiment:
  control: control
  variant: treatment
  alpha: 0.01
report:
  pdf_converter: none
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.columns.group, "arm");
    assert_eq!(config.control, label("control"));
    assert_eq!(config.variant, label("treatment"));
    assert_eq!(config.pdf_export(), abtest_analyzer::PdfExport::Disabled);
    assert_eq!(config.columns.converted, "converted");
}

#[test]
fn test_config_missing_file_is_error() {
    let result = Config::load(Some(std::path::Path::new("/nonexistent/abtest.yml")));
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_config_defaults() {
    let config = Config::defaults();
    assert_eq!(config.dashboard_addr, DEFAULT_DASHBOARD_ADDR);
    assert_eq!(config.test_groups(), (&label("A"), &label("B")));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_error_variants_display() {
    let errors = vec![
        Error::CsvError("bad quote".into()),
        Error::InvalidRow {
            line: 3,
            reason: "bad flag".into(),
        },
        Error::MissingColumn("group".into()),
        Error::EmptyDataset,
        Error::InsufficientData("group B has no observations".into()),
        Error::InvalidArgument("bad arg".into()),
        Error::ConfigError("bad config".into()),
        Error::SerializationError("json error".into()),
        Error::ExportError("pandoc failed".into()),
    ];

    for error in errors {
        assert!(!error.to_string().is_empty());
    }
}
