//! Tests for report command

use abtest_analyzer::commands::report;
use abtest_analyzer::{Config, PdfExport};

use crate::write_ab_csv;

#[tokio::test]
async fn test_report_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_path: write_ab_csv(dir.path(), (100, 1000), (150, 1000)),
        report_dir: dir.path().join("report"),
        plots_dir: dir.path().join("plots"),
        ..Config::defaults()
    };

    let artifacts = report::run(&config, PdfExport::Disabled).await.unwrap();

    assert!(artifacts.chart.ends_with("conversion_rate_plot.svg"));
    assert!(artifacts.pdf.is_none());

    let svg = std::fs::read_to_string(&artifacts.chart).unwrap();
    assert!(svg.starts_with("<svg"));

    let markdown = std::fs::read_to_string(&artifacts.markdown).unwrap();
    assert!(markdown.contains("conversion_rate_plot.svg"));
    assert!(markdown.contains("Statistically significant"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifacts.json).unwrap()).unwrap();
    assert_eq!(json["total_users"], 2000);
}

#[tokio::test]
async fn test_report_missing_converter_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_path: write_ab_csv(dir.path(), (20, 200), (30, 200)),
        report_dir: dir.path().join("report"),
        plots_dir: dir.path().join("plots"),
        ..Config::defaults()
    };

    let pdf = PdfExport::Missing("no-such-pdf-converter".to_string());
    let artifacts = report::run(&config, pdf).await.unwrap();
    assert!(artifacts.pdf.is_none());
    assert!(artifacts.markdown.exists());
}

#[tokio::test]
async fn test_report_missing_data_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_path: dir.path().join("missing.csv"),
        report_dir: dir.path().join("report"),
        ..Config::defaults()
    };

    assert!(report::run(&config, PdfExport::Disabled).await.is_err());
    assert!(!dir.path().join("report").exists());
}
