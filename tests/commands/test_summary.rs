//! Tests for summary command

use abtest_analyzer::commands::summary::{render, OutputFormat};
use abtest_analyzer::Config;

use crate::write_ab_csv;

#[test]
fn test_summary_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_path: write_ab_csv(dir.path(), (100, 1000), (150, 1000)),
        ..Config::defaults()
    };

    let text = render(&config, OutputFormat::Text).unwrap();
    assert!(text.contains("2000"));
    assert!(text.contains("Statistically significant"));
}

#[test]
fn test_summary_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_path: write_ab_csv(dir.path(), (100, 1000), (105, 1000)),
        ..Config::defaults()
    };

    let json: serde_json::Value =
        serde_json::from_str(&render(&config, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["total_users"], 2000);
    assert_eq!(json["groups"].as_array().unwrap().len(), 2);
    assert_eq!(json["test"]["significant"], false);
}

#[test]
fn test_summary_single_group_notes_missing_test() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_path: write_ab_csv(dir.path(), (10, 100), (0, 0)),
        ..Config::defaults()
    };

    let json: serde_json::Value =
        serde_json::from_str(&render(&config, OutputFormat::Json).unwrap()).unwrap();
    assert!(json["test"].is_null());
    assert!(json["test_note"].as_str().unwrap().contains("Z-test not run"));
}
