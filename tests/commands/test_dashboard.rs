//! Tests for dashboard view and routing

use std::sync::Arc;

use abtest_analyzer::commands::load_dataset;
use abtest_analyzer::dashboard::server::route;
use abtest_analyzer::dashboard::{render_view, DashboardSettings, DashboardState, TestPanel};
use abtest_analyzer::{Config, GroupLabel};
use hyper::{Method, StatusCode};

use crate::write_ab_csv;

fn label(s: &str) -> GroupLabel {
    GroupLabel::new(s).unwrap()
}

fn config(dir: &std::path::Path) -> Config {
    Config {
        data_path: write_ab_csv(dir, (100, 1000), (150, 1000)),
        ..Config::defaults()
    }
}

#[test]
fn test_view_all_groups() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let dataset = load_dataset(&config).unwrap();
    let settings = DashboardSettings::from_config(&config).unwrap();

    let view = render_view(&dataset, &[label("A"), label("B")], &settings);
    assert_eq!(view.total_users, 2000);
    assert_eq!(view.arms[0].users, 1000);
    assert_eq!(view.arms[1].users, 1000);
    assert!(view.chart_svg.is_some());
    assert!(view.test.result().unwrap().significant);
}

#[test]
fn test_view_empty_selection() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let dataset = load_dataset(&config).unwrap();
    let settings = DashboardSettings::from_config(&config).unwrap();

    let view = render_view(&dataset, &[], &settings);
    assert_eq!(view.message.as_deref(), Some("Please select at least one group."));
    assert!(view.chart_svg.is_none());
    assert_eq!(view.total_users, 0);
}

#[test]
fn test_view_single_group_skips_test() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let dataset = load_dataset(&config).unwrap();
    let settings = DashboardSettings::from_config(&config).unwrap();

    let view = render_view(&dataset, &[label("B")], &settings);
    assert_eq!(view.total_users, 1000);
    assert_eq!(view.arms[0].users, 0);
    assert!(matches!(view.test, TestPanel::Skipped { .. }));
}

#[test]
fn test_routes_over_loaded_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let dataset = load_dataset(&config).unwrap();
    let state = DashboardState::new(
        Arc::clone(&dataset),
        DashboardSettings::from_config(&config).unwrap(),
    );

    assert_eq!(state.groups(), &[label("A"), label("B")]);
    let (_, page) = route(&state, &Method::GET, "/", None);
    assert_eq!(page.status(), StatusCode::OK);
    let (_, view) = route(&state, &Method::GET, "/api/view", Some("groups=A"));
    assert_eq!(view.status(), StatusCode::OK);
    let (_, missing) = route(&state, &Method::GET, "/nope", None);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
