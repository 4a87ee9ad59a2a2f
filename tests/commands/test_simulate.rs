//! Tests for simulate command

use abtest_analyzer::commands::simulate::{run, SimulateArgs};
use abtest_analyzer::{ColumnNames, Config, ConversionSummary, Dataset, GroupLabel};

#[test]
fn test_simulate_writes_loadable_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("sim.csv");

    let path = run(
        &Config::defaults(),
        SimulateArgs {
            output: Some(output.clone()),
            users_per_group: 500,
            control_rate: 0.1,
            variant_rate: 0.3,
            seed: Some(11),
        },
    )
    .unwrap();
    assert_eq!(path, output);

    let dataset = Dataset::load_csv(&path, &ColumnNames::default()).unwrap();
    assert_eq!(dataset.len(), 1000);

    let a = GroupLabel::new("A").unwrap();
    let b = GroupLabel::new("B").unwrap();
    let result = ConversionSummary::default()
        .significance_test(dataset.observations(), (&a, &b))
        .unwrap();
    assert!(result.significant);
}

#[test]
fn test_simulate_rejects_bad_rate() {
    let dir = tempfile::tempdir().unwrap();
    let result = run(
        &Config::defaults(),
        SimulateArgs {
            output: Some(dir.path().join("sim.csv")),
            users_per_group: 10,
            control_rate: -0.1,
            variant_rate: 0.2,
            seed: None,
        },
    );
    assert!(result.is_err());
}
