//! Command-level tests

mod test_dashboard;
mod test_report;
mod test_simulate;
mod test_summary;
