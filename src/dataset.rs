//! Observation dataset loaded from a delimited file.
//!
//! The dataset is read once at startup and shared read-only with every
//! computation; filtering produces a new `Dataset`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::{Error, Result};

/// Default header of the group label column.
pub const DEFAULT_GROUP_COLUMN: &str = "group";
/// Default header of the converted flag column.
pub const DEFAULT_CONVERTED_COLUMN: &str = "converted";

/// Identifier of an experiment arm ("A", "B", ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupLabel(String);

impl GroupLabel {
    /// Create a label, trimming surrounding whitespace.
    pub fn new(label: impl AsRef<str>) -> Result<Self> {
        let trimmed = label.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument(
                "group label must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GroupLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// A single user's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub group: GroupLabel,
    pub converted: bool,
}

impl Observation {
    pub fn new(group: GroupLabel, converted: bool) -> Self {
        Self { group, converted }
    }
}

/// Header names of the two columns the analysis needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub group: String,
    pub converted: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP_COLUMN.to_string(),
            converted: DEFAULT_CONVERTED_COLUMN.to_string(),
        }
    }
}

/// Parse a boolean-like converted flag.
///
/// Numeric flags may be float-formatted (`1.0`, `0.0`).
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        other => match other.parse::<f64>() {
            Ok(v) if v == 1.0 => Some(true),
            Ok(v) if v == 0.0 => Some(false),
            _ => None,
        },
    }
}

/// Immutable collection of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Build a dataset from `(group, converted)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let observations = pairs
            .into_iter()
            .map(|(group, converted)| Ok(Observation::new(GroupLabel::new(group)?, converted)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(observations))
    }

    /// Load a dataset from a CSV file with a header row.
    pub fn load_csv<P: AsRef<Path>>(path: P, columns: &ColumnNames) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file, columns)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Parse CSV content from any reader.
    pub fn from_reader<R: std::io::Read>(reader: R, columns: &ColumnNames) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let group_idx = column_index(&headers, &columns.group)?;
        let converted_idx = column_index(&headers, &columns.converted)?;

        let mut observations = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let group = record.get(group_idx).unwrap_or_default();
            let group = GroupLabel::new(group).map_err(|_| Error::InvalidRow {
                line,
                reason: format!("empty value in column '{}'", columns.group),
            })?;

            let raw_flag = record.get(converted_idx).unwrap_or_default();
            let converted = parse_flag(raw_flag).ok_or_else(|| Error::InvalidRow {
                line,
                reason: format!(
                    "expected 0/1 in column '{}', got '{}'",
                    columns.converted, raw_flag
                ),
            })?;

            observations.push(Observation::new(group, converted));
        }

        debug!(rows = observations.len(), "Parsed observations");
        Ok(Self::new(observations))
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct group labels in sorted order.
    pub fn groups(&self) -> Vec<GroupLabel> {
        self.observations
            .iter()
            .map(|o| o.group.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Keep only observations whose group is in `selection`.
    pub fn filter(&self, selection: &[GroupLabel]) -> Dataset {
        let observations = self
            .observations
            .iter()
            .filter(|o| selection.contains(&o.group))
            .cloned()
            .collect();
        Dataset::new(observations)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> GroupLabel {
        GroupLabel::new(s).unwrap()
    }

    #[test]
    fn test_group_label_trims_whitespace() {
        assert_eq!(label("  A ").as_str(), "A");
        assert_eq!(label("B").to_string(), "B");
    }

    #[test]
    fn test_group_label_rejects_empty() {
        assert!(GroupLabel::new("   ").is_err());
        assert!("".parse::<GroupLabel>().is_err());
    }

    #[test]
    fn test_parse_flag_variants() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_parse_flag_float_formatted() {
        assert_eq!(parse_flag("1.0"), Some(true));
        assert_eq!(parse_flag("0.0"), Some(false));
        assert_eq!(parse_flag("-0.0"), Some(false));
        assert_eq!(parse_flag("0.5"), None);
        assert_eq!(parse_flag("2"), None);
        assert_eq!(parse_flag("NaN"), None);
    }

    #[test]
    fn test_from_reader_accepts_float_flags() {
        let csv = "group,converted\nA,1.0\nA,0.0\nB,1.0\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), &ColumnNames::default()).unwrap();
        let converted: Vec<bool> = dataset.observations().iter().map(|o| o.converted).collect();
        assert_eq!(converted, vec![true, false, true]);
    }

    #[test]
    fn test_from_reader_ignores_extra_columns() {
        let csv = "user_id,timestamp,group,landing_page,converted\n\
                   1,2024-01-01 10:00:00,A,old_page,0\n\
                   2,2024-01-01 10:01:00,B,new_page,1\n\
                   3,2024-01-01 10:02:00,A,old_page,1\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), &ColumnNames::default()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.observations()[1], Observation::new(label("B"), true));
        assert_eq!(dataset.groups(), vec![label("A"), label("B")]);
    }

    #[test]
    fn test_from_reader_custom_columns() {
        let csv = "variant,purchased\ncontrol,yes\ntreatment,no\n";
        let columns = ColumnNames {
            group: "variant".to_string(),
            converted: "purchased".to_string(),
        };
        let dataset = Dataset::from_reader(csv.as_bytes(), &columns).unwrap();

        assert_eq!(dataset.groups(), vec![label("control"), label("treatment")]);
        assert!(dataset.observations()[0].converted);
    }

    #[test]
    fn test_from_reader_missing_column() {
        let csv = "group,clicked\nA,1\n";
        let err = Dataset::from_reader(csv.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "converted"));
    }

    #[test]
    fn test_from_reader_malformed_flag_reports_line() {
        let csv = "group,converted\nA,1\nB,2\n";
        let err = Dataset::from_reader(csv.as_bytes(), &ColumnNames::default()).unwrap_err();
        match err {
            Error::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("'2'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_reader_empty_label() {
        let csv = "group,converted\n ,1\n";
        let err = Dataset::from_reader(csv.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn test_from_reader_header_only() {
        let dataset =
            Dataset::from_reader("group,converted\n".as_bytes(), &ColumnNames::default()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.groups().is_empty());
    }

    #[test]
    fn test_filter_keeps_selection() {
        let dataset = Dataset::from_pairs([("A", true), ("B", false), ("A", false), ("C", true)])
            .unwrap();

        let only_a = dataset.filter(&[label("A")]);
        assert_eq!(only_a.len(), 2);
        assert!(only_a.observations().iter().all(|o| o.group == label("A")));

        let none = dataset.filter(&[]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = Dataset::load_csv("/nonexistent/ab_test_data.csv", &ColumnNames::default())
            .unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
