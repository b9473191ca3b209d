use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily observation from one upstream data source, already
/// de-duplicated to a `(date, variable, value)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub variable: String,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, variable: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            variable: variable.into(),
            value,
        }
    }
}

/// How missing days are filled for a variable during alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Reuse the most recent known value; 0 before the first observation.
    CarryForward,
    /// Absence means nothing happened that day.
    ZeroFill,
}

/// One aligned row: every known variable has a value for this calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub values: BTreeMap<String, f64>,
}

impl MergedRow {
    pub fn get(&self, variable: &str) -> f64 {
        self.values.get(variable).copied().unwrap_or(0.0)
    }
}

/// An explicit channel descriptor, built once at ingestion from the cost
/// column naming convention and validated there. Downstream computation
/// consumes this typed list and never re-derives channels from key strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Channel identifier: the cost key with the suffix stripped.
    pub id: String,
    /// Variable key carrying the channel's daily spend.
    pub cost_key: String,
    /// Companion impression column, when the dataset has one.
    pub impression_key: Option<String>,
    /// Companion click column, when the dataset has one.
    pub click_key: Option<String>,
}

/// The aligned dataset the whole pipeline operates on: rows sorted
/// ascending by date, no duplicate dates, identical variable keys per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub rows: Vec<MergedRow>,
    /// Sorted union of all variable keys present in the rows.
    pub variables: Vec<String>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.iter().any(|v| v == key)
    }

    /// The daily series for one variable, in row order.
    pub fn column(&self, key: &str) -> Vec<f64> {
        self.rows.iter().map(|r| r.get(key)).collect()
    }

    /// Sum of a variable over all rows; 0 when the column is absent.
    pub fn total(&self, key: &str) -> f64 {
        self.rows.iter().map(|r| r.get(key)).sum()
    }

    /// First and last calendar day covered, if any rows exist.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Derive the typed channel list from the cost-suffix convention.
    /// Companion impression/click columns are attached when present.
    pub fn detect_channels(&self, cost_suffix: &str) -> Vec<ChannelSpec> {
        self.variables
            .iter()
            .filter_map(|key| {
                let id = key.strip_suffix(cost_suffix)?;
                if id.is_empty() {
                    return None;
                }
                let impression_key = format!("{id}_imp");
                let click_key = format!("{id}_click");
                Some(ChannelSpec {
                    id: id.to_string(),
                    cost_key: key.clone(),
                    impression_key: self.has_variable(&impression_key).then_some(impression_key),
                    click_key: self.has_variable(&click_key).then_some(click_key),
                })
            })
            .collect()
    }
}
