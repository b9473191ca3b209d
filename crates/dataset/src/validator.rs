//! Pre-run dataset validation. Structural problems become errors; quality
//! problems that the model can survive become warnings.

use mmm_core::config::AnalysisConfig;
use mmm_core::types::{ChannelSpec, Dataset};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: DatasetStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetStats {
    pub row_count: usize,
    pub column_count: usize,
    pub date_start: Option<chrono::NaiveDate>,
    pub date_end: Option<chrono::NaiveDate>,
    pub channel_count: usize,
    pub channels: Vec<String>,
}

/// Validate an aligned dataset before model fitting.
///
/// Errors (run cannot proceed): empty dataset, missing dependent variable,
/// no channel cost columns. Warnings (run proceeds, reliability reduced):
/// fewer rows than recommended, zero-variance dependent or channel series,
/// negative dependent values.
pub fn validate_dataset(
    dataset: &Dataset,
    channels: &[ChannelSpec],
    config: &AnalysisConfig,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if dataset.is_empty() {
        errors.push("dataset has no rows".to_string());
    }

    if !dataset.is_empty() && !dataset.has_variable(&config.dep_var) {
        errors.push(format!(
            "dependent variable '{}' not found in dataset",
            config.dep_var
        ));
    }

    if channels.is_empty() {
        errors.push(format!(
            "no channel cost columns found (expected keys ending in '{}')",
            config.cost_suffix
        ));
    }

    if !dataset.is_empty() && dataset.len() < config.recommended_rows {
        warnings.push(format!(
            "only {} rows of data; at least {} recommended for a stable fit",
            dataset.len(),
            config.recommended_rows
        ));
    }

    if dataset.has_variable(&config.dep_var) {
        let dep = dataset.column(&config.dep_var);
        if variance(&dep) == 0.0 {
            warnings.push(format!(
                "dependent variable '{}' has zero variance",
                config.dep_var
            ));
        }
        if dep.iter().any(|v| *v < 0.0) {
            warnings.push(format!(
                "dependent variable '{}' contains negative values",
                config.dep_var
            ));
        }
    }

    for channel in channels {
        let spend = dataset.column(&channel.cost_key);
        if !spend.is_empty() && variance(&spend) == 0.0 {
            warnings.push(format!(
                "channel '{}' has zero spend variance and will not contribute to the model",
                channel.id
            ));
        }
    }

    for message in &warnings {
        warn!("dataset validation: {message}");
    }

    let (date_start, date_end) = match dataset.date_range() {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    };

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        stats: DatasetStats {
            row_count: dataset.len(),
            column_count: dataset.variables.len(),
            date_start,
            date_end,
            channel_count: channels.len(),
            channels: channels.iter().map(|c| c.id.clone()).collect(),
        },
    }
}

fn variance(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / series.len() as f64
}
