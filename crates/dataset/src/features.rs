//! Synthesized time-based control regressors — linear trend, weekend
//! flag, and annual seasonality encoded as a sine/cosine pair. These give
//! the model a way to absorb calendar effects that would otherwise be
//! misattributed to channel spend.

use chrono::Datelike;
use mmm_core::types::Dataset;

pub const TREND_KEY: &str = "trend";
pub const WEEKEND_KEY: &str = "is_weekend";
pub const SEASON_SIN_KEY: &str = "season_sin";
pub const SEASON_COS_KEY: &str = "season_cos";

const TIME_FEATURE_KEYS: [&str; 4] = [TREND_KEY, WEEKEND_KEY, SEASON_SIN_KEY, SEASON_COS_KEY];

/// Append the time-feature columns to an aligned dataset, returning the
/// keys that were added. A key already present in the data is assumed to
/// be a real upstream variable: it is left untouched and not reported.
pub fn append_time_features(dataset: &mut Dataset) -> Vec<String> {
    let added: Vec<String> = TIME_FEATURE_KEYS
        .iter()
        .filter(|key| !dataset.has_variable(key))
        .map(|key| key.to_string())
        .collect();
    if added.is_empty() {
        return added;
    }

    for (i, row) in dataset.rows.iter_mut().enumerate() {
        let weekend = matches!(
            row.date.weekday(),
            chrono::Weekday::Sat | chrono::Weekday::Sun
        );
        let phase = 2.0 * std::f64::consts::PI * row.date.ordinal() as f64 / 365.25;
        let features = [
            (TREND_KEY, i as f64),
            (WEEKEND_KEY, if weekend { 1.0 } else { 0.0 }),
            (SEASON_SIN_KEY, phase.sin()),
            (SEASON_COS_KEY, phase.cos()),
        ];
        for (key, value) in features {
            if added.iter().any(|a| a == key) {
                row.values.insert(key.to_string(), value);
            }
        }
    }

    dataset.variables.extend(added.iter().cloned());
    dataset.variables.sort();
    added
}
