//! Aligns heterogeneous per-source daily observations into one table with
//! a row per calendar day and a value for every known variable.

use std::collections::{BTreeMap, BTreeSet};

use mmm_core::types::{Dataset, FillPolicy, MergedRow, Observation};
use tracing::debug;

/// Variable name suffixes whose absence on a day means "nothing happened".
/// Everything else is a cumulative/metric series and carries forward.
const ZERO_FILL_SUFFIXES: &[&str] = &["_cost", "_imp", "_click", "_flag", "_event"];

/// Classify a variable by its naming convention.
pub fn fill_policy(variable: &str) -> FillPolicy {
    if ZERO_FILL_SUFFIXES.iter().any(|s| variable.ends_with(s)) {
        FillPolicy::ZeroFill
    } else {
        FillPolicy::CarryForward
    }
}

/// Merges observation streams into a chronologically ordered dataset.
///
/// The output covers every distinct date seen in any stream. Missing values
/// are filled per [`fill_policy`]: spend/impression/click/flag variables get
/// 0, everything else reuses the most recent known value (0 before the
/// first). A stream with no observations contributes no columns.
#[derive(Debug, Default)]
pub struct DataAligner;

impl DataAligner {
    pub fn new() -> Self {
        Self
    }

    pub fn align(&self, streams: &[Vec<Observation>]) -> Dataset {
        // date -> variable -> value; later observations overwrite earlier
        // ones for the same (date, variable), in input order.
        let mut cells: BTreeMap<chrono::NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
        let mut variables: BTreeSet<String> = BTreeSet::new();

        for stream in streams {
            for obs in stream {
                variables.insert(obs.variable.clone());
                cells
                    .entry(obs.date)
                    .or_default()
                    .insert(obs.variable.clone(), obs.value);
            }
        }

        let mut last_known: BTreeMap<String, f64> = BTreeMap::new();
        let mut rows = Vec::with_capacity(cells.len());

        for (date, observed) in &cells {
            let mut values = BTreeMap::new();
            for variable in &variables {
                let value = match observed.get(variable) {
                    Some(v) => {
                        last_known.insert(variable.clone(), *v);
                        *v
                    }
                    None => match fill_policy(variable) {
                        FillPolicy::ZeroFill => 0.0,
                        FillPolicy::CarryForward => {
                            last_known.get(variable).copied().unwrap_or(0.0)
                        }
                    },
                };
                values.insert(variable.clone(), value);
            }
            rows.push(MergedRow { date: *date, values });
        }

        debug!(
            rows = rows.len(),
            variables = variables.len(),
            "aligned observation streams"
        );

        Dataset {
            rows,
            variables: variables.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn obs(d: u32, var: &str, value: f64) -> Observation {
        Observation::new(day(d), var, value)
    }

    #[test]
    fn test_rows_sorted_with_no_duplicate_dates() {
        let streams = vec![
            vec![obs(3, "net_sales", 30.0), obs(1, "net_sales", 10.0)],
            vec![obs(2, "google_ads_cost", 5.0), obs(1, "google_ads_cost", 4.0)],
        ];
        let ds = DataAligner::new().align(&streams);

        let dates: Vec<_> = ds.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        // Every row carries every variable.
        for row in &ds.rows {
            assert_eq!(row.values.len(), 2);
        }
    }

    #[test]
    fn test_zero_fill_gap_stays_zero() {
        let streams = vec![vec![
            obs(1, "google_ads_cost", 100.0),
            obs(3, "google_ads_cost", 50.0),
            obs(1, "net_sales", 1.0),
            obs(2, "net_sales", 1.0),
            obs(3, "net_sales", 1.0),
        ]];
        let ds = DataAligner::new().align(&streams);
        // Day 2 has no spend observation: not carried forward.
        assert_eq!(ds.rows[1].get("google_ads_cost"), 0.0);
    }

    #[test]
    fn test_carry_forward_fills_gap() {
        let streams = vec![vec![
            obs(1, "sessions", 40.0),
            obs(3, "sessions", 60.0),
            obs(1, "x_cost", 1.0),
            obs(2, "x_cost", 1.0),
            obs(3, "x_cost", 1.0),
        ]];
        let ds = DataAligner::new().align(&streams);
        assert_eq!(ds.rows[1].get("sessions"), 40.0);
    }

    #[test]
    fn test_carry_forward_zero_before_first_observation() {
        let streams = vec![vec![
            obs(2, "sessions", 40.0),
            obs(1, "x_cost", 1.0),
        ]];
        let ds = DataAligner::new().align(&streams);
        assert_eq!(ds.rows[0].get("sessions"), 0.0);
        assert_eq!(ds.rows[1].get("sessions"), 40.0);
    }

    #[test]
    fn test_empty_stream_contributes_nothing() {
        let streams = vec![Vec::new(), vec![obs(1, "net_sales", 10.0)]];
        let ds = DataAligner::new().align(&streams);
        assert_eq!(ds.variables, vec!["net_sales".to_string()]);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_later_source_overwrites_duplicate_cell() {
        let streams = vec![
            vec![obs(1, "net_sales", 10.0)],
            vec![obs(1, "net_sales", 12.0)],
        ];
        let ds = DataAligner::new().align(&streams);
        assert_eq!(ds.rows[0].get("net_sales"), 12.0);
    }

    #[test]
    fn test_fill_policy_classification() {
        assert_eq!(fill_policy("google_ads_cost"), FillPolicy::ZeroFill);
        assert_eq!(fill_policy("google_ads_imp"), FillPolicy::ZeroFill);
        assert_eq!(fill_policy("google_ads_click"), FillPolicy::ZeroFill);
        assert_eq!(fill_policy("sale_flag"), FillPolicy::ZeroFill);
        assert_eq!(fill_policy("promo_event"), FillPolicy::ZeroFill);
        assert_eq!(fill_policy("net_sales"), FillPolicy::CarryForward);
        assert_eq!(fill_policy("orders"), FillPolicy::CarryForward);
    }
}
