//! Sequences the analysis pipeline behind a single failure boundary.
//! Nothing, error or panic, propagates past [`AnalysisOrchestrator::run`];
//! every failure becomes a FAILED outcome with a human-readable reason.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use mmm_core::config::AnalysisConfig;
use mmm_core::error::{MmmError, MmmResult};
use mmm_core::types::{ChannelSpec, Dataset, Observation};
use mmm_dataset::aligner::DataAligner;
use mmm_dataset::features::append_time_features;
use mmm_dataset::validator::validate_dataset;
use mmm_model::budget::BudgetInput;
use mmm_model::{decompose, estimate_saturation, fit_least_squares, mape, optimize_budget, r_squared};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::result::{
    channel_label, AnalysisResult, BudgetOptimization, ChannelResult, DateRange, Summary,
};

/// Lifecycle of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Valid transitions: PENDING → RUNNING → {COMPLETED, FAILED}.
    pub fn can_transition(&self, to: &Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }
}

/// One analysis request: observation streams from the upstream collectors
/// plus the run's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub id: Uuid,
    pub streams: Vec<Vec<Observation>>,
}

impl AnalysisRequest {
    pub fn new(streams: Vec<Vec<Observation>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            streams,
        }
    }
}

/// Terminal record of a run. The result is attached only when the status
/// is COMPLETED; it is never visible half-written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis_id: Uuid,
    pub status: AnalysisStatus,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisOutcome {
    pub fn failed(analysis_id: Uuid, reason: String) -> Self {
        let now = Utc::now();
        Self {
            analysis_id,
            status: AnalysisStatus::Failed,
            result: None,
            error: Some(reason),
            warnings: Vec::new(),
            started_at: now,
            completed_at: now,
        }
    }
}

/// Runs the full pipeline: align → validate → fit → evaluate → decompose →
/// saturate → optimize, then assembles the result document.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
}

impl AnalysisOrchestrator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run one analysis to completion or failure. Synchronous, CPU-bound,
    /// deterministic; reentrant and stateless between calls.
    pub fn run(&self, request: AnalysisRequest) -> AnalysisOutcome {
        let analysis_id = request.id;
        let started_at = Utc::now();
        info!(%analysis_id, "analysis running");

        let executed = catch_unwind(AssertUnwindSafe(|| self.execute(&request)));

        let completed_at = Utc::now();
        match executed {
            Ok(Ok((result, warnings))) => {
                info!(%analysis_id, "analysis completed");
                AnalysisOutcome {
                    analysis_id,
                    status: AnalysisStatus::Completed,
                    result: Some(result),
                    error: None,
                    warnings,
                    started_at,
                    completed_at,
                }
            }
            Ok(Err(err)) => {
                warn!(%analysis_id, error = %err, "analysis failed");
                AnalysisOutcome {
                    analysis_id,
                    status: AnalysisStatus::Failed,
                    result: None,
                    error: Some(err.to_string()),
                    warnings: Vec::new(),
                    started_at,
                    completed_at,
                }
            }
            Err(panic) => {
                let reason = panic_message(panic);
                warn!(%analysis_id, error = %reason, "analysis panicked");
                AnalysisOutcome {
                    analysis_id,
                    status: AnalysisStatus::Failed,
                    result: None,
                    error: Some(reason),
                    warnings: Vec::new(),
                    started_at,
                    completed_at,
                }
            }
        }
    }

    fn execute(&self, request: &AnalysisRequest) -> MmmResult<(AnalysisResult, Vec<String>)> {
        let config = &self.config;

        let mut dataset = DataAligner::new().align(&request.streams);
        if dataset.is_empty() {
            return Err(MmmError::EmptyDataset(
                "no observations after alignment".to_string(),
            ));
        }

        let channels: Vec<ChannelSpec> = dataset
            .detect_channels(&config.cost_suffix)
            .into_iter()
            .filter(|c| !config.excluded_regressors.contains(&c.cost_key))
            .collect();
        if channels.is_empty() {
            return Err(MmmError::NoChannelData(config.cost_suffix.clone()));
        }

        let report = validate_dataset(&dataset, &channels, config);
        if !report.is_valid {
            return Err(MmmError::Validation(report.errors.join("; ")));
        }

        let mut extra_keys = self.extra_regressors(&dataset, &channels);
        if config.time_features {
            for key in append_time_features(&mut dataset) {
                if !config.excluded_regressors.contains(&key) && !extra_keys.contains(&key) {
                    extra_keys.push(key);
                }
            }
        }

        // Design matrix: channel spend columns, then any extra regressors.
        let mut columns: Vec<Vec<f64>> = channels
            .iter()
            .map(|c| dataset.column(&c.cost_key))
            .collect();
        for key in &extra_keys {
            columns.push(dataset.column(key));
        }
        let y = dataset.column(&config.dep_var);

        let fit = fit_least_squares(&columns, &y);

        let fitted: Vec<f64> = (0..dataset.len())
            .map(|i| {
                let row: Vec<f64> = columns.iter().map(|col| col[i]).collect();
                fit.predict(&row)
            })
            .collect();
        let r2 = r_squared(&y, &fitted);
        let mape_pct = mape(&y, &fitted);

        let total_revenue: f64 = y.iter().sum();
        let spend_totals: Vec<f64> = channels
            .iter()
            .map(|c| dataset.total(&c.cost_key))
            .collect();
        let total_spend: f64 = spend_totals.iter().sum();
        let total_acquisitions = dataset.total(&config.acquisition_var);

        let decomposition = decompose(
            &fit,
            &channels,
            &spend_totals,
            total_revenue,
            total_acquisitions,
            dataset.len(),
        );

        // Saturation per channel, from its daily spend and the fitted
        // daily contribution (coefficient × spend).
        let saturation_by_id: BTreeMap<String, f64> = channels
            .iter()
            .enumerate()
            .map(|(i, channel)| {
                let spend = dataset.column(&channel.cost_key);
                let contribution: Vec<f64> =
                    spend.iter().map(|s| fit.coefficients[i] * s).collect();
                (
                    channel.id.clone(),
                    estimate_saturation(&spend, &contribution),
                )
            })
            .collect();

        let budget_inputs: Vec<BudgetInput> = channels
            .iter()
            .enumerate()
            .map(|(i, channel)| BudgetInput {
                id: channel.id.clone(),
                current_spend: spend_totals[i],
                coefficient: fit.coefficients[i],
                saturation_pct: saturation_by_id[&channel.id],
            })
            .collect();
        let plan = optimize_budget(&budget_inputs, decomposition.scale_factor);

        let marginal_roi_by_id: BTreeMap<&str, f64> = plan
            .channels
            .iter()
            .map(|c| (c.id.as_str(), c.marginal_roi))
            .collect();

        let channel_results: Vec<ChannelResult> = decomposition
            .channels
            .iter()
            .map(|c| ChannelResult {
                channel: c.channel.id.clone(),
                label: channel_label(&c.channel.id),
                contribution: c.contribution,
                contribution_pct: c.contribution_pct,
                roas: c.roas,
                cpa: c.cpa,
                total_spend: c.spend,
                saturation_pct: saturation_by_id[&c.channel.id],
                marginal_roi: marginal_roi_by_id[c.channel.id.as_str()],
            })
            .collect();

        let attributed_total: f64 = channel_results.iter().map(|c| c.contribution).sum();
        let overall_roas = if total_spend > 0.0 {
            attributed_total / total_spend
        } else {
            0.0
        };

        let (start, end) = dataset.date_range().ok_or_else(|| {
            MmmError::Computation("dataset lost its rows mid-pipeline".to_string())
        })?;

        let result = AnalysisResult {
            summary: Summary {
                total_revenue,
                total_spend,
                overall_roas,
                base_revenue: decomposition.base_revenue,
                base_pct: decomposition.base_pct,
                r2,
                mape: mape_pct,
                date_range: DateRange { start, end },
                data_points: dataset.len(),
            },
            channels: channel_results,
            budget_optimization: BudgetOptimization {
                current_spend: plan
                    .channels
                    .iter()
                    .map(|c| (c.id.clone(), c.current_spend))
                    .collect(),
                optimized_spend: plan
                    .channels
                    .iter()
                    .map(|c| (c.id.clone(), c.recommended_spend))
                    .collect(),
                expected_lift: plan.expected_lift_pct,
            },
        };

        Ok((result, report.warnings))
    }

    /// Extra regressor columns: requested keys that exist in the dataset
    /// and are neither the dependent variable, a channel column, nor
    /// explicitly excluded.
    fn extra_regressors(&self, dataset: &Dataset, channels: &[ChannelSpec]) -> Vec<String> {
        self.config
            .extra_regressors
            .iter()
            .filter(|key| {
                dataset.has_variable(key)
                    && **key != self.config.dep_var
                    && !self.config.excluded_regressors.contains(key)
                    && !channels.iter().any(|c| {
                        c.cost_key == **key
                            || c.impression_key.as_deref() == Some(key.as_str())
                            || c.click_key.as_deref() == Some(key.as_str())
                    })
            })
            .cloned()
            .collect()
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("unexpected computation error: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("unexpected computation error: {message}")
    } else {
        "unexpected computation error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn obs(d: u32, var: &str, value: f64) -> Observation {
        Observation::new(day(d), var, value)
    }

    fn orchestrator() -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(AnalysisConfig::default())
    }

    #[test]
    fn test_empty_input_fails() {
        let outcome = orchestrator().run(AnalysisRequest::new(Vec::new()));
        assert_eq!(outcome.status, AnalysisStatus::Failed);
        assert!(outcome.result.is_none());
        assert!(outcome.error.unwrap().contains("empty"));
    }

    #[test]
    fn test_no_channels_fails() {
        let streams = vec![vec![obs(1, "net_sales", 100.0), obs(2, "net_sales", 110.0)]];
        let outcome = orchestrator().run(AnalysisRequest::new(streams));
        assert_eq!(outcome.status, AnalysisStatus::Failed);
        assert!(outcome.error.unwrap().contains("_cost"));
    }

    #[test]
    fn test_missing_dependent_variable_fails() {
        let streams = vec![vec![
            obs(1, "google_ads_cost", 10.0),
            obs(2, "google_ads_cost", 20.0),
        ]];
        let outcome = orchestrator().run(AnalysisRequest::new(streams));
        assert_eq!(outcome.status, AnalysisStatus::Failed);
        assert!(outcome.error.unwrap().contains("net_sales"));
    }

    #[test]
    fn test_successful_run_attaches_result() {
        let mut stream = Vec::new();
        for d in 1..=10 {
            stream.push(obs(d, "net_sales", 100.0 + 3.0 * d as f64));
            stream.push(obs(d, "google_ads_cost", d as f64));
        }
        let outcome = orchestrator().run(AnalysisRequest::new(vec![stream]));
        assert_eq!(outcome.status, AnalysisStatus::Completed);
        let result = outcome.result.unwrap();
        assert_eq!(result.summary.data_points, 10);
        assert_eq!(result.channels.len(), 1);
        assert_eq!(result.channels[0].channel, "google_ads");
        // 10 short rows: the validator should have warned.
        assert!(!outcome.warnings.is_empty());
    }

    #[test]
    fn test_time_features_fit_as_control_regressors() {
        let mut stream = Vec::new();
        for d in 1..=28 {
            let spend = ((d * 5) % 13) as f64 + 2.0;
            stream.push(obs(d, "google_ads_cost", spend));
            stream.push(obs(d, "net_sales", 500.0 + 4.0 * spend));
        }
        let mut config = AnalysisConfig::default();
        config.time_features = true;
        let outcome =
            AnalysisOrchestrator::new(config).run(AnalysisRequest::new(vec![stream]));

        assert_eq!(outcome.status, AnalysisStatus::Completed);
        let result = outcome.result.unwrap();
        // Synthesized calendar columns are controls, never channels.
        assert_eq!(result.channels.len(), 1);
        assert_eq!(result.channels[0].channel, "google_ads");
        assert!(result.summary.r2.is_finite());
        assert!(result.channels[0].contribution.is_finite());
    }

    #[test]
    fn test_status_transitions() {
        assert!(AnalysisStatus::Pending.can_transition(&AnalysisStatus::Running));
        assert!(AnalysisStatus::Running.can_transition(&AnalysisStatus::Completed));
        assert!(AnalysisStatus::Running.can_transition(&AnalysisStatus::Failed));
        assert!(!AnalysisStatus::Pending.can_transition(&AnalysisStatus::Completed));
        assert!(!AnalysisStatus::Completed.can_transition(&AnalysisStatus::Running));
        assert!(AnalysisStatus::Failed.is_terminal());
        assert!(!AnalysisStatus::Running.is_terminal());
    }

    #[test]
    fn test_status_serializes_screaming() {
        let json = serde_json::to_string(&AnalysisStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }
}
