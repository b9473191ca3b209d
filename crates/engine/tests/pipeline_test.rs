//! End-to-end pipeline scenarios: synthetic shop datasets run through the
//! full orchestrator, checked against the result-document contract.

use chrono::NaiveDate;
use mmm_core::config::AnalysisConfig;
use mmm_core::types::Observation;
use mmm_engine::{AnalysisOrchestrator, AnalysisRequest, AnalysisStatus};

const TOL: f64 = 1e-6;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
}

fn obs(d: u32, var: &str, value: f64) -> Observation {
    Observation::new(day(d), var, value)
}

fn run(streams: Vec<Vec<Observation>>) -> mmm_engine::AnalysisOutcome {
    AnalysisOrchestrator::new(AnalysisConfig::default()).run(AnalysisRequest::new(streams))
}

/// Two channels over 10 days: channel A's spend perfectly predicts revenue
/// with slope 4, channel B never spends.
fn perfect_fit_streams() -> Vec<Vec<Observation>> {
    let mut sales = Vec::new();
    let mut ads = Vec::new();
    for d in 1..=10 {
        let spend_a = d as f64 * 10.0;
        sales.push(obs(d, "net_sales", 50.0 + 4.0 * spend_a));
        sales.push(obs(d, "orders", 5.0));
        ads.push(obs(d, "alpha_ads_cost", spend_a));
        ads.push(obs(d, "beta_ads_cost", 0.0));
    }
    vec![sales, ads]
}

#[test]
fn perfect_predictor_gives_r2_one_and_zero_for_idle_channel() {
    let outcome = run(perfect_fit_streams());
    assert_eq!(outcome.status, AnalysisStatus::Completed);
    let result = outcome.result.unwrap();

    assert!((result.summary.r2 - 1.0).abs() < TOL, "r2 = {}", result.summary.r2);
    assert!(result.summary.mape < TOL, "mape = {}", result.summary.mape);

    let beta = result
        .channels
        .iter()
        .find(|c| c.channel == "beta_ads")
        .unwrap();
    assert_eq!(beta.contribution, 0.0);
    assert_eq!(beta.roas, 0.0);
}

#[test]
fn contribution_shares_complement_baseline_share() {
    let outcome = run(perfect_fit_streams());
    let result = outcome.result.unwrap();

    let pct_sum: f64 = result.channels.iter().map(|c| c.contribution_pct).sum();
    assert!(
        (pct_sum - (100.0 - result.summary.base_pct)).abs() < TOL,
        "channel shares {pct_sum} vs base {}",
        result.summary.base_pct
    );

    // Channels come back sorted by attributed revenue, descending.
    for pair in result.channels.windows(2) {
        assert!(pair[0].contribution >= pair[1].contribution);
    }
}

#[test]
fn optimized_budget_conserves_total_spend() {
    let mut sales = Vec::new();
    let mut ads = Vec::new();
    for d in 1..=30 {
        sales.push(obs(d, "net_sales", 500.0 + 12.0 * d as f64));
        ads.push(obs(d, "google_ads_cost", 20.0 + d as f64));
        ads.push(obs(d, "meta_ads_cost", 35.0 + (d % 7) as f64));
        ads.push(obs(d, "tiktok_ads_cost", 5.0 + (d % 3) as f64));
    }
    let outcome = run(vec![sales, ads]);
    let result = outcome.result.unwrap();

    let budget = &result.budget_optimization;
    let current: f64 = budget.current_spend.values().sum();
    let optimized: f64 = budget.optimized_spend.values().sum();
    assert!((current - optimized).abs() < TOL);
    assert!((current - result.summary.total_spend).abs() < TOL);
    assert!(budget.expected_lift >= 0.0);
}

#[test]
fn saturation_stays_in_range_with_zero_for_constant_spend() {
    let mut stream = Vec::new();
    for d in 1..=14 {
        stream.push(obs(d, "net_sales", 300.0 + 7.0 * d as f64));
        // Constant positive spend: no variance, no evidence.
        stream.push(obs(d, "flat_ads_cost", 40.0));
        stream.push(obs(d, "vary_ads_cost", d as f64 * 3.0));
    }
    let outcome = run(vec![stream]);
    let result = outcome.result.unwrap();

    let flat = result
        .channels
        .iter()
        .find(|c| c.channel == "flat_ads")
        .unwrap();
    assert_eq!(flat.saturation_pct, 0.0);

    let vary = result
        .channels
        .iter()
        .find(|c| c.channel == "vary_ads")
        .unwrap();
    assert!((5.0..=95.0).contains(&vary.saturation_pct));
}

#[test]
fn zero_revenue_dataset_completes_without_division_errors() {
    let mut stream = Vec::new();
    for d in 1..=10 {
        stream.push(obs(d, "net_sales", 0.0));
        stream.push(obs(d, "google_ads_cost", d as f64));
    }
    let outcome = run(vec![stream]);
    assert_eq!(outcome.status, AnalysisStatus::Completed);
    let result = outcome.result.unwrap();

    assert_eq!(result.summary.base_pct, 0.0);
    assert!(result.summary.r2.is_finite());
    assert!(result.summary.mape.is_finite());
    assert!(result.summary.overall_roas.is_finite());
    for channel in &result.channels {
        assert!(channel.contribution.is_finite());
        assert!(channel.contribution_pct.is_finite());
        assert!(channel.roas.is_finite());
        assert!(channel.cpa.is_finite());
        assert!(channel.marginal_roi.is_finite());
    }
}

#[test]
fn identical_input_yields_identical_output() {
    let first = run(perfect_fit_streams()).result.unwrap();
    let second = run(perfect_fit_streams()).result.unwrap();
    assert_eq!(first, second);
}

#[test]
fn zero_fill_gap_flows_through_to_spend_totals() {
    // Spend is only observed on odd days; revenue every day. Missing spend
    // days must count as 0, not carry forward.
    let mut stream = Vec::new();
    for d in 1..=10 {
        stream.push(obs(d, "net_sales", 100.0 + d as f64));
        if d % 2 == 1 {
            stream.push(obs(d, "google_ads_cost", 10.0));
        }
    }
    let outcome = run(vec![stream]);
    let result = outcome.result.unwrap();
    // 5 observed days × 10, gaps zero-filled.
    assert!((result.summary.total_spend - 50.0).abs() < TOL);
    assert_eq!(result.summary.data_points, 10);
}

#[test]
fn result_serializes_with_contract_field_names() {
    let result = run(perfect_fit_streams()).result.unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["summary"]["totalRevenue"].is_number());
    assert!(json["summary"]["dateRange"]["start"].is_string());
    assert!(json["channels"][0]["contributionPct"].is_number());
    assert!(json["channels"][0]["saturationPct"].is_number());
    assert!(json["budgetOptimization"]["expectedLift"].is_number());
}

#[test]
fn date_range_spans_union_of_all_streams() {
    let streams = vec![
        vec![obs(3, "net_sales", 10.0), obs(5, "net_sales", 20.0)],
        vec![obs(1, "x_ads_cost", 1.0), obs(4, "x_ads_cost", 2.0)],
    ];
    let outcome = run(streams);
    let result = outcome.result.unwrap();
    assert_eq!(result.summary.date_range.start, day(1));
    assert_eq!(result.summary.date_range.end, day(5));
    assert_eq!(result.summary.data_points, 4);
}
