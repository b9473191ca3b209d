//! Result document consumed by the report-generation collaborator. Field
//! names are a stable contract; any structured serialization that preserves
//! them satisfies it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level output of one analysis run. Created once, immutable
/// thereafter, superseded only by a new run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: Summary,
    /// Sorted descending by attributed revenue.
    pub channels: Vec<ChannelResult>,
    pub budget_optimization: BudgetOptimization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_revenue: f64,
    pub total_spend: f64,
    pub overall_roas: f64,
    pub base_revenue: f64,
    pub base_pct: f64,
    pub r2: f64,
    pub mape: f64,
    pub date_range: DateRange,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
    pub channel: String,
    pub label: String,
    pub contribution: f64,
    pub contribution_pct: f64,
    pub roas: f64,
    pub cpa: f64,
    pub total_spend: f64,
    pub saturation_pct: f64,
    pub marginal_roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOptimization {
    pub current_spend: BTreeMap<String, f64>,
    pub optimized_spend: BTreeMap<String, f64>,
    /// Overall estimated revenue lift of the reallocation, in percent.
    pub expected_lift: f64,
}

/// User-friendly display name for a channel id. Known ad platforms get
/// their proper names; everything else is title-cased.
pub fn channel_label(id: &str) -> String {
    match id {
        "google_ads" => "Google Ads".to_string(),
        "meta_ads" => "Meta Ads".to_string(),
        "line_ads" => "LINE Ads".to_string(),
        "yahoo_ads" => "Yahoo Ads".to_string(),
        "tiktok_ads" => "TikTok Ads".to_string(),
        "amazon_ads" => "Amazon Ads".to_string(),
        "rakuten_ads" => "Rakuten Ads".to_string(),
        other => other
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
