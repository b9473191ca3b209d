//! Splits observed revenue into a baseline part and a channel-attributable
//! part, and derives per-channel return and cost-efficiency metrics.

use mmm_core::types::ChannelSpec;
use serde::{Deserialize, Serialize};

use crate::regression::RegressionFit;

/// Per-channel slice of the revenue decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelContribution {
    pub channel: ChannelSpec,
    pub spend: f64,
    /// Unscaled `max(0, coefficient × spend)`.
    pub raw_contribution: f64,
    /// Scaled so channel contributions sum to media revenue.
    pub contribution: f64,
    /// Share of total revenue, in percent.
    pub contribution_pct: f64,
    /// Attributed revenue per unit of spend; 0 when spend is 0.
    pub roas: f64,
    /// Spend per allocated acquisition; 0 when nothing was allocated.
    pub cpa: f64,
}

/// Full decomposition of total revenue for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub base_revenue: f64,
    pub base_pct: f64,
    pub media_revenue: f64,
    /// Multiplier applied to raw contributions; 1 when media revenue or the
    /// raw sum is non-positive.
    pub scale_factor: f64,
    /// Sorted descending by scaled contribution.
    pub channels: Vec<ChannelContribution>,
}

/// Decompose total revenue given a fitted model.
///
/// `spend_totals` must be aligned with `channels`, which in turn must match
/// the first `channels.len()` coefficients of `fit`. Negative coefficients
/// are clamped to zero attribution: a channel estimated to hurt revenue is
/// reported as contributing nothing, not negative revenue.
pub fn decompose(
    fit: &RegressionFit,
    channels: &[ChannelSpec],
    spend_totals: &[f64],
    total_revenue: f64,
    total_acquisitions: f64,
    days: usize,
) -> Decomposition {
    let base_revenue = (fit.intercept * days as f64).max(0.0);
    let base_pct = if total_revenue > 0.0 {
        base_revenue / total_revenue * 100.0
    } else {
        0.0
    };
    let media_revenue = total_revenue - base_revenue;

    let raw: Vec<f64> = channels
        .iter()
        .enumerate()
        .map(|(i, _)| (fit.coefficients[i] * spend_totals[i]).max(0.0))
        .collect();
    let raw_sum: f64 = raw.iter().sum();

    let scale_factor = if raw_sum > 0.0 && media_revenue > 0.0 {
        media_revenue / raw_sum
    } else {
        1.0
    };

    // Acquisitions follow each channel's share of raw contribution, scaled
    // by media revenue's share of total revenue.
    let media_share = if total_revenue > 0.0 {
        (media_revenue / total_revenue).max(0.0)
    } else {
        0.0
    };

    let mut results: Vec<ChannelContribution> = channels
        .iter()
        .enumerate()
        .map(|(i, channel)| {
            let spend = spend_totals[i];
            let contribution = raw[i] * scale_factor;
            let roas = if spend > 0.0 { contribution / spend } else { 0.0 };
            let allocated = if raw_sum > 0.0 {
                total_acquisitions * (raw[i] / raw_sum) * media_share
            } else {
                0.0
            };
            let cpa = if allocated > 0.0 { spend / allocated } else { 0.0 };
            let contribution_pct = if total_revenue > 0.0 {
                contribution / total_revenue * 100.0
            } else {
                0.0
            };
            ChannelContribution {
                channel: channel.clone(),
                spend,
                raw_contribution: raw[i],
                contribution,
                contribution_pct,
                roas,
                cpa,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.channel.id.cmp(&b.channel.id))
    });

    Decomposition {
        base_revenue,
        base_pct,
        media_revenue,
        scale_factor,
        channels: results,
    }
}
