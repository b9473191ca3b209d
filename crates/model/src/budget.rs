//! Same-total budget reallocation weighted by saturation-discounted
//! marginal return.

use serde::{Deserialize, Serialize};

/// Channels with near-zero or negative marginal ROI still receive this
/// minimum weight rather than being zeroed out.
const MARGINAL_ROI_FLOOR: f64 = 0.01;

/// Per-channel optimizer input, assembled from the regression fit and the
/// saturation estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetInput {
    pub id: String,
    pub current_spend: f64,
    /// Regression coefficient for the channel's spend column.
    pub coefficient: f64,
    /// Saturation percentage from the elasticity estimator.
    pub saturation_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBudget {
    pub id: String,
    pub current_spend: f64,
    pub recommended_spend: f64,
    /// Marginal return on the next unit of spend, discounted by saturation.
    pub marginal_roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub total_spend: f64,
    pub channels: Vec<ChannelBudget>,
    /// Estimated revenue lift of the reallocation, as an absolute
    /// percentage of current estimated contribution.
    pub expected_lift_pct: f64,
}

/// Reallocate the current total spend proportionally to each channel's
/// marginal ROI. The recommended spends sum to the current total.
pub fn optimize_budget(inputs: &[BudgetInput], scale_factor: f64) -> BudgetPlan {
    let total_spend: f64 = inputs.iter().map(|c| c.current_spend).sum();

    let marginal_rois: Vec<f64> = inputs
        .iter()
        .map(|c| c.coefficient * scale_factor * (1.0 - c.saturation_pct / 100.0))
        .collect();

    let weights: Vec<f64> = marginal_rois
        .iter()
        .map(|r| r.max(MARGINAL_ROI_FLOOR))
        .collect();
    let weight_sum: f64 = weights.iter().sum();

    let channels: Vec<ChannelBudget> = inputs
        .iter()
        .zip(&marginal_rois)
        .zip(&weights)
        .map(|((input, marginal_roi), weight)| ChannelBudget {
            id: input.id.clone(),
            current_spend: input.current_spend,
            recommended_spend: if weight_sum > 0.0 {
                total_spend * weight / weight_sum
            } else {
                input.current_spend
            },
            marginal_roi: *marginal_roi,
        })
        .collect();

    // Estimated contribution at a spend level reuses the fitted linear
    // relationship, clamped to non-negative.
    let contribution_at = |coefficient: f64, spend: f64| -> f64 {
        (coefficient * scale_factor * spend).max(0.0)
    };
    let current_total: f64 = inputs
        .iter()
        .map(|c| contribution_at(c.coefficient, c.current_spend))
        .sum();
    let optimized_total: f64 = inputs
        .iter()
        .zip(&channels)
        .map(|(input, plan)| contribution_at(input.coefficient, plan.recommended_spend))
        .sum();

    let expected_lift_pct = if current_total > 0.0 {
        ((optimized_total - current_total) / current_total * 100.0).abs()
    } else {
        0.0
    };

    BudgetPlan {
        total_spend,
        channels,
        expected_lift_pct,
    }
}
