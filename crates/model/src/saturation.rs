//! Estimates how far along its diminishing-returns curve a channel's spend
//! sits, from the empirical elasticity of contribution to spend. This is a
//! closed-form approximation, not a fitted saturation curve.

/// Clamp bounds for the raw elasticity, guarding against pathological
/// values from near-constant series.
const ELASTICITY_MIN: f64 = 0.01;
const ELASTICITY_MAX: f64 = 1.5;

/// Saturation percentage bounds for the normal case.
const SATURATION_FLOOR: f64 = 5.0;
const SATURATION_CEIL: f64 = 95.0;

const NEAR_ZERO: f64 = 1e-9;

/// Saturation percentage in `[5, 95]` for a channel's daily spend and
/// contribution series. Elasticity near 0 (contribution insensitive to
/// spend changes) maps to 95; elasticity near 1 (proportional) maps to 5.
///
/// Returns 0, deliberately below the normal floor, when there is not
/// enough evidence: an empty series, non-positive total spend, or zero
/// spend variance.
pub fn estimate_saturation(spend: &[f64], contribution: &[f64]) -> f64 {
    let n = spend.len();
    if n == 0 || spend.iter().sum::<f64>() <= 0.0 {
        return 0.0;
    }

    let mean_spend = spend.iter().sum::<f64>() / n as f64;
    let var_spend = spend.iter().map(|s| (s - mean_spend).powi(2)).sum::<f64>() / n as f64;
    if var_spend == 0.0 {
        return 0.0;
    }

    let mean_contribution = contribution.iter().sum::<f64>() / n as f64;
    let covariance = spend
        .iter()
        .zip(contribution)
        .map(|(s, c)| (s - mean_spend) * (c - mean_contribution))
        .sum::<f64>()
        / n as f64;

    // Percent change in contribution per percent change in spend.
    let elasticity = if mean_contribution.abs() < NEAR_ZERO {
        0.0
    } else {
        (covariance / var_spend) * (mean_spend / mean_contribution)
    };
    let elasticity = elasticity.clamp(ELASTICITY_MIN, ELASTICITY_MAX);

    ((1.0 - elasticity) * 100.0).clamp(SATURATION_FLOOR, SATURATION_CEIL)
}
