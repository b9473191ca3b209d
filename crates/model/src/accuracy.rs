//! Goodness-of-fit metrics. Pure functions; they never fail.

/// Observations with magnitude below this are excluded from MAPE.
const NEAR_ZERO: f64 = 1e-9;

/// Coefficient of determination. Defined as 0 when the dependent series
/// has no variance.
pub fn r_squared(observed: &[f64], fitted: &[f64]) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(y, yhat)| (y - yhat).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Mean absolute percentage error, as a percentage. Rows with near-zero
/// observed values are excluded; 0 when no rows qualify.
pub fn mape(observed: &[f64], fitted: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (y, yhat) in observed.iter().zip(fitted) {
        if y.abs() > NEAR_ZERO {
            sum += ((y - yhat) / y).abs();
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64 * 100.0
    }
}
