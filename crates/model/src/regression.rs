//! Ordinary least squares via the normal equations, solved with
//! Gauss-Jordan elimination and partial pivoting. Column counts stay small
//! (one intercept plus tens of regressors at most), so the O(p³) solve is
//! negligible and fully deterministic.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Pivot magnitudes below this are treated as not independently solvable.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// A fitted linear model: intercept plus one coefficient per regressor
/// column, in the column order of the design matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    /// Base value of the dependent variable per day.
    pub intercept: f64,
    /// Coefficients for the non-intercept columns, in input order.
    pub coefficients: Vec<f64>,
    /// Indices into the full column set (0 = intercept) whose pivot fell
    /// below tolerance. Their coefficients are forced to 0.
    pub degenerate_columns: Vec<usize>,
}

impl RegressionFit {
    /// Fitted value for one design-matrix row (without intercept column).
    pub fn predict(&self, regressors: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(regressors)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

/// Fit `y ~ 1 + regressors` by least squares.
///
/// `regressors` holds one column per coefficient; every column must have
/// the same length as `y`. Near-singular columns do not fail the fit: their
/// coefficients are zeroed out and reported in
/// [`RegressionFit::degenerate_columns`].
pub fn fit_least_squares(regressors: &[Vec<f64>], y: &[f64]) -> RegressionFit {
    let n = y.len();
    let p = regressors.len() + 1;

    // Normal equations: (XᵗX) β = Xᵗy with X = [1 | regressors].
    let column = |j: usize, i: usize| -> f64 {
        if j == 0 {
            1.0
        } else {
            regressors[j - 1][i]
        }
    };

    let mut xtx = vec![vec![0.0f64; p]; p];
    let mut xty = vec![0.0f64; p];
    for i in 0..n {
        for j in 0..p {
            let xj = column(j, i);
            xty[j] += xj * y[i];
            for k in j..p {
                xtx[j][k] += xj * column(k, i);
            }
        }
    }
    // Mirror the upper triangle.
    for j in 0..p {
        for k in 0..j {
            xtx[j][k] = xtx[k][j];
        }
    }

    let (beta, degenerate_columns) = solve_gauss_jordan(xtx, xty);

    if !degenerate_columns.is_empty() {
        warn!(
            columns = ?degenerate_columns,
            "near-singular pivot; affected coefficients zeroed"
        );
    }

    RegressionFit {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
        degenerate_columns,
    }
}

/// Gauss-Jordan elimination with partial pivoting. A column whose best
/// remaining pivot is below tolerance is skipped and its solution entry
/// forced to 0, keeping the output finite for near-degenerate systems.
fn solve_gauss_jordan(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> (Vec<f64>, Vec<usize>) {
    let p = b.len();
    let mut degenerate = Vec::new();

    for col in 0..p {
        // Largest absolute pivot among the remaining rows.
        let mut pivot_row = col;
        for row in (col + 1)..p {
            if a[row][col].abs() > a[pivot_row][col].abs() {
                pivot_row = row;
            }
        }

        if a[pivot_row][col].abs() < PIVOT_TOLERANCE {
            degenerate.push(col);
            continue;
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col][col];
        for k in col..p {
            a[col][k] /= pivot;
        }
        b[col] /= pivot;

        for row in 0..p {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..p {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    for &col in &degenerate {
        b[col] = 0.0;
    }

    (b, degenerate)
}
