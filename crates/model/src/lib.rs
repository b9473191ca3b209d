//! Numerical core of the attribution engine — least-squares regression,
//! fit diagnostics, revenue decomposition, saturation estimation, and
//! budget reallocation. Everything here is a pure function over immutable
//! inputs; identical input always yields identical output.

pub mod accuracy;
pub mod budget;
pub mod contribution;
pub mod regression;
pub mod saturation;

pub use accuracy::{mape, r_squared};
pub use budget::{optimize_budget, BudgetInput, BudgetPlan, ChannelBudget};
pub use contribution::{decompose, ChannelContribution, Decomposition};
pub use regression::{fit_least_squares, RegressionFit};
pub use saturation::estimate_saturation;
