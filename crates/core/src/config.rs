use serde::Deserialize;

/// Configuration for a single attribution analysis run. Loaded from
/// environment variables with the prefix `MMM__` or supplied directly by
/// the orchestrating layer.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Variable key of the dependent series the model explains.
    #[serde(default = "default_dep_var")]
    pub dep_var: String,
    /// Suffix convention that identifies channel cost columns.
    #[serde(default = "default_cost_suffix")]
    pub cost_suffix: String,
    /// Variable key holding the daily acquisition (order) count, used for
    /// cost-per-acquisition allocation. The column may be absent.
    #[serde(default = "default_acquisition_var")]
    pub acquisition_var: String,
    /// Extra variable keys to include as regressors alongside channel spend.
    /// Their coefficients are fitted but never attributed to a channel.
    #[serde(default)]
    pub extra_regressors: Vec<String>,
    /// Variable keys excluded from the regression even if requested.
    #[serde(default)]
    pub excluded_regressors: Vec<String>,
    /// Row count below which the validator emits a warning.
    #[serde(default = "default_recommended_rows")]
    pub recommended_rows: usize,
    /// Synthesize calendar control regressors (linear trend, weekend flag,
    /// annual sine/cosine seasonality) after alignment. Off by default.
    #[serde(default)]
    pub time_features: bool,
}

fn default_dep_var() -> String {
    "net_sales".to_string()
}
fn default_cost_suffix() -> String {
    "_cost".to_string()
}
fn default_acquisition_var() -> String {
    "orders".to_string()
}
fn default_recommended_rows() -> usize {
    60
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dep_var: default_dep_var(),
            cost_suffix: default_cost_suffix(),
            acquisition_var: default_acquisition_var(),
            extra_regressors: Vec::new(),
            excluded_regressors: Vec::new(),
            recommended_rows: default_recommended_rows(),
            time_features: false,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from `MMM__`-prefixed environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("MMM")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
