pub mod config;
pub mod error;
pub mod types;

pub use config::AnalysisConfig;
pub use error::{MmmError, MmmResult};
pub use types::{ChannelSpec, Dataset, FillPolicy, MergedRow, Observation};
