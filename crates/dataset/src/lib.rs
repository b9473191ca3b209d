//! Dataset preparation — aligns per-source daily observations into one
//! table and validates it before model fitting.

pub mod aligner;
pub mod features;
pub mod validator;

pub use aligner::DataAligner;
pub use features::append_time_features;
pub use validator::{validate_dataset, DatasetStats, ValidationReport};
