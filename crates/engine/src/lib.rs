//! Attribution analysis engine — orchestrates dataset alignment, linear
//! attribution modeling, saturation estimation, and budget optimization
//! into a single run-to-completion pipeline with job dispatch around it.

pub mod job;
pub mod orchestrator;
pub mod result;

pub use job::{AnalysisJob, InMemoryResultSink, ResultSink};
pub use orchestrator::{
    AnalysisOrchestrator, AnalysisOutcome, AnalysisRequest, AnalysisStatus,
};
pub use result::{AnalysisResult, BudgetOptimization, ChannelResult, DateRange, Summary};
