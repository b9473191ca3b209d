//! Fire-and-forget job dispatch around the synchronous pipeline. The
//! caller spawns a job, polls its status, and the outcome lands in a
//! [`ResultSink`]. Queueing, retry, and per-shop serialization policies
//! belong to the surrounding layer.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::orchestrator::{
    AnalysisOrchestrator, AnalysisOutcome, AnalysisRequest, AnalysisStatus,
};

/// Destination for completed (or failed) analysis outcomes. The persistent
/// implementation lives with the storage collaborator.
pub trait ResultSink: Send + Sync {
    fn store(&self, outcome: &AnalysisOutcome);
}

/// In-memory sink keyed by analysis id, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryResultSink {
    outcomes: DashMap<Uuid, AnalysisOutcome>,
}

impl InMemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, analysis_id: &Uuid) -> Option<AnalysisOutcome> {
        self.outcomes.get(analysis_id).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl ResultSink for InMemoryResultSink {
    fn store(&self, outcome: &AnalysisOutcome) {
        self.outcomes.insert(outcome.analysis_id, outcome.clone());
    }
}

/// Move the shared status cell forward, asserting the lifecycle is
/// respected: PENDING → RUNNING → {COMPLETED, FAILED}.
fn advance_status(cell: &RwLock<AnalysisStatus>, to: AnalysisStatus) {
    let mut status = cell.write();
    debug_assert!(
        status.can_transition(&to),
        "invalid status transition {status:?} -> {to:?}"
    );
    *status = to;
}

/// Handle to one in-flight analysis run.
pub struct AnalysisJob {
    analysis_id: Uuid,
    status: Arc<RwLock<AnalysisStatus>>,
    handle: tokio::task::JoinHandle<AnalysisOutcome>,
}

impl AnalysisJob {
    /// Start the pipeline on a blocking worker thread and return
    /// immediately with a pollable handle.
    pub fn spawn(
        orchestrator: AnalysisOrchestrator,
        request: AnalysisRequest,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let analysis_id = request.id;
        let status = Arc::new(RwLock::new(AnalysisStatus::Pending));
        let job_status = Arc::clone(&status);

        let handle = tokio::task::spawn_blocking(move || {
            advance_status(&job_status, AnalysisStatus::Running);
            let started = std::time::Instant::now();

            let outcome = orchestrator.run(request);

            sink.store(&outcome);
            advance_status(&job_status, outcome.status);
            info!(
                %analysis_id,
                status = ?outcome.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "analysis job finished"
            );
            outcome
        });

        Self {
            analysis_id,
            status,
            handle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.analysis_id
    }

    /// Current lifecycle status, for polling callers.
    pub fn status(&self) -> AnalysisStatus {
        *self.status.read()
    }

    /// Wait for the run to reach a terminal state and take its outcome.
    pub async fn wait(self) -> AnalysisOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(analysis_id = %self.analysis_id, error = %err, "analysis job aborted");
                AnalysisOutcome::failed(self.analysis_id, format!("analysis job aborted: {err}"))
            }
        }
    }
}
