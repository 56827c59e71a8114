/*!
 * Two-phase bounded-concurrency pipeline.
 *
 * Phase 1 runs every copy, phase 2 every translation, each through a pool of
 * at most `workers` concurrent tasks. Phase 2 starts only once every phase-1
 * task has finished or been abandoned. Task results travel back as values and
 * are tallied here; one failure never cancels its siblings.
 */

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::cancellation::CancellationController;
use crate::errors::DocumentError;
use crate::replicator::{EnumerationFailure, WorkItem};
use crate::translation::document::DocumentReport;

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Copy,
    Translate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Translate => write!(f, "translate"),
        }
    }
}

/// Terminal result of one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded(Option<DocumentReport>),
    Failed(String),
    /// Skipped or stopped because of a shutdown request; not a failure
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub phase: Phase,
    pub source: PathBuf,
    pub outcome: TaskOutcome,
}

/// Executes a single work item
#[async_trait]
pub trait WorkExecutor: Send + Sync + 'static {
    /// Returns the document report for translations, `None` for copies.
    /// `Err(DocumentError::Cancelled)` marks the item abandoned.
    async fn execute(&self, item: &WorkItem) -> Result<Option<DocumentReport>, DocumentError>;
}

/// Progress callback: `(phase, completed, total)`
pub type ProgressCallback = Arc<dyn Fn(Phase, usize, usize) + Send + Sync>;

/// Per-phase counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseTally {
    pub succeeded: usize,
    pub failed: usize,
    pub abandoned: usize,
}

impl PhaseTally {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.abandoned
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub phase: Phase,
    pub path: PathBuf,
    pub cause: String,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Completed,
    CompletedWithFailures(usize),
    Terminated,
}

impl RunStatus {
    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::CompletedWithFailures(_) => 2,
            Self::Terminated => 130,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "All done: the run completed fully"),
            Self::CompletedWithFailures(n) => {
                write!(f, "All done: the run completed fully with {} per-item failure(s)", n)
            }
            Self::Terminated => write!(f, "Terminated by user: output is partial"),
        }
    }
}

/// Aggregated outcome of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub copies: PhaseTally,
    pub translations: PhaseTally,
    pub failures: Vec<FailureRecord>,
    pub enumeration_failures: Vec<EnumerationFailure>,
    pub translated_nodes: usize,
    pub cache_hits: usize,
    pub unrestored_placeholders: usize,
    pub xml_declarations_stripped: usize,
    pub cancelled: bool,
    pub elapsed_secs: f64,
}

impl RunSummary {
    pub fn status(&self) -> RunStatus {
        if self.cancelled {
            return RunStatus::Terminated;
        }
        match self.failures.len() + self.enumeration_failures.len() {
            0 => RunStatus::Completed,
            n => RunStatus::CompletedWithFailures(n),
        }
    }

    fn record(&mut self, report: TaskReport) {
        let tally = match report.phase {
            Phase::Copy => &mut self.copies,
            Phase::Translate => &mut self.translations,
        };
        match report.outcome {
            TaskOutcome::Succeeded(document) => {
                tally.succeeded += 1;
                if let Some(document) = document {
                    self.translated_nodes += document.translated_nodes;
                    self.cache_hits += document.cache_hits;
                    self.unrestored_placeholders += document.unrestored_placeholders;
                    if document.xml_declaration_stripped {
                        self.xml_declarations_stripped += 1;
                    }
                }
            }
            TaskOutcome::Failed(cause) => {
                tally.failed += 1;
                self.failures.push(FailureRecord {
                    phase: report.phase,
                    path: report.source,
                    cause,
                });
            }
            TaskOutcome::Abandoned => tally.abandoned += 1,
        }
    }
}

/// Runs work items in two ordered phases with bounded concurrency
#[derive(Clone)]
pub struct PipelineScheduler {
    workers: usize,
    cancellation: CancellationController,
    progress: Option<ProgressCallback>,
}

impl PipelineScheduler {
    /// A pool of `workers` concurrent tasks per phase (at least one)
    pub fn new(workers: usize, cancellation: CancellationController) -> Self {
        Self {
            workers: workers.max(1),
            cancellation,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute all items; never fails, every outcome lands in the summary
    pub async fn run<E: WorkExecutor>(&self, executor: Arc<E>, items: Vec<WorkItem>) -> RunSummary {
        let start = Instant::now();
        let (translations, copies): (Vec<WorkItem>, Vec<WorkItem>) =
            items.into_iter().partition(WorkItem::is_translation);

        let mut summary = RunSummary::default();

        for report in self.run_phase(Phase::Copy, copies, &executor).await {
            summary.record(report);
        }
        for report in self.run_phase(Phase::Translate, translations, &executor).await {
            summary.record(report);
        }

        summary.cancelled = self.cancellation.is_shutting_down();
        summary.elapsed_secs = start.elapsed().as_secs_f64();
        summary
    }

    async fn run_phase<E: WorkExecutor>(
        &self,
        phase: Phase,
        items: Vec<WorkItem>,
        executor: &Arc<E>,
    ) -> Vec<TaskReport> {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }
        info!("Starting {} phase: {} item(s), {} worker(s)", phase, total, self.workers);
        self.notify(phase, 0, total);

        let mut tasks = stream::iter(items)
            .map(|item| {
                let executor = Arc::clone(executor);
                let cancellation = self.cancellation.clone();
                async move {
                    let source = item.source().to_path_buf();
                    // checkpoint: the worker is about to dequeue this item
                    if cancellation.is_shutting_down() {
                        return TaskReport {
                            phase,
                            source,
                            outcome: TaskOutcome::Abandoned,
                        };
                    }

                    let handle = tokio::spawn(async move { executor.execute(&item).await });
                    let outcome = match handle.await {
                        Ok(Ok(document)) => TaskOutcome::Succeeded(document),
                        Ok(Err(DocumentError::Cancelled)) => TaskOutcome::Abandoned,
                        Ok(Err(e)) => TaskOutcome::Failed(e.to_string()),
                        Err(e) => TaskOutcome::Failed(format!("worker task failed: {}", e)),
                    };
                    TaskReport {
                        phase,
                        source,
                        outcome,
                    }
                }
            })
            .buffer_unordered(self.workers);

        let mut reports = Vec::with_capacity(total);
        while let Some(report) = tasks.next().await {
            Self::log_report(&report);
            reports.push(report);
            self.notify(phase, reports.len(), total);
        }
        reports
    }

    fn notify(&self, phase: Phase, completed: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(phase, completed, total);
        }
    }

    fn log_report(report: &TaskReport) {
        match (&report.outcome, report.phase) {
            (TaskOutcome::Succeeded(_), Phase::Copy) => debug!("Copied {:?}", report.source),
            (TaskOutcome::Succeeded(_), Phase::Translate) => {
                info!("Translated {:?}", report.source)
            }
            (TaskOutcome::Failed(cause), Phase::Copy) => {
                error!("Failed to copy {:?}: {}", report.source, cause)
            }
            (TaskOutcome::Failed(cause), Phase::Translate) => {
                error!("Failed to translate {:?}: {}", report.source, cause)
            }
            (TaskOutcome::Abandoned, _) => debug!("Abandoned {:?}", report.source),
        }
    }
}
