use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{ensure_disjoint_roots, Config};
use crate::cancellation::CancellationController;
use crate::errors::{DocumentError, FilesystemError};
use crate::file_utils::FileManager;
use crate::providers::{self, Provider};
use crate::replicator::{TreeReplicator, WorkItem};
use crate::scheduler::{Phase, PipelineScheduler, RunStatus, RunSummary, WorkExecutor};
use crate::translation::document::{DocumentReport, DocumentTranslator};
use crate::translation::TranslationService;

// @module: Application controller for mirroring a documentation tree

/// Executes copy and translate items against the real filesystem
pub struct MirrorExecutor {
    translator: DocumentTranslator,
    cancellation: CancellationController,
}

impl MirrorExecutor {
    pub fn new(translator: DocumentTranslator, cancellation: CancellationController) -> Self {
        Self {
            translator,
            cancellation,
        }
    }
}

#[async_trait]
impl WorkExecutor for MirrorExecutor {
    async fn execute(&self, item: &WorkItem) -> Result<Option<DocumentReport>, DocumentError> {
        if self.cancellation.is_shutting_down() {
            return Err(DocumentError::Cancelled);
        }

        match item {
            WorkItem::CopyTask {
                source,
                destination,
            } => {
                let (from, to) = (source.clone(), destination.clone());
                tokio::task::spawn_blocking(move || {
                    FileManager::copy_file_with_metadata(&from, &to)
                })
                .await
                .map_err(|e| FilesystemError::Copy {
                    from: source.clone(),
                    to: destination.clone(),
                    source: std::io::Error::other(e),
                })??;
                Ok(None)
            }
            WorkItem::TranslateTask {
                source,
                destination,
                source_language,
                target_language,
            } => {
                let report = self
                    .translator
                    .translate_file(source, destination, source_language, target_language)
                    .await?;
                if report.unrestored_placeholders > 0 {
                    warn!(
                        "{:?}: {} placeholder(s) could not be restored and remain in the output",
                        destination, report.unrestored_placeholders
                    );
                }
                Ok(Some(report))
            }
        }
    }
}

/// Main application controller for a mirror-and-translate run
pub struct Controller {
    // @field: App configuration
    config: Config,
    provider: Arc<dyn Provider>,
    cancellation: CancellationController,
}

impl Controller {
    // @method: Create a controller with the backend named by the configuration
    pub fn with_config(config: Config, cancellation: CancellationController) -> Result<Self> {
        let provider = providers::create_provider(&config.translation)
            .context("Failed to create translation provider")?;
        Ok(Self::with_provider(config, provider, cancellation))
    }

    /// Create a controller with an explicit backend
    pub fn with_provider(
        config: Config,
        provider: Arc<dyn Provider>,
        cancellation: CancellationController,
    ) -> Self {
        Self {
            config,
            provider,
            cancellation,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancellation(&self) -> &CancellationController {
        &self.cancellation
    }

    /// Mirror the configured source directory into the configured destination
    pub async fn run(&self) -> Result<RunSummary> {
        let source = self.config.source_path();
        let destination = self.config.destination_path();
        self.run_paths(&source, &destination).await
    }

    /// Mirror `source` into `destination`, deleting `destination` first.
    ///
    /// Errors are setup failures only; per-item failures end up in the summary.
    pub async fn run_paths(&self, source: &Path, destination: &Path) -> Result<RunSummary> {
        info!(
            "Mirroring {:?} -> {:?} ({} -> {}) with {} and {} worker(s)",
            source,
            destination,
            self.config.source_language,
            self.config.target_language,
            self.provider.name(),
            self.config.workers
        );

        if !FileManager::dir_exists(source) {
            return Err(anyhow!("Source directory does not exist: {:?}", source));
        }
        ensure_disjoint_roots(source, destination)?;

        let destination_root = destination.to_path_buf();
        let removed = tokio::task::spawn_blocking(move || {
            FileManager::remove_tree_if_exists(&destination_root)
        })
        .await
        .context("Destination cleanup task failed")?
        .context("Failed to clear destination directory")?;
        if removed {
            info!("Removed existing destination {:?}", destination);
        }

        let replicator = TreeReplicator::new(
            source,
            destination,
            self.config.source_language.clone(),
            self.config.target_language.clone(),
        );
        let plan = tokio::task::spawn_blocking(move || replicator.plan())
            .await
            .context("Enumeration task failed")?
            .context("Failed to enumerate the source tree")?;

        info!(
            "Found {} directories, {} asset(s) to copy, {} document(s) to translate",
            plan.directories_created,
            plan.copy_count(),
            plan.translation_count()
        );

        let translator = DocumentTranslator::new(
            TranslationService::new(Arc::clone(&self.provider)),
            self.cancellation.clone(),
        );
        let executor = Arc::new(MirrorExecutor::new(translator, self.cancellation.clone()));

        let progress = PhaseProgress::new(plan.copy_count(), plan.translation_count());
        let scheduler = PipelineScheduler::new(self.config.workers, self.cancellation.clone())
            .with_progress(Arc::new(move |phase: Phase, completed: usize, total: usize| {
                progress.update(phase, completed, total)
            }));

        let mut summary = scheduler.run(executor, plan.work_items).await;
        summary.enumeration_failures = plan.enumeration_failures;

        Self::log_summary(&summary);
        Ok(summary)
    }

    fn log_summary(summary: &RunSummary) {
        info!(
            "Copies: {} succeeded, {} failed, {} abandoned. Translations: {} succeeded, {} failed, {} abandoned. Elapsed: {}",
            summary.copies.succeeded,
            summary.copies.failed,
            summary.copies.abandoned,
            summary.translations.succeeded,
            summary.translations.failed,
            summary.translations.abandoned,
            Self::format_duration(Duration::from_secs_f64(summary.elapsed_secs))
        );
        if summary.unrestored_placeholders > 0 {
            warn!(
                "{} placeholder(s) were not restored across the run",
                summary.unrestored_placeholders
            );
        }

        let status = summary.status();
        match status {
            RunStatus::Completed => info!("{}", status),
            RunStatus::CompletedWithFailures(_) | RunStatus::Terminated => warn!("{}", status),
        }
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// One progress bar per scheduler phase
struct PhaseProgress {
    copy_bar: ProgressBar,
    translate_bar: ProgressBar,
}

impl PhaseProgress {
    fn new(copies: usize, translations: usize) -> Self {
        let multi_progress = MultiProgress::new();
        let copy_bar = multi_progress.add(Self::bar(copies, "files copied"));
        let translate_bar = multi_progress.add(Self::bar(translations, "documents translated"));
        Self {
            copy_bar,
            translate_bar,
        }
    }

    fn bar(length: usize, unit: &str) -> ProgressBar {
        let bar = ProgressBar::new(length as u64);
        let style = ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{eta}}",
                unit
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("=> "));
        bar
    }

    fn update(&self, phase: Phase, completed: usize, total: usize) {
        let bar = match phase {
            Phase::Copy => &self.copy_bar,
            Phase::Translate => &self.translate_bar,
        };
        bar.set_position(completed as u64);
        if completed == total {
            bar.finish_and_clear();
        }
    }
}
