/*!
 * Cooperative cancellation for a translation run.
 *
 * A run starts in [`RunState::Running`] and moves to [`RunState::ShuttingDown`]
 * at most once. Workers poll the controller at their checkpoints; nothing is
 * interrupted preemptively.
 */

use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    ShuttingDown,
}

/// Shared handle to the run's cancellation flag.
///
/// Cloning is cheap and every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationController {
    shutdown: Arc<AtomicBool>,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` only for the call that performed the transition.
    pub fn request_shutdown(&self) -> bool {
        let first = self
            .shutdown
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            info!("Shutdown requested, finishing in-flight work, please wait...");
        }
        first
    }

    /// Checkpoint: has shutdown been requested?
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RunState {
        if self.is_shutting_down() {
            RunState::ShuttingDown
        } else {
            RunState::Running
        }
    }

    /// Wire the host interrupt signal (Ctrl-C) to this controller.
    ///
    /// Must be called from within a tokio runtime. Repeated interrupts are
    /// absorbed, so the process keeps running until in-flight work drains.
    pub fn install_interrupt_handler(&self) -> tokio::task::JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Unable to listen for interrupt signal: {}", e);
                    return;
                }
                if !controller.request_shutdown() {
                    info!("Shutdown already in progress");
                }
            }
        })
    }
}
