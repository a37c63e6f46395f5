//! Progress tracking for pipeline runs

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::broadcast;
use tracing::debug;

/// Thread-safe progress tracker shared by all workers of a run.
///
/// Counters use atomics so completions from any worker are cheap;
/// subscribers (the CLI progress bar) receive coarse events over a
/// broadcast channel and never block the pipeline.
pub struct ProgressTracker {
    total: AtomicU64,
    saved: AtomicUsize,
    failed: AtomicUsize,
    sender: broadcast::Sender<ProgressUpdate>,
}

/// Progress update event
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    Started { total_files: u64 },
    FileCompleted { file_name: String, success: bool },
    RunCompleted { saved: usize, failed: usize },
}

/// Snapshot of a run's progress
#[derive(Debug, Clone, Copy)]
pub struct ProgressState {
    pub total_files: u64,
    pub saved: usize,
    pub failed: usize,
}

impl ProgressState {
    /// Fraction of tasks in a terminal state, 0.0 to 100.0
    pub fn completion_percentage(&self) -> f64 {
        if self.total_files == 0 {
            return 100.0;
        }
        (self.saved + self.failed) as f64 / self.total_files as f64 * 100.0
    }
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self {
            total: AtomicU64::new(0),
            saved: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            sender,
        }
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.sender.subscribe()
    }

    /// Begin tracking a run of `total_files` tasks
    pub fn start(&self, total_files: u64) {
        self.total.store(total_files, Ordering::Relaxed);
        self.saved.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);

        let _ = self.sender.send(ProgressUpdate::Started { total_files });
        debug!("Tracking progress for {} files", total_files);
    }

    /// Record one task reaching a terminal state
    pub fn file_completed(&self, file_name: String, success: bool) {
        if success {
            self.saved.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }

        let _ = self
            .sender
            .send(ProgressUpdate::FileCompleted { file_name, success });
    }

    /// Announce the end of a run
    pub fn run_completed(&self) {
        let state = self.state();
        let _ = self.sender.send(ProgressUpdate::RunCompleted {
            saved: state.saved,
            failed: state.failed,
        });
    }

    /// Get a snapshot of the current state
    pub fn state(&self) -> ProgressState {
        ProgressState {
            total_files: self.total.load(Ordering::Relaxed),
            saved: self.saved.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
