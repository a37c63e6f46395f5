//! Pipeline orchestration: discovery, fan-out, and the run-level join
//!
//! One disciplined concurrency strategy: every discovered file becomes an
//! owned [`ImageTask`] submitted to a semaphore-bounded set of workers,
//! and the run joins every worker before reporting. There are no
//! position-keyed arrays to drift and no fire-and-forget writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::{CollisionPolicy, Config};
use crate::error::{BatchScaleError, Result};
use crate::processing::ProcessingEngine;

pub mod locate;
pub mod prepare;
pub mod progress;
pub mod task;

pub use progress::{ProgressState, ProgressTracker, ProgressUpdate};
pub use task::{ImageTask, TaskStatus};

/// Orchestrator lifecycle. `Preparing` covers discovery and destination
/// cleanup (the pre-run barrier), `Running` the worker fan-out, `Joining`
/// the wait for every task to reach a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Preparing,
    Running,
    Joining,
    Done,
}

/// One failed task in a run report
#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    pub source_path: PathBuf,
    pub error: String,
}

/// Aggregate outcome of one pipeline invocation.
///
/// Invariant: `discovered == saved + failed` — every discovered file
/// reaches a terminal state and is accounted for here.
#[derive(Debug, Serialize)]
pub struct RunResult {
    pub discovered: usize,
    pub saved: usize,
    pub failed: usize,
    pub failures: Vec<TaskFailure>,
    pub elapsed: Duration,
}

impl RunResult {
    /// Check whether every discovered file was saved
    pub fn all_saved(&self) -> bool {
        self.failed == 0 && self.saved == self.discovered
    }

    /// Throughput over the whole run, in files per second
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.saved as f64 / self.elapsed.as_secs_f64()
    }
}

/// Batch resizing pipeline.
///
/// The entry operation is [`Pipeline::run`]: discover images in a source
/// directory, prepare the destination, resize everything through a
/// bounded worker pool, and report a [`RunResult`].
pub struct Pipeline {
    engine: Arc<ProcessingEngine>,
    semaphore: Arc<Semaphore>,
    workers: usize,
    collision: CollisionPolicy,
    progress: Arc<ProgressTracker>,
    state: RwLock<PipelineState>,
}

impl Pipeline {
    /// Create a pipeline with the given worker bound (None = CPU count)
    pub fn new(workers: Option<usize>) -> Self {
        let workers = workers.unwrap_or_else(|| num_cpus::get().max(1));

        info!("Initializing pipeline with {} concurrent workers", workers);

        Self {
            engine: Arc::new(ProcessingEngine::new()),
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
            collision: CollisionPolicy::default(),
            progress: Arc::new(ProgressTracker::new()),
            state: RwLock::new(PipelineState::Idle),
        }
    }

    /// Create a pipeline from a configuration
    pub fn with_config(config: &Config) -> Self {
        let mut pipeline = Self::new(config.processing.threads);
        pipeline.collision = config.processing.collision;
        pipeline.engine = Arc::new(ProcessingEngine::with_max_file_size(
            config.processing.max_file_size,
        ));
        pipeline
    }

    /// Override the output collision policy
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    /// Number of concurrent workers this pipeline will use
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Progress tracker for this pipeline (subscribe before calling `run`)
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Current orchestrator state
    pub fn state(&self) -> PipelineState {
        *self.state.read().unwrap()
    }

    /// Run the pipeline: resize every image in `source_dir` by `scale`
    /// into `dest_dir`.
    ///
    /// Fatal errors (missing source directory, failed destination
    /// cleanup, collision under the `error` policy, invalid scale) abort
    /// before any image work. Per-file errors are recorded in the result;
    /// one task failing never prevents its siblings from completing.
    pub async fn run(&self, source_dir: &Path, dest_dir: &Path, scale: f64) -> Result<RunResult> {
        let result = self.run_inner(source_dir, dest_dir, scale).await;
        if result.is_err() {
            self.set_state(PipelineState::Idle);
        }
        result
    }

    async fn run_inner(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        scale: f64,
    ) -> Result<RunResult> {
        let started = Instant::now();

        if !scale.is_finite() || scale <= 0.0 {
            return Err(BatchScaleError::invalid_parameters(format!(
                "scale factor must be positive and finite, got {}",
                scale
            )));
        }

        self.set_state(PipelineState::Preparing);
        info!(
            "Starting run: {:?} -> {:?} at scale {}",
            source_dir, dest_dir, scale
        );

        // Discovery precedes destination cleanup so a missing source
        // directory leaves the destination untouched.
        let files = locate::find_images(source_dir).await?;
        prepare::prepare_destination(dest_dir).await?;

        let tasks = self.plan_tasks(files, dest_dir)?;
        let discovered = tasks.len();
        info!("Found {} files to process", discovered);

        self.set_state(PipelineState::Running);
        self.progress.start(discovered as u64);

        let (sources, handles): (Vec<PathBuf>, Vec<_>) = tasks
            .into_iter()
            .map(|task| {
                let engine = Arc::clone(&self.engine);
                let semaphore = Arc::clone(&self.semaphore);
                let progress = Arc::clone(&self.progress);
                let source_path = task.source_path.clone();

                let handle = tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    let task = engine.process(task, scale).await;

                    let file_name = task
                        .source_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    progress.file_completed(file_name, task.status == TaskStatus::Saved);

                    task
                });

                (source_path, handle)
            })
            .unzip();

        self.set_state(PipelineState::Joining);
        let joined = join_all(handles).await;

        let mut saved = 0;
        let mut failures = Vec::new();
        for (source_path, outcome) in sources.into_iter().zip(joined) {
            match outcome {
                Ok(task) => {
                    if task.status == TaskStatus::Saved {
                        saved += 1;
                    } else {
                        failures.push(TaskFailure {
                            source_path: task.source_path,
                            error: task
                                .error
                                .unwrap_or_else(|| "task ended without a cause".to_string()),
                        });
                    }
                }
                Err(join_err) => {
                    // A panicked worker still yields an attributed,
                    // terminal outcome; nothing vanishes from the report.
                    failures.push(TaskFailure {
                        source_path,
                        error: format!("worker aborted: {}", join_err),
                    });
                }
            }
        }

        let result = RunResult {
            discovered,
            saved,
            failed: failures.len(),
            failures,
            elapsed: started.elapsed(),
        };
        debug_assert_eq!(result.discovered, result.saved + result.failed);

        self.progress.run_completed();
        self.set_state(PipelineState::Done);
        info!(
            "Run complete: {} saved, {} failed in {:.2}s",
            result.saved,
            result.failed,
            result.elapsed.as_secs_f64()
        );

        Ok(result)
    }

    /// Build one task per discovered file and apply the collision policy
    fn plan_tasks(&self, files: Vec<PathBuf>, dest_dir: &Path) -> Result<Vec<ImageTask>> {
        let mut tasks = Vec::with_capacity(files.len());
        for file in files {
            tasks.push(ImageTask::new(file, dest_dir)?);
        }

        let mut by_dest: HashMap<PathBuf, Vec<usize>> = HashMap::new();
        for (index, task) in tasks.iter().enumerate() {
            by_dest.entry(task.dest_path.clone()).or_default().push(index);
        }

        for (dest, indices) in by_dest {
            if indices.len() < 2 {
                continue;
            }
            match self.collision {
                CollisionPolicy::Overwrite => {
                    warn!(
                        "{} source files map to {:?}; last write wins",
                        indices.len(),
                        dest
                    );
                }
                CollisionPolicy::Error => {
                    return Err(BatchScaleError::OutputCollision {
                        path: dest,
                        count: indices.len(),
                    });
                }
                CollisionPolicy::Suffix => {
                    debug!(
                        "Disambiguating {} sources colliding at {:?}",
                        indices.len(),
                        dest
                    );
                    for index in indices {
                        tasks[index].disambiguate_by_extension(dest_dir);
                    }
                }
            }
        }

        Ok(tasks)
    }

    fn set_state(&self, next: PipelineState) {
        let mut state = self.state.write().unwrap();
        debug!("Pipeline state: {:?} -> {:?}", *state, next);
        *state = next;
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(None)
    }
}
