//! The per-file unit of work

use std::path::{Path, PathBuf};

use crate::error::{BatchScaleError, Result};
use crate::processing::formats::OUTPUT_EXTENSION;

/// Lifecycle of a task. Transitions are monotonic: a task moves forward
/// through `Discovered -> Decoded -> Resized -> Saved` or drops to
/// `Failed` from any non-terminal state, and never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Discovered,
    Decoded,
    Resized,
    Saved,
    Failed,
}

impl TaskStatus {
    /// Check whether this is a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Saved | Self::Failed)
    }
}

/// One source file's end-to-end decode/resize/encode unit of work.
///
/// The task carries its own identity from discovery to completion: the
/// destination path is derived once, at creation, purely from the source
/// path and the destination directory. No positional bookkeeping exists
/// anywhere in the pipeline, so out-of-order completion cannot misassign
/// an output to the wrong source.
#[derive(Debug, Clone)]
pub struct ImageTask {
    pub source_path: PathBuf,
    pub base_name: String,
    pub dest_path: PathBuf,
    pub source_width: Option<u32>,
    pub source_height: Option<u32>,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub status: TaskStatus,
    pub error: Option<String>,
}

impl ImageTask {
    /// Create a task for a source file, deriving the output path
    /// `<dest_dir>/<basename>.jpg`
    pub fn new(source_path: PathBuf, dest_dir: &Path) -> Result<Self> {
        let base_name = source_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                BatchScaleError::invalid_parameters(format!(
                    "source file has no usable base name: {:?}",
                    source_path
                ))
            })?;

        let dest_path = dest_dir.join(format!("{}.{}", base_name, OUTPUT_EXTENSION));

        Ok(Self {
            source_path,
            base_name,
            dest_path,
            source_width: None,
            source_height: None,
            target_width: None,
            target_height: None,
            status: TaskStatus::Discovered,
            error: None,
        })
    }

    /// Rewrite the destination to embed the source extension, used by the
    /// `suffix` collision policy: `photo.png` -> `photo-png.jpg`
    pub fn disambiguate_by_extension(&mut self, dest_dir: &Path) {
        let ext = self
            .source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("src");
        self.dest_path = dest_dir.join(format!("{}-{}.{}", self.base_name, ext, OUTPUT_EXTENSION));
    }

    /// Record the decoded source dimensions
    pub fn mark_decoded(&mut self, width: u32, height: u32) {
        debug_assert_eq!(self.status, TaskStatus::Discovered);
        self.source_width = Some(width);
        self.source_height = Some(height);
        self.status = TaskStatus::Decoded;
    }

    /// Record the resampled target dimensions
    pub fn mark_resized(&mut self, width: u32, height: u32) {
        debug_assert_eq!(self.status, TaskStatus::Decoded);
        self.target_width = Some(width);
        self.target_height = Some(height);
        self.status = TaskStatus::Resized;
    }

    /// Mark the task as persisted to its destination path
    pub fn mark_saved(&mut self) {
        debug_assert_eq!(self.status, TaskStatus::Resized);
        self.status = TaskStatus::Saved;
    }

    /// Drop the task to `Failed`, recording the cause
    pub fn fail(&mut self, error: &BatchScaleError) {
        debug_assert!(!self.status.is_terminal());
        self.status = TaskStatus::Failed;
        self.error = Some(error.to_string());
    }
}
