//! Destination directory preparation
//!
//! Runs as a barrier: nothing in the pipeline writes to the destination
//! until this step has fully completed.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{BatchScaleError, Result};

/// Ensure the destination directory exists and holds no files from a
/// previous run.
///
/// A missing directory is created. An existing one has every regular file
/// directly inside it deleted; subdirectories and their contents are left
/// alone. Deletions run concurrently, but the call returns only once all
/// of them have finished. A single failed deletion aborts the run with
/// `CleanupFailed` naming the offending path.
pub async fn prepare_destination(dest_dir: &Path) -> Result<()> {
    match fs::metadata(dest_dir).await {
        Err(_) => {
            debug!("Creating destination directory: {:?}", dest_dir);
            fs::create_dir_all(dest_dir)
                .await
                .map_err(|e| BatchScaleError::cleanup_failed(dest_dir, e))?;
            return Ok(());
        }
        Ok(metadata) if !metadata.is_dir() => {
            let err = std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "destination exists and is not a directory",
            );
            return Err(BatchScaleError::cleanup_failed(dest_dir, err));
        }
        Ok(_) => {}
    }

    let stale = stale_files(dest_dir).await?;
    if stale.is_empty() {
        return Ok(());
    }

    let started = Instant::now();
    let count = stale.len();

    tokio::task::spawn_blocking(move || {
        stale
            .par_iter()
            .map(|path| {
                std::fs::remove_file(path)
                    .map_err(|e| BatchScaleError::cleanup_failed(path, e))
            })
            .collect::<Result<Vec<()>>>()
    })
    .await
    .map_err(|e| BatchScaleError::internal(format!("cleanup join error: {}", e)))??;

    info!(
        "Cleared {} stale files from {:?} in {:.0?}",
        count,
        dest_dir,
        started.elapsed()
    );

    Ok(())
}

/// List regular files directly inside the destination directory
async fn stale_files(dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = fs::read_dir(dest_dir)
        .await
        .map_err(|e| BatchScaleError::cleanup_failed(dest_dir, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| BatchScaleError::cleanup_failed(dest_dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| BatchScaleError::cleanup_failed(entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }

    Ok(files)
}
