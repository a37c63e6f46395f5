//! Core image processing: the per-task decode -> resize -> encode sequence

use std::path::Path;

use image::DynamicImage;
use tokio::fs;
use tracing::debug;

use crate::error::{BatchScaleError, Result};
use crate::pipeline::task::ImageTask;

pub mod encode;
pub mod formats;
pub mod resize;

pub use encode::write_jpeg;
pub use formats::{is_supported_source, OUTPUT_EXTENSION, SOURCE_EXTENSIONS};
pub use resize::{resample, scaled_dimensions};

/// Files above this size are decoded through a memory-mapped view instead
/// of a heap read.
const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Default ceiling on source file size.
const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Processing engine executing one task's stages within one unit of work.
///
/// The engine holds no per-task state; every call is independent and safe
/// to invoke from arbitrarily many workers concurrently.
pub struct ProcessingEngine {
    max_file_size: u64,
}

impl ProcessingEngine {
    /// Create a new processing engine with default limits
    pub fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create an engine with a custom source file size ceiling
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Run a task through decode -> resize -> encode.
    ///
    /// Always returns the task in a terminal state: `Saved` on success,
    /// `Failed` with the error attributed to the task's source path
    /// otherwise. Errors never escape to the caller; one task's failure
    /// must not disturb its siblings.
    pub async fn process(&self, mut task: ImageTask, scale: f64) -> ImageTask {
        match self.run_stages(&mut task, scale).await {
            Ok(()) => debug!("Saved {:?} -> {:?}", task.source_path, task.dest_path),
            Err(err) => {
                debug!("Task failed for {:?}: {}", task.source_path, err);
                task.fail(&err);
            }
        }
        task
    }

    async fn run_stages(&self, task: &mut ImageTask, scale: f64) -> Result<()> {
        let image = self.decode(&task.source_path).await?;
        task.mark_decoded(image.width(), image.height());

        let (target_width, target_height) =
            scaled_dimensions(image.width(), image.height(), scale);
        if target_width == 0 || target_height == 0 {
            return Err(BatchScaleError::invalid_dimensions(
                &task.source_path,
                target_width,
                target_height,
            ));
        }

        let resized = self.resample_stage(image, target_width, target_height).await?;
        task.mark_resized(target_width, target_height);

        self.encode_stage(resized, &task.dest_path).await?;
        task.mark_saved();

        Ok(())
    }

    /// Load an image file into a pixel buffer
    pub async fn decode(&self, path: &Path) -> Result<DynamicImage> {
        debug!("Decoding image: {:?}", path);

        let metadata = fs::metadata(path)
            .await
            .map_err(|e| BatchScaleError::decode_failed(path, format!("cannot access file: {}", e)))?;
        let file_size = metadata.len();

        if file_size == 0 {
            return Err(BatchScaleError::decode_failed(path, "file is empty"));
        }
        if file_size > self.max_file_size {
            return Err(BatchScaleError::decode_failed(
                path,
                format!(
                    "file size {} exceeds the {} byte limit",
                    file_size, self.max_file_size
                ),
            ));
        }

        let image = if file_size > MMAP_THRESHOLD {
            self.decode_mmap(path).await?
        } else {
            self.decode_standard(path).await?
        };

        debug!(
            "Decoded {:?}: {}x{} ({:.2}MB)",
            path,
            image.width(),
            image.height(),
            file_size as f64 / 1024.0 / 1024.0
        );

        Ok(image)
    }

    /// Decode using standard file I/O
    async fn decode_standard(&self, path: &Path) -> Result<DynamicImage> {
        let data = fs::read(path)
            .await
            .map_err(|e| BatchScaleError::decode_failed(path, format!("read failed: {}", e)))?;

        let path_buf = path.to_path_buf();
        tokio::task::spawn_blocking(move || decode_bytes(&data, &path_buf))
            .await
            .map_err(|e| BatchScaleError::internal(format!("decode join error: {}", e)))?
    }

    /// Decode through a memory-mapped view (for large files)
    async fn decode_mmap(&self, path: &Path) -> Result<DynamicImage> {
        use memmap2::MmapOptions;
        use std::fs::File;

        debug!("Using memory mapping for large file: {:?}", path);

        let path_buf = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let file = File::open(&path_buf)
                .map_err(|e| BatchScaleError::decode_failed(&path_buf, format!("open failed: {}", e)))?;
            let mmap = unsafe {
                MmapOptions::new()
                    .map(&file)
                    .map_err(|e| BatchScaleError::decode_failed(&path_buf, format!("mmap failed: {}", e)))?
            };
            decode_bytes(&mmap, &path_buf)
        })
        .await
        .map_err(|e| BatchScaleError::internal(format!("decode join error: {}", e)))?
    }

    /// Resample on the blocking pool
    async fn resample_stage(
        &self,
        image: DynamicImage,
        target_width: u32,
        target_height: u32,
    ) -> Result<DynamicImage> {
        tokio::task::spawn_blocking(move || resample(&image, target_width, target_height))
            .await
            .map_err(|e| BatchScaleError::internal(format!("resample join error: {}", e)))
    }

    /// Encode and write on the blocking pool
    async fn encode_stage(&self, image: DynamicImage, dest_path: &Path) -> Result<()> {
        let dest = dest_path.to_path_buf();
        tokio::task::spawn_blocking(move || write_jpeg(&image, &dest))
            .await
            .map_err(|e| BatchScaleError::internal(format!("encode join error: {}", e)))?
    }
}

impl Default for ProcessingEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_bytes(data: &[u8], path: &Path) -> Result<DynamicImage> {
    image::load_from_memory(data).map_err(|e| {
        // When the extension lies about the content, say so.
        let hint = formats::detect_format_from_header(data)
            .map(|f| format!(" (content looks like {})", f))
            .unwrap_or_default();
        BatchScaleError::decode_failed(path, format!("{}{}", e, hint))
    })
}
