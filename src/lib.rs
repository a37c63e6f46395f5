//! BatchScale - Concurrent Batch Image Resizing Pipeline
//!
//! Resizes every image in a source directory by a uniform scale factor,
//! re-encoding the results as JPEG into a destination directory. Work is
//! fanned out across a bounded pool of workers, one owned task per file,
//! with an explicit join before the run reports.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batchscale::Pipeline;
//! use std::path::Path;
//!
//! # async fn demo() -> batchscale::Result<()> {
//! let pipeline = Pipeline::new(None);
//! let result = pipeline.run(
//!     Path::new("images"),
//!     Path::new("output"),
//!     2.0,
//! ).await?;
//!
//! println!("Saved {} of {} images", result.saved, result.discovered);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod processing;

// Re-export commonly used types
pub use config::{CollisionPolicy, Config};
pub use error::{BatchScaleError, Result};
pub use pipeline::{
    ImageTask, Pipeline, PipelineState, ProgressUpdate, RunResult, TaskFailure, TaskStatus,
};
pub use processing::ProcessingEngine;

use tracing::{info, warn};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the BatchScale library with default settings
///
/// Sets up logging and checks system capabilities. Should be called once
/// at program start.
pub fn init() -> Result<()> {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .finish(),
    )
    .is_ok()
    {
        info!("BatchScale v{} initialized", VERSION);
    }

    validate_system_requirements();

    Ok(())
}

/// Initialize with custom configuration
pub fn init_with_config(config: &Config) -> Result<()> {
    config.validate()?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.level))
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!("BatchScale v{} initialized with custom config", VERSION);
    }

    validate_system_requirements();

    Ok(())
}

fn validate_system_requirements() {
    use sysinfo::{System, SystemExt};

    let mut system = System::new_all();
    system.refresh_all();

    // Resizing holds two pixel buffers per in-flight task
    let available_memory = system.available_memory();
    const MIN_MEMORY_MB: u64 = 512;

    if available_memory < MIN_MEMORY_MB * 1024 * 1024 {
        warn!(
            "Low available memory: {}MB (recommended: >{}MB)",
            available_memory / (1024 * 1024),
            MIN_MEMORY_MB
        );
    }

    let cpu_count = system.physical_core_count().unwrap_or(1);
    info!("Detected {} CPU cores", cpu_count);
}
