//! Configuration management for BatchScale

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BatchScaleError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline processing settings
    pub processing: ProcessingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Pipeline processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of worker threads (None = available CPU count)
    pub threads: Option<usize>,

    /// What to do when two sources map to the same output path
    pub collision: CollisionPolicy,

    /// Maximum source file size to process (in bytes)
    pub max_file_size: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            threads: None, // Auto-detect
            collision: CollisionPolicy::default(),
            max_file_size: 500 * 1024 * 1024, // 500MB
        }
    }
}

/// Policy for output filename collisions.
///
/// Re-encoding to a fixed extension means `photo.png` and `photo.jpg`
/// both target `photo.jpg`. The historical behavior is last-write-wins;
/// the policy makes that an explicit choice instead of an accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Last write wins (logged as a warning)
    Overwrite,
    /// Abort the run before any image work starts
    Error,
    /// Embed the source extension: `photo.png` -> `photo-png.jpg`
    Suffix,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self::Overwrite
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,

    /// Log file path (None = stdout)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            BatchScaleError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(BatchScaleError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(self).map_err(|e| {
                BatchScaleError::config(format!("TOML serialization failed: {}", e))
            })?,
            "yaml" | "yml" => serde_yaml::to_string(self).map_err(|e| {
                BatchScaleError::config(format!("YAML serialization failed: {}", e))
            })?,
            _ => {
                return Err(BatchScaleError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            BatchScaleError::config(format!(
                "Failed to write config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(threads) = self.processing.threads {
            if threads == 0 {
                return Err(BatchScaleError::config(
                    "Thread count must be greater than 0",
                ));
            }
        }

        if self.processing.max_file_size == 0 {
            return Err(BatchScaleError::config(
                "Maximum file size must be greater than 0",
            ));
        }

        Ok(())
    }
}
