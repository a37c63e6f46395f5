//! Error types and handling for BatchScale

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for BatchScale operations
pub type Result<T> = std::result::Result<T, BatchScaleError>;

/// Main error type for BatchScale operations
///
/// Errors split into two classes: fatal errors abort a run before any
/// per-file work starts, recoverable errors are attributed to a single
/// task and aggregated into the run result while sibling tasks continue.
#[derive(Debug, Error)]
pub enum BatchScaleError {
    /// Source directory does not exist or is not a directory
    #[error("Source directory not found: {path:?}")]
    DirectoryNotFound { path: PathBuf },

    /// A stale file in the destination directory could not be deleted
    #[error("Failed to clean destination entry {path:?}: {source}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image file could not be read or decoded
    #[error("Failed to decode {path:?}: {reason}")]
    DecodeFailed { path: PathBuf, reason: String },

    /// Scaling produced a zero-area target
    #[error("Invalid target dimensions {width}x{height} for {path:?}")]
    InvalidDimensions {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    /// Pixel buffer could not be serialized to the output format
    #[error("Failed to encode {path:?}: {reason}")]
    EncodeFailed { path: PathBuf, reason: String },

    /// Encoded output could not be written to disk
    #[error("Failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two or more source files map to the same output path
    #[error("Output path collision at {path:?} ({count} sources)")]
    OutputCollision { path: PathBuf, count: usize },

    /// Invalid run parameters
    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),

    /// Runtime plumbing failures (task join, blocking pool)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BatchScaleError {
    /// Create a new directory-not-found error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Create a new cleanup error for an undeletable destination entry
    pub fn cleanup_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CleanupFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a new decode error
    pub fn decode_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DecodeFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new invalid-dimensions error
    pub fn invalid_dimensions(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self::InvalidDimensions {
            path: path.into(),
            width,
            height,
        }
    }

    /// Create a new encode error
    pub fn encode_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::EncodeFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new write error
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (sibling tasks can continue)
    ///
    /// Recoverable errors are caught at task granularity and recorded in
    /// the run result. Everything else aborts the run before per-file
    /// work begins.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::DecodeFailed { .. }
            | Self::InvalidDimensions { .. }
            | Self::EncodeFailed { .. }
            | Self::WriteFailed { .. } => true,

            Self::DirectoryNotFound { .. }
            | Self::CleanupFailed { .. }
            | Self::OutputCollision { .. }
            | Self::InvalidParameters { .. }
            | Self::ConfigError { .. }
            | Self::SerdeError(_)
            | Self::Internal { .. } => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::DirectoryNotFound { path }
            | Self::CleanupFailed { path, .. }
            | Self::DecodeFailed { path, .. }
            | Self::InvalidDimensions { path, .. }
            | Self::EncodeFailed { path, .. }
            | Self::WriteFailed { path, .. }
            | Self::OutputCollision { path, .. } => Some(path),

            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::DirectoryNotFound { path } => {
                format!("Source directory does not exist: {}", path.display())
            }
            Self::CleanupFailed { path, source } => format!(
                "Could not remove stale output file {}: {}",
                path.display(),
                source
            ),
            Self::InvalidDimensions { path, width, height } => format!(
                "Scaling {} would produce an empty {}x{} image. Use a larger scale factor.",
                path.display(),
                width,
                height
            ),
            Self::OutputCollision { path, count } => format!(
                "{} source files would all be written to {}. \
                 Use the 'suffix' collision policy or rename the inputs.",
                count,
                path.display()
            ),
            other => other.to_string(),
        }
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for BatchScaleError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for BatchScaleError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}
