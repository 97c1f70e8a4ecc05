// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the sentinel library.
//!
//! Pose analysis itself never fails: malformed poses classify as "no action".
//! These errors cover the I/O around it (pose files, frames, windows).

use std::fmt;

/// Result type alias for sentinel operations.
pub type Result<T> = std::result::Result<T, SentinelError>;

/// Main error type for the sentinel library.
#[derive(Debug)]
pub enum SentinelError {
    /// Error reading or decoding a pose file.
    PoseFileError(String),
    /// Error processing images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Visualizer error.
    VisualizerError(String),
}

impl fmt::Display for SentinelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoseFileError(msg) => write!(f, "Pose file error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
        }
    }
}

impl std::error::Error for SentinelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SentinelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for SentinelError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for SentinelError {
    fn from(err: serde_json::Error) -> Self {
        Self::PoseFileError(err.to_string())
    }
}
