//! Error types for the trim slider.
//!
//! Gesture resolution never fails: degenerate inputs produce defined
//! outputs. These errors surface only from checked conversions,
//! collaborators (media lookup, export) and configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrimError {
    /// A conversion was attempted while the duration is zero or negative.
    #[error("Invalid duration: {0}s")]
    InvalidDuration(f64),

    /// The media provider could not report a duration for the asset.
    #[error("Unknown duration for {}: {reason}", asset.display())]
    UnknownDuration { asset: PathBuf, reason: String },

    /// The asset is shorter than the configured minimum selection.
    /// Handled by pinning the handles, reported only for diagnostics.
    #[error("Asset of {duration}s is shorter than minimum selection of {min_space}s")]
    UnsatisfiableConstraint { duration: f64, min_space: f64 },

    #[error("Invalid range: {start}s..{end}s")]
    InvalidRange { start: f64, end: f64 },

    /// Export collaborator failure, message carried verbatim.
    #[error("Export failed: {0}")]
    ExportFailure(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Background job dropped its result channel without reporting.
    #[error("Worker unavailable")]
    WorkerUnavailable,
}

pub type Result<T> = std::result::Result<T, TrimError>;
