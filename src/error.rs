use std::path::PathBuf;
use thiserror::Error;

/// Process-fatal errors that cross the library's boundary back to the host. Every *per-mod*
/// failure (a bad manifest, a missing dependency, a version mismatch, ...) is data, not control
/// flow: it lives in `ModMetadata::error` and never reaches this type. `PipelineError` exists only
/// for the handful of conditions that are fatal to the run as a whole.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("mod root directory '{0}' does not exist or can't be read: {1}")]
    RootUnreadable(PathBuf, std::io::Error),

    #[error("malformed JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
