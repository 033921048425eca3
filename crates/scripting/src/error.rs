//! Error types for the scripting crate

use gserver_core::GServerError;

/// Scripting-cache error types. Compile failures are not represented here —
/// they are cached as [`crate::Artifact::Failed`] sentinels rather than
/// propagated as errors (§7: background failure never aborts the process).
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("worker pool shut down before compile of {0:?} completed")]
    WorkerPoolClosed(String),
}

impl From<ScriptError> for GServerError {
    fn from(err: ScriptError) -> Self {
        GServerError::InvalidData(err.to_string())
    }
}

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;
