use thiserror::Error;

/// Caller-visible failures of the provisioning entry point.
///
/// Only the directory-chain step is fatal. Skeleton-copy problems are
/// degraded to log entries and report counters and never surface here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("home path creation failed: {0}")]
    PathCreation(String),
}

impl From<crate::types::Error> for ApiError {
    fn from(e: crate::types::Error) -> Self {
        ApiError::PathCreation(e.to_string())
    }
}
