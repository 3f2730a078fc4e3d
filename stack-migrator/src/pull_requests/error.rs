//! Pull request error types.

use crate::process::ProcessError;
use thiserror::Error;

/// Errors that can occur while opening the pull request.
#[derive(Debug, Error)]
pub enum PrError {
    /// The PR tool is not installed.
    #[error(transparent)]
    NotInstalled(ProcessError),

    /// The PR tool ran and failed.
    #[error("Failed to create pull request: {0}")]
    CreateFailed(#[source] ProcessError),
}
