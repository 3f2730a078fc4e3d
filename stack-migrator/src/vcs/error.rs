//! VCS operation error types.

use crate::process::ProcessError;
use thiserror::Error;

/// Errors that can occur while changing the local repository.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The branch name is not a valid git reference name.
    #[error("Invalid branch name '{name}': {message}")]
    InvalidBranchName { name: String, message: String },

    /// The branch already exists, so another migration may be in progress.
    #[error("Branch '{branch}' already exists; delete it or choose another branch name")]
    BranchExists { branch: String },

    /// Inspecting the repository failed.
    #[error("Failed to inspect repository: {0}")]
    Inspect(#[source] ProcessError),

    /// Creating or switching to the branch failed.
    #[error("Failed to check out branch '{branch}': {source}")]
    Checkout {
        branch: String,
        #[source]
        source: ProcessError,
    },

    /// Applying a patch failed.
    #[error("Failed to apply patch '{file}': {source}")]
    PatchApply {
        file: String,
        #[source]
        source: ProcessError,
    },

    /// Pushing the branch failed.
    #[error("Failed to push branch '{branch}': {source}")]
    Push {
        branch: String,
        #[source]
        source: ProcessError,
    },

    /// A patch was offered out of application order.
    #[error("Patch index {found} applied out of order; expected {expected}")]
    OutOfOrder { expected: usize, found: usize },

    /// The operation is not allowed in the branch's current state.
    #[error("Cannot {operation} while the migration branch is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },
}
