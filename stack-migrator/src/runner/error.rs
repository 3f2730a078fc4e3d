//! Migration error types.

use crate::patches::PatchError;
use crate::process::ProcessError;
use crate::releases::{ReleaseError, TagSelectionError};
use crate::repository::InputError;
use crate::vcs::VcsError;

/// Errors that stop a migration.
///
/// Everything up to [`MigrationError::Download`] happens before the local
/// repository is touched. [`MigrationError::Vcs`] may leave a branch with
/// some patches applied.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The repository identifier was malformed.
    #[error(transparent)]
    Input(#[from] InputError),

    /// A required executable is missing.
    #[error(transparent)]
    ToolNotInstalled(ProcessError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Listing releases or resolving the tag's commit failed.
    #[error(transparent)]
    Release(#[from] ReleaseError),

    /// No suitable release to migrate onto.
    #[error(transparent)]
    TagSelection(#[from] TagSelectionError),

    /// Not every patch could be downloaded; no branch was created.
    #[error("Patch download incomplete, migration aborted: {0}")]
    Download(#[source] PatchError),

    /// A repository operation failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}
