//! Local repository operations driven through the `git` executable.

mod error;
mod state;

pub use error::VcsError;
pub use state::{BranchState, MigrationBranch};

use crate::process::{invocation_in, ProcessError, ProcessRunner};
use bstr::ByteSlice;
use std::path::PathBuf;
use tracing::{debug, info};

/// Remote the migration branch is pushed to.
const REMOTE: &str = "origin";

/// Exit code of `git rev-parse --verify --quiet` for a missing ref.
const REF_MISSING_CODE: i32 = 1;

/// The `git` executable bound to one working tree.
#[derive(Clone)]
pub struct Git {
    program: PathBuf,
    runner: ProcessRunner,
    workdir: PathBuf,
}

impl Git {
    /// Finds `git` on the search path.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::NotInstalled`] with a platform specific hint
    /// when git is missing.
    pub fn locate(runner: ProcessRunner, workdir: impl Into<PathBuf>) -> Result<Self, ProcessError> {
        let program = runner.locate("git")?;
        debug!(path = %program.display(), "Located git");
        Ok(Self {
            program,
            runner,
            workdir: workdir.into(),
        })
    }

    /// Checks whether a local branch named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Inspect`] if git fails for another reason than a
    /// missing ref (e.g. not a repository).
    pub async fn branch_exists(&self, name: &str) -> Result<bool, VcsError> {
        let reference = format!("refs/heads/{name}");
        let invocation = self.git(["rev-parse", "--verify", "--quiet", reference.as_str()]);

        match self.runner.execute(&invocation).await {
            Ok(()) => Ok(true),
            Err(e) if e.exit_code() == Some(REF_MISSING_CODE) => Ok(false),
            Err(e) => Err(VcsError::Inspect(e)),
        }
    }

    /// Creates `name` and switches to it (`git checkout -b`).
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Checkout`], e.g. when the branch already exists.
    pub async fn checkout_branch(&self, name: &str) -> Result<(), VcsError> {
        info!(branch = %name, "Creating branch");
        self.runner
            .execute(&self.git(["checkout", "-b", name]))
            .await
            .map_err(|source| VcsError::Checkout {
                branch: name.to_string(),
                source,
            })
    }

    /// Applies and commits one mailbox patch (`git am`).
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::PatchApply`] naming the file, with git's stderr.
    pub async fn apply_patch(&self, file: &str) -> Result<(), VcsError> {
        debug!(file = %file, "Applying patch");
        self.runner
            .execute(&self.git(["am", file]))
            .await
            .map_err(|source| VcsError::PatchApply {
                file: file.to_string(),
                source,
            })
    }

    /// Pushes `branch` to `origin` and sets it as upstream.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Push`]. No retry is attempted.
    pub async fn push(&self, branch: &str) -> Result<(), VcsError> {
        info!(branch = %branch, "Pushing branch to remote");
        self.runner
            .execute(&self.git(["push", "--set-upstream", REMOTE, branch]))
            .await
            .map_err(|source| VcsError::Push {
                branch: branch.to_string(),
                source,
            })
    }

    fn git<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> crate::process::Invocation {
        invocation_in(&self.program, &self.workdir).args(args)
    }
}

/// Validates `name` as a git branch name.
///
/// # Errors
///
/// Returns [`VcsError::InvalidBranchName`] with git's reason.
pub fn validate_branch_name(name: &str) -> Result<(), VcsError> {
    gix_validate::reference::name_partial(name.as_bytes().as_bstr())
        .map(|_| ())
        .map_err(|e| VcsError::InvalidBranchName {
            name: name.to_string(),
            message: e.to_string(),
        })
}
