//! Migrates a downstream repository onto a newer release of its upstream
//! stack template.
//!
//! The commits a release introduces are downloaded as mailbox patches,
//! applied with `git am` on a fresh branch, pushed, and proposed through a
//! pull request opened with `gh`.

pub mod patches;
pub mod process;
pub mod pull_requests;
pub mod releases;
pub mod repository;
pub mod runner;
pub mod summary;
pub mod vcs;

pub use patches::{
    assign_patch_indices, build_patch_references, fetch_patches, patch_file_name, patch_url,
    remove_files, remove_patch_files, CleanupWarning, GitHubPatchSource, IncompleteDownload,
    MemoryPatchSource, PatchError, PatchReference, PatchSource,
};
pub use process::{
    CommandExecutor, CommandOutput, Invocation, ProcessError, ProcessRunner, ScriptedExecutor,
    SystemExecutor,
};
pub use pull_requests::{PrError, PrStatus, PullRequestPublisher, PR_BODY, PR_TITLE};
pub use releases::{
    CommitRecord, GitHubReleases, MemoryReleaseDirectory, ParentRef, ReleaseDirectory,
    ReleaseError, ReleaseTag, TagSelection, TagSelectionError,
};
pub use repository::{InputError, RepositoryId};
pub use runner::{MigrationError, MigrationSession, Migrator, MigratorConfig};
pub use summary::MigrationReport;
pub use vcs::{validate_branch_name, BranchState, Git, MigrationBranch, VcsError};
