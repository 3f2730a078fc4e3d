//! State carried through a single migration.

use crate::patches::{build_patch_references, PatchReference};
use crate::releases::CommitRecord;
use crate::repository::RepositoryId;
use std::path::PathBuf;

/// Everything a migration run knows once the target commit is resolved.
#[derive(Debug, Clone)]
pub struct MigrationSession {
    /// Upstream repository.
    pub repository: RepositoryId,

    /// Selected release tag.
    pub tag: String,

    /// Patches in discovery order (tag commit first).
    pub patches: Vec<PatchReference>,

    /// Branch receiving the patches.
    pub branch: String,

    /// Working tree the patch files are written to.
    pub workdir: PathBuf,
}

impl MigrationSession {
    /// Builds the session for `commit`, the commit `tag` resolves to.
    pub fn new(
        repository: RepositoryId,
        tag: &str,
        commit: &CommitRecord,
        branch: impl Into<String>,
        workdir: PathBuf,
    ) -> Self {
        Self {
            repository,
            tag: tag.to_string(),
            patches: build_patch_references(commit, tag),
            branch: branch.into(),
            workdir,
        }
    }

    /// Patches sorted by ascending index, the order they must be applied in.
    #[must_use]
    pub fn apply_order(&self) -> Vec<&PatchReference> {
        let mut ordered: Vec<&PatchReference> = self.patches.iter().collect();
        ordered.sort_by_key(|patch| patch.index);
        ordered
    }
}
