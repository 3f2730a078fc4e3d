//! In-memory release directory.

use super::{CommitRecord, ReleaseDirectory, ReleaseError, ReleaseTag};
use crate::repository::RepositoryId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves a fixed release list and commits, recording every request
/// (for testing).
#[derive(Default)]
pub struct MemoryReleaseDirectory {
    releases: Vec<ReleaseTag>,
    commits: HashMap<String, CommitRecord>,
    requests: Mutex<Vec<String>>,
}

impl MemoryReleaseDirectory {
    /// Creates a directory with the given releases, newest first.
    pub fn new(releases: Vec<ReleaseTag>) -> Self {
        Self {
            releases,
            ..Self::default()
        }
    }

    /// Registers the commit `reference` resolves to.
    #[must_use]
    pub fn with_commit(mut self, reference: &str, commit: CommitRecord) -> Self {
        self.commits.insert(reference.to_string(), commit);
        self
    }

    /// Requests made so far, as API routes.
    pub fn requests(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl ReleaseDirectory for MemoryReleaseDirectory {
    async fn list_releases(
        &self,
        repository: &RepositoryId,
    ) -> Result<Vec<ReleaseTag>, ReleaseError> {
        self.lock().push(super::releases_route(repository));
        Ok(self.releases.clone())
    }

    async fn get_commit(
        &self,
        repository: &RepositoryId,
        reference: &str,
    ) -> Result<CommitRecord, ReleaseError> {
        self.lock().push(super::commit_route(repository, reference));
        self.commits
            .get(reference)
            .cloned()
            .ok_or_else(|| ReleaseError::NotFound {
                reference: reference.to_string(),
            })
    }
}
