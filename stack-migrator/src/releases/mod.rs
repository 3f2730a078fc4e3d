//! Release directory client for the upstream hosting API.
//!
//! Resolves a repository to its releases and a release tag to the commit it
//! points at. Read-only; nothing here mutates local or remote state.

mod error;
mod memory;
mod selection;
mod types;

pub use error::ReleaseError;
pub use memory::MemoryReleaseDirectory;
pub use selection::{TagSelection, TagSelectionError};
pub use types::{CommitRecord, ParentRef, ReleaseTag};

use crate::repository::RepositoryId;
use octocrab::Octocrab;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Releases requested in the single releases call.
///
/// Pagination is not followed; a full page means older releases may be
/// missing from the list.
const RELEASES_PER_PAGE: u8 = 100;

/// Read-only view of an upstream repository's releases and commits.
#[async_trait::async_trait]
pub trait ReleaseDirectory: Send + Sync {
    /// Lists releases in API order (newest first).
    async fn list_releases(
        &self,
        repository: &RepositoryId,
    ) -> Result<Vec<ReleaseTag>, ReleaseError>;

    /// Fetches the commit a tag or SHA resolves to.
    async fn get_commit(
        &self,
        repository: &RepositoryId,
        reference: &str,
    ) -> Result<CommitRecord, ReleaseError>;
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
}

/// [`ReleaseDirectory`] backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubReleases {
    octocrab: Octocrab,
    timeout: Duration,
}

impl GitHubReleases {
    /// Creates a client with a per-request time budget.
    pub fn new(octocrab: Octocrab, timeout: Duration) -> Self {
        Self { octocrab, timeout }
    }
}

/// Runs an API request under `timeout`, mapping failures to [`ReleaseError`].
async fn bounded<T>(
    timeout: Duration,
    request: impl Future<Output = Result<T, octocrab::Error>>,
    reference: &str,
) -> Result<T, ReleaseError> {
    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| ReleaseError::Timeout {
            timeout_secs: timeout.as_secs(),
        })?
        .map_err(|e| ReleaseError::from_octocrab(e, reference))
}

#[async_trait::async_trait]
impl ReleaseDirectory for GitHubReleases {
    async fn list_releases(
        &self,
        repository: &RepositoryId,
    ) -> Result<Vec<ReleaseTag>, ReleaseError> {
        let route = releases_route(repository);
        debug!(route = %route, "Listing releases");

        let params = PageParams {
            per_page: RELEASES_PER_PAGE,
        };
        let releases: Vec<ReleaseTag> = bounded(
            self.timeout,
            self.octocrab.get(&route, Some(&params)),
            &repository.full_name(),
        )
        .await?;

        if releases.len() >= usize::from(RELEASES_PER_PAGE) {
            warn!(
                repo = %repository,
                count = releases.len(),
                "Release list fills a whole page; older releases are not fetched"
            );
        }

        Ok(releases)
    }

    async fn get_commit(
        &self,
        repository: &RepositoryId,
        reference: &str,
    ) -> Result<CommitRecord, ReleaseError> {
        let route = commit_route(repository, reference);
        debug!(route = %route, "Fetching commit");

        bounded(
            self.timeout,
            self.octocrab.get(&route, None::<&()>),
            reference,
        )
        .await
    }
}

fn releases_route(repository: &RepositoryId) -> String {
    format!("/repos/{}/{}/releases", repository.owner, repository.name)
}

fn commit_route(repository: &RepositoryId, reference: &str) -> String {
    // Ref names never contain spaces, so form encoding yields a valid path segment
    let encoded: String = url::form_urlencoded::byte_serialize(reference.as_bytes()).collect();
    format!(
        "/repos/{}/{}/commits/{}",
        repository.owner, repository.name, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_api_routes() {
        let repo = RepositoryId::new("acme", "tmpl");
        assert_eq!(releases_route(&repo), "/repos/acme/tmpl/releases");
        assert_eq!(commit_route(&repo, "v2"), "/repos/acme/tmpl/commits/v2");
    }

    #[test]
    fn encodes_reserved_characters_in_refs() {
        let repo = RepositoryId::new("acme", "tmpl");
        assert_eq!(
            commit_route(&repo, "v1#rc?1"),
            "/repos/acme/tmpl/commits/v1%23rc%3F1"
        );
        assert_eq!(
            commit_route(&repo, "release/1.0"),
            "/repos/acme/tmpl/commits/release%2F1.0"
        );
    }

    #[tokio::test]
    async fn slow_requests_time_out() {
        let result: Result<(), ReleaseError> = bounded(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            "v2",
        )
        .await;

        assert!(matches!(result, Err(ReleaseError::Timeout { .. })));
    }
}
