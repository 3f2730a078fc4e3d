//! Patch retrieval and cleanup.
//!
//! Each commit a release introduces is downloaded as a mailbox patch and
//! stored as `<tag>-<index>.patch` in the working directory, where the VCS
//! operator picks the files up in index order.

mod error;
mod memory;
mod reference;

pub use error::{IncompleteDownload, PatchError};
pub use memory::MemoryPatchSource;
pub use reference::{assign_patch_indices, build_patch_references, patch_file_name, PatchReference};

use crate::runner::MigrationSession;
use octocrab::Octocrab;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

/// Source of commit patches.
#[async_trait::async_trait]
pub trait PatchSource: Send + Sync {
    /// Downloads the unified diff served at `url`.
    async fn download(&self, url: &Url) -> Result<String, PatchError>;
}

/// [`PatchSource`] fetching `.patch` URLs from GitHub.
#[derive(Clone)]
pub struct GitHubPatchSource {
    octocrab: Octocrab,
}

impl GitHubPatchSource {
    /// Creates a patch source sharing the API client's configuration.
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }
}

#[async_trait::async_trait]
impl PatchSource for GitHubPatchSource {
    async fn download(&self, url: &Url) -> Result<String, PatchError> {
        let download_error = |message: String| PatchError::Download {
            url: url.to_string(),
            message,
        };

        let response = self
            .octocrab
            ._get(url.as_str())
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("server answered {status}")));
        }

        self.octocrab
            .body_to_string(response)
            .await
            .map_err(|e| download_error(e.to_string()))
    }
}

/// A patch file that could not be deleted after a successful apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupWarning {
    /// Path of the file left behind.
    pub path: String,

    /// Why deletion failed.
    pub message: String,
}

/// Turns a commit's browser URL into the URL of its mailbox patch.
///
/// # Errors
///
/// Returns [`PatchError::InvalidUrl`] if `source_url` is not a valid URL.
pub fn patch_url(source_url: &str) -> Result<Url, PatchError> {
    let mut url = Url::parse(source_url).map_err(|source| PatchError::InvalidUrl {
        url: source_url.to_string(),
        source,
    })?;
    let path = format!("{}.patch", url.path());
    url.set_path(&path);
    Ok(url)
}

/// Downloads every patch of the session into its working directory.
///
/// Files are written as `<tag>-<index>.patch`. The first failure stops the
/// remaining downloads and is returned along with the paths this call wrote,
/// so the caller removes exactly those and nothing that was already there.
///
/// # Returns
///
/// The number of files written, which always equals the number of patches
/// in the session.
///
/// # Errors
///
/// Returns [`IncompleteDownload`] if any single patch could not be fetched
/// or stored.
pub async fn fetch_patches(
    source: &dyn PatchSource,
    session: &MigrationSession,
    timeout: Duration,
) -> Result<usize, IncompleteDownload> {
    let span = info_span!(
        "fetch_patches",
        repo = %session.repository,
        tag = %session.tag,
        count = session.patches.len()
    );

    async {
        info!("Downloading patch files");
        let mut written = Vec::with_capacity(session.patches.len());

        for reference in &session.patches {
            match fetch_one(source, reference, &session.workdir, timeout).await {
                Ok(path) => written.push(path),
                Err(source) => return Err(IncompleteDownload { written, source }),
            }
        }

        info!(written = written.len(), "Download complete");
        Ok(written.len())
    }
    .instrument(span)
    .await
}

async fn fetch_one(
    source: &dyn PatchSource,
    reference: &PatchReference,
    dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, PatchError> {
    let url = patch_url(&reference.source_url)?;
    let body = tokio::time::timeout(timeout, source.download(&url))
        .await
        .map_err(|_| PatchError::Timeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs(),
        })??;

    let path = dir.join(reference.file_name());
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| PatchError::Io {
            path: path.display().to_string(),
            source,
        })?;

    debug!(index = reference.index, path = %path.display(), "Patch file written");
    Ok(path)
}

/// Deletes the patch files of `references` from `dir`.
///
/// Files that are already gone are ignored; any other failure becomes a
/// [`CleanupWarning`] and does not stop the remaining deletions.
pub async fn remove_patch_files(dir: &Path, references: &[PatchReference]) -> Vec<CleanupWarning> {
    let paths: Vec<PathBuf> = references.iter().map(|r| dir.join(r.file_name())).collect();
    remove_files(&paths).await
}

/// Deletes `paths`, with the same warning rules as [`remove_patch_files`].
pub async fn remove_files(paths: &[PathBuf]) -> Vec<CleanupWarning> {
    let mut warnings = Vec::new();

    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed patch file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove patch file");
                warnings.push(CleanupWarning {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    warnings
}
