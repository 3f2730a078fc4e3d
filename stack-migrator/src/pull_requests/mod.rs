//! Pull request creation for the pushed migration branch.
//!
//! The PR is opened with the GitHub CLI from inside the working tree, so it
//! targets whatever repository and default branch `gh` resolves there.

mod error;
mod status;

pub use error::PrError;
pub use status::PrStatus;

use crate::process::{invocation_in, ProcessRunner};
use std::path::PathBuf;
use tracing::{error, info, info_span, Instrument};

/// Title of the migration pull request.
pub const PR_TITLE: &str = "Migration-patch";

/// Body of the migration pull request.
pub const PR_BODY: &str = "PR to migrate to latest stack version";

/// Opens pull requests with `gh pr create`.
#[derive(Clone)]
pub struct PullRequestPublisher {
    runner: ProcessRunner,
    workdir: PathBuf,
}

impl PullRequestPublisher {
    /// Creates a publisher running in `workdir`.
    pub fn new(runner: ProcessRunner, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    /// Opens a pull request for the current branch.
    ///
    /// # Returns
    ///
    /// The tool's confirmation output, normally the PR URL.
    ///
    /// # Errors
    ///
    /// Returns [`PrError`] if `gh` is missing or fails. Nothing is rolled
    /// back; the pushed branch stays.
    pub async fn create_pull_request(&self, title: &str, body: &str) -> Result<String, PrError> {
        let span = info_span!("create_pr", title = %title);

        async {
            info!("Creating a pull request");
            let gh = self.runner.locate("gh").map_err(PrError::NotInstalled)?;
            let invocation = invocation_in(&gh, &self.workdir)
                .args(["pr", "create", "--title", title, "--body", body]);

            let output = self
                .runner
                .run(&invocation)
                .await
                .map_err(PrError::CreateFailed)?;

            Ok(output.trim().to_string())
        }
        .instrument(span)
        .await
    }

    /// Opens the pull request with the fixed migration title and body and
    /// records the outcome.
    pub async fn publish(&self) -> PrStatus {
        match self.create_pull_request(PR_TITLE, PR_BODY).await {
            Ok(url) => {
                info!(url = %url, "Pull request created");
                PrStatus::Created { url }
            }
            Err(e) => {
                error!(error = %e, "Error while creating a PR");
                PrStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
