//! Orchestrates a stack migration from release lookup to pull request.

mod config;
mod error;
mod session;

pub use config::{
    MigratorConfig, DEFAULT_API_TIMEOUT, DEFAULT_BRANCH_NAME, DEFAULT_COMMAND_TIMEOUT,
    DEFAULT_PATCH_TIMEOUT,
};
pub use error::MigrationError;
pub use session::MigrationSession;

use crate::patches::{
    fetch_patches, remove_files, remove_patch_files, GitHubPatchSource, PatchSource,
};
use crate::process::ProcessRunner;
use crate::pull_requests::PullRequestPublisher;
use crate::releases::{GitHubReleases, ReleaseDirectory};
use crate::repository::RepositoryId;
use crate::summary::MigrationReport;
use crate::vcs::{validate_branch_name, Git, MigrationBranch, VcsError};
use octocrab::Octocrab;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

/// Drives one migration through every stage.
///
/// Stages run strictly in sequence and each one is gated on the previous
/// one succeeding.
pub struct Migrator {
    config: MigratorConfig,
    directory: Arc<dyn ReleaseDirectory>,
    patches: Arc<dyn PatchSource>,
    runner: ProcessRunner,
}

impl Migrator {
    /// Builds a migrator talking to GitHub and spawning real processes.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Octocrab`] if the API client cannot be built.
    pub fn new(config: MigratorConfig) -> Result<Self, MigrationError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = config.token() {
            builder = builder.personal_token(token.to_string());
        }
        if let Some(base_url) = config.api_base_url() {
            builder = builder.base_uri(base_url)?;
        }
        let octocrab = builder.build()?;

        let directory = Arc::new(GitHubReleases::new(octocrab.clone(), config.api_timeout()));
        let patches = Arc::new(GitHubPatchSource::new(octocrab));
        let runner = ProcessRunner::system(config.command_timeout());
        Ok(Self::with_parts(config, directory, patches, runner))
    }

    /// Builds a migrator from explicit collaborators.
    pub fn with_parts(
        config: MigratorConfig,
        directory: Arc<dyn ReleaseDirectory>,
        patches: Arc<dyn PatchSource>,
        runner: ProcessRunner,
    ) -> Self {
        Self {
            config,
            directory,
            patches,
            runner,
        }
    }

    /// Parses an `owner/repo` line and runs the migration for it.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Input`] for malformed input, otherwise as
    /// [`Migrator::run`].
    pub async fn run_input(&self, input: &str) -> Result<MigrationReport, MigrationError> {
        let repository: RepositoryId = input.parse()?;
        self.run(&repository).await
    }

    /// Migrates the working tree onto the selected release of `repository`.
    ///
    /// # Errors
    ///
    /// Any stage failure halts the run. Failures before the branch is
    /// created leave the repository untouched; later ones leave the branch
    /// and applied commits for inspection. A failed pull request is not an
    /// error; it is recorded in the report.
    pub async fn run(&self, repository: &RepositoryId) -> Result<MigrationReport, MigrationError> {
        let span = info_span!("migrate", repo = %repository);

        async {
            let branch_name = self.config.branch_name();
            validate_branch_name(branch_name)?;

            let git = Git::locate(self.runner.clone(), self.config.workdir())
                .map_err(MigrationError::ToolNotInstalled)?;
            if git.branch_exists(branch_name).await? {
                return Err(VcsError::BranchExists {
                    branch: branch_name.to_string(),
                }
                .into());
            }

            info!("Fetching all the release tags");
            let releases = self.directory.list_releases(repository).await?;
            let release = self.config.tag_selection().select(&releases)?;
            let tag = release.tag_name.as_str();
            info!(tag = %tag, available = releases.len(), "Selected release");

            info!(tag = %tag, "Fetching the commit for the release");
            let commit = self.directory.get_commit(repository, tag).await?;

            let session = MigrationSession::new(
                repository.clone(),
                tag,
                &commit,
                branch_name,
                self.config.workdir().to_path_buf(),
            );

            if let Err(failure) =
                fetch_patches(self.patches.as_ref(), &session, self.config.patch_timeout()).await
            {
                error!(
                    error = %failure,
                    written = failure.written.len(),
                    "Patch download failed, removing partial downloads"
                );
                remove_files(&failure.written).await;
                return Err(MigrationError::Download(failure.source));
            }

            let mut branch = apply_patches(git, &session).await?;

            let cleanup_warnings = remove_patch_files(&session.workdir, &session.patches).await;
            if cleanup_warnings.is_empty() {
                info!("Patch files removed");
            } else {
                warn!(count = cleanup_warnings.len(), "Some patch files were left behind");
            }

            branch.push().await?;
            info!(branch = %branch.name(), "Successfully pushed to remote");

            let publisher = PullRequestPublisher::new(self.runner.clone(), &session.workdir);
            let pull_request = publisher.publish().await;

            Ok(MigrationReport {
                repository: repository.full_name(),
                tag: session.tag.clone(),
                branch: session.branch.clone(),
                patches_applied: session.patches.len(),
                cleanup_warnings,
                pull_request,
            })
        }
        .instrument(span)
        .await
    }
}

/// Creates the branch and applies every patch in ascending index order.
async fn apply_patches(git: Git, session: &MigrationSession) -> Result<MigrationBranch, VcsError> {
    let ordered = session.apply_order();
    let mut branch = MigrationBranch::new(git, session.branch.as_str(), ordered.len());

    branch.create().await?;
    for patch in ordered {
        branch.apply(patch).await?;
    }
    info!(count = session.patches.len(), "All the patch files applied successfully");

    Ok(branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patches::MemoryPatchSource;
    use crate::process::{CommandOutput, Invocation, ScriptedExecutor};
    use crate::pull_requests::PrStatus;
    use crate::releases::{CommitRecord, MemoryReleaseDirectory, ParentRef, ReleaseTag};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use tempfile::TempDir;

    const HEAD: &str = "https://github.com/acme/tmpl/commit/c3";
    const PARENT_A: &str = "https://github.com/acme/tmpl/commit/c2";
    const PARENT_B: &str = "https://github.com/acme/tmpl/commit/c1";

    fn release(tag: &str) -> ReleaseTag {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        ReleaseTag {
            tag_name: tag.to_string(),
            created_at: at,
            published_at: Some(at),
        }
    }

    fn parent(url: &str) -> ParentRef {
        ParentRef {
            sha: url.rsplit('/').next().unwrap().to_string(),
            url: url.replace("github.com/", "api.github.com/repos/"),
            html_url: url.to_string(),
        }
    }

    fn directory() -> MemoryReleaseDirectory {
        MemoryReleaseDirectory::new(vec![release("v2"), release("v1")]).with_commit(
            "v2",
            CommitRecord {
                sha: "c3".to_string(),
                node_id: "C_c3".to_string(),
                html_url: HEAD.to_string(),
                parents: vec![parent(PARENT_A), parent(PARENT_B)],
            },
        )
    }

    fn patches() -> MemoryPatchSource {
        MemoryPatchSource::new()
            .with_patch(&format!("{HEAD}.patch"), "head diff")
            .with_patch(&format!("{PARENT_A}.patch"), "parent a diff")
            .with_patch(&format!("{PARENT_B}.patch"), "parent b diff")
    }

    /// Answers like git would for a repository without the migration branch,
    /// failing any command whose argument vector contains `fail_on`.
    fn git_failing_on(fail_on: Option<&'static str>) -> ScriptedExecutor {
        ScriptedExecutor::new(move |invocation: &Invocation| {
            let command = invocation.display_args().join(" ");
            if command.contains("rev-parse") {
                return Ok(CommandOutput::failed(1, ""));
            }
            if fail_on.is_some_and(|needle| command.contains(needle)) {
                return Ok(CommandOutput::failed(128, format!("fatal: {command} failed")));
            }
            if command.starts_with("gh ") {
                return Ok(CommandOutput::succeeded("https://github.com/acme/app/pull/9\n"));
            }
            Ok(CommandOutput::succeeded(""))
        })
    }

    struct Harness {
        _temp: TempDir,
        workdir: std::path::PathBuf,
        directory: Arc<MemoryReleaseDirectory>,
        patches: Arc<MemoryPatchSource>,
        executor: Arc<ScriptedExecutor>,
        migrator: Migrator,
    }

    fn harness(
        directory: MemoryReleaseDirectory,
        patches: MemoryPatchSource,
        executor: ScriptedExecutor,
    ) -> Harness {
        let temp = TempDir::new().unwrap();
        let workdir = temp.path().to_path_buf();
        let directory = Arc::new(directory);
        let patches = Arc::new(patches);
        let executor = Arc::new(executor);
        let runner =
            ProcessRunner::new(executor.clone(), Duration::from_secs(5)).with_echo_args(false);
        let migrator = Migrator::with_parts(
            MigratorConfig::new(workdir.clone()),
            directory.clone(),
            patches.clone(),
            runner,
        );
        Harness {
            _temp: temp,
            workdir,
            directory,
            patches,
            executor,
            migrator,
        }
    }

    fn am_commands(executor: &ScriptedExecutor) -> Vec<String> {
        executor
            .commands()
            .into_iter()
            .filter(|c| c.starts_with("git am"))
            .collect()
    }

    #[tokio::test]
    async fn applies_patches_in_ascending_index_order() {
        let h = harness(directory(), patches(), git_failing_on(None));

        let report = h.migrator.run_input("acme/tmpl").await.unwrap();

        assert_eq!(
            am_commands(&h.executor),
            vec!["git am v2-0.patch", "git am v2-1.patch", "git am v2-2.patch"]
        );
        assert_eq!(report.patches_applied, 3);
        assert_eq!(
            report.pull_request,
            PrStatus::Created {
                url: "https://github.com/acme/app/pull/9".to_string()
            }
        );
        assert!(report.all_success());
    }

    #[tokio::test]
    async fn checkout_failure_stops_before_apply_and_push() {
        let h = harness(directory(), patches(), git_failing_on(Some("checkout")));

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        assert!(matches!(error, MigrationError::Vcs(VcsError::Checkout { .. })));
        assert_eq!(
            h.executor.commands(),
            vec![
                "git rev-parse --verify --quiet refs/heads/patch-apply",
                "git checkout -b patch-apply",
            ]
        );
    }

    #[tokio::test]
    async fn apply_failure_halts_later_patches_push_and_pr() {
        let h = harness(directory(), patches(), git_failing_on(Some("am v2-1.patch")));

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        match error {
            MigrationError::Vcs(VcsError::PatchApply { file, source }) => {
                assert_eq!(file, "v2-1.patch");
                assert!(source.to_string().contains("fatal: git am v2-1.patch failed"));
            }
            other => panic!("expected patch apply error, got {other:?}"),
        }
        assert_eq!(
            am_commands(&h.executor),
            vec!["git am v2-0.patch", "git am v2-1.patch"]
        );
        let commands = h.executor.commands();
        assert!(!commands.iter().any(|c| c.starts_with("git push")));
        assert!(!commands.iter().any(|c| c.starts_with("gh ")));
        // Files stay for manual recovery
        assert!(h.workdir.join("v2-2.patch").exists());
    }

    #[tokio::test]
    async fn push_failure_skips_pull_request() {
        let h = harness(directory(), patches(), git_failing_on(Some("push")));

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        assert!(matches!(error, MigrationError::Vcs(VcsError::Push { .. })));
        assert!(!h.executor.commands().iter().any(|c| c.starts_with("gh ")));
    }

    #[tokio::test]
    async fn pull_request_failure_is_reported_not_fatal() {
        let h = harness(directory(), patches(), git_failing_on(Some("pr create")));

        let report = h.migrator.run_input("acme/tmpl").await.unwrap();

        assert!(report.has_failures());
        assert!(matches!(report.pull_request, PrStatus::Failed { .. }));
        assert!(h
            .executor
            .commands()
            .iter()
            .any(|c| c.starts_with("git push")));
    }

    #[tokio::test]
    async fn incomplete_download_aborts_before_branch_creation() {
        // The middle parent's patch is missing
        let patches = MemoryPatchSource::new()
            .with_patch(&format!("{HEAD}.patch"), "head diff")
            .with_patch(&format!("{PARENT_B}.patch"), "parent b diff");
        let h = harness(directory(), patches, git_failing_on(None));

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        assert!(matches!(error, MigrationError::Download(_)));
        assert_eq!(h.patches.requested().len(), 2);
        assert!(!h
            .executor
            .commands()
            .iter()
            .any(|c| c.contains("checkout") || c.contains(" am ")));
        assert!(!h.workdir.join("v2-2.patch").exists());
    }

    #[tokio::test]
    async fn failed_download_keeps_files_it_did_not_write() {
        // The tag commit's patch is missing, so nothing gets downloaded
        let patches = MemoryPatchSource::new()
            .with_patch(&format!("{PARENT_A}.patch"), "parent a diff")
            .with_patch(&format!("{PARENT_B}.patch"), "parent b diff");
        let h = harness(directory(), patches, git_failing_on(None));
        std::fs::write(h.workdir.join("v2-0.patch"), "user data").unwrap();

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        assert!(matches!(error, MigrationError::Download(_)));
        assert_eq!(h.patches.requested().len(), 1);
        assert_eq!(
            std::fs::read_to_string(h.workdir.join("v2-0.patch")).unwrap(),
            "user data"
        );
    }

    #[tokio::test]
    async fn missing_git_short_circuits_before_any_request() {
        let h = harness(
            directory(),
            patches(),
            ScriptedExecutor::succeeding().with_installed(&["gh"]),
        );

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        match error {
            MigrationError::ToolNotInstalled(source) => {
                assert!(source.to_string().contains("unable to find git executable"));
            }
            other => panic!("expected missing tool, got {other:?}"),
        }
        assert!(h.directory.requests().is_empty());
        assert!(h.patches.requested().is_empty());
        assert!(h.executor.invocations().is_empty());
    }

    #[tokio::test]
    async fn existing_branch_is_refused() {
        let h = harness(directory(), patches(), ScriptedExecutor::succeeding());

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        assert!(matches!(
            error,
            MigrationError::Vcs(VcsError::BranchExists { .. })
        ));
        assert!(h.directory.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_input_is_rejected_first() {
        let h = harness(directory(), patches(), git_failing_on(None));

        let error = h.migrator.run_input("acme").await.unwrap_err();

        assert!(matches!(error, MigrationError::Input(_)));
        assert!(h.executor.invocations().is_empty());
    }

    #[tokio::test]
    async fn unknown_tag_commit_is_not_found() {
        let directory = MemoryReleaseDirectory::new(vec![release("v2")]);
        let h = harness(directory, patches(), git_failing_on(None));

        let error = h.migrator.run_input("acme/tmpl").await.unwrap_err();

        assert!(matches!(
            error,
            MigrationError::Release(crate::releases::ReleaseError::NotFound { .. })
        ));
        assert!(h.patches.requested().is_empty());
    }
}
