//! Migrator configuration.

use crate::releases::TagSelection;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Branch created for the migration unless configured otherwise.
pub const DEFAULT_BRANCH_NAME: &str = "patch-apply";

/// Default time budget for a single patch download.
pub const DEFAULT_PATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time budget for a single hosting API call.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time budget for a single git or gh invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Working tree of the downstream repository; patch files land here.
    workdir: PathBuf,
    /// Branch that receives the patches.
    branch_name: String,
    /// How the target release is chosen.
    tag_selection: TagSelection,
    /// Optional GitHub token passed to the API client.
    token: Option<String>,
    /// Optional API base URL (GitHub Enterprise).
    api_base_url: Option<String>,
    /// Time budget per patch download.
    patch_timeout: Duration,
    /// Time budget per API call.
    api_timeout: Duration,
    /// Time budget per subprocess.
    command_timeout: Duration,
}

impl MigratorConfig {
    /// Creates a configuration with defaults for everything but the working tree.
    pub fn new(workdir: PathBuf) -> Self {
        Self {
            workdir,
            branch_name: DEFAULT_BRANCH_NAME.to_string(),
            tag_selection: TagSelection::default(),
            token: None,
            api_base_url: None,
            patch_timeout: DEFAULT_PATCH_TIMEOUT,
            api_timeout: DEFAULT_API_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Sets the migration branch name.
    pub fn with_branch_name(mut self, branch_name: impl Into<String>) -> Self {
        self.branch_name = branch_name.into();
        self
    }

    /// Sets the release selection strategy.
    pub fn with_tag_selection(mut self, tag_selection: TagSelection) -> Self {
        self.tag_selection = tag_selection;
        self
    }

    /// Sets the GitHub token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }

    /// Sets the per-download time budget.
    pub fn with_patch_timeout(mut self, patch_timeout: Duration) -> Self {
        self.patch_timeout = patch_timeout;
        self
    }

    /// Sets the per-request API time budget.
    pub fn with_api_timeout(mut self, api_timeout: Duration) -> Self {
        self.api_timeout = api_timeout;
        self
    }

    /// Sets the per-command time budget.
    pub fn with_command_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }

    /// Returns the working tree path.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Returns the migration branch name.
    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    /// Returns the release selection strategy.
    pub fn tag_selection(&self) -> &TagSelection {
        &self.tag_selection
    }

    /// Returns the GitHub token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the API base URL, if any.
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    /// Returns the per-download time budget.
    pub fn patch_timeout(&self) -> Duration {
        self.patch_timeout
    }

    /// Returns the per-request API time budget.
    pub fn api_timeout(&self) -> Duration {
        self.api_timeout
    }

    /// Returns the per-command time budget.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_workflow() {
        let config = MigratorConfig::new(PathBuf::from("."));
        assert_eq!(config.branch_name(), "patch-apply");
        assert_eq!(config.tag_selection(), &TagSelection::Latest);
        assert_eq!(config.patch_timeout(), Duration::from_secs(10));
        assert_eq!(config.token(), None);
    }

    #[test]
    fn builders_override_defaults() {
        let config = MigratorConfig::new(PathBuf::from("/work"))
            .with_branch_name("stack/v2")
            .with_tag_selection(TagSelection::NewerThan("v1".to_string()))
            .with_token("ghp_test")
            .with_api_base_url("https://ghe.example.com/api/v3")
            .with_patch_timeout(Duration::from_secs(3));

        assert_eq!(config.workdir(), Path::new("/work"));
        assert_eq!(config.branch_name(), "stack/v2");
        assert_eq!(config.token(), Some("ghp_test"));
        assert_eq!(config.api_base_url(), Some("https://ghe.example.com/api/v3"));
        assert_eq!(config.patch_timeout(), Duration::from_secs(3));
    }
}
