//! Migration report types.

use crate::patches::CleanupWarning;
use crate::pull_requests::PrStatus;
use serde::Serialize;

/// Summary of a migration that reached the push stage.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// Upstream repository in "owner/name" format.
    pub repository: String,

    /// Release tag migrated onto.
    pub tag: String,

    /// Branch that received the patches.
    pub branch: String,

    /// Number of patches applied.
    pub patches_applied: usize,

    /// Patch files that could not be removed.
    pub cleanup_warnings: Vec<CleanupWarning>,

    /// Pull request outcome.
    pub pull_request: PrStatus,
}

impl MigrationReport {
    /// Returns true if any failures occurred after the push.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        matches!(self.pull_request, PrStatus::Failed { .. })
    }

    /// Returns true if every step succeeded without warnings.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures() && self.cleanup_warnings.is_empty()
    }
}
