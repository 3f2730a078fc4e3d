//! Pull request status types.

use serde::Serialize;

/// Outcome of opening the migration pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrStatus {
    /// PR successfully created.
    Created {
        /// URL printed by the PR tool.
        url: String,
    },

    /// PR creation failed; the pushed branch is kept.
    Failed {
        /// Error message.
        error: String,
    },
}

impl PrStatus {
    /// Returns the status as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns the PR URL if created.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Created { url } => Some(url),
            Self::Failed { .. } => None,
        }
    }
}
