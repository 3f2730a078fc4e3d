//! Release directory error types.

use thiserror::Error;

/// Errors that can occur while querying the hosting API.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Transport failure or an unexpected API status.
    #[error("GitHub API request failed: {message}")]
    Network { message: String },

    /// The payload did not match the expected shape.
    #[error("Failed to decode GitHub API response: {message}")]
    Decode { message: String },

    /// The repository, tag or commit does not exist.
    #[error("'{reference}' was not found")]
    NotFound { reference: String },

    /// The request exceeded its time budget.
    #[error("GitHub API request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl ReleaseError {
    /// Maps an octocrab error onto the release error kinds.
    ///
    /// `reference` names what was being looked up and is reported for
    /// missing resources.
    pub(crate) fn from_octocrab(error: octocrab::Error, reference: &str) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                // 422 is what GitHub answers for a ref that does not resolve
                if status == 404 || status == 422 {
                    Self::NotFound {
                        reference: reference.to_string(),
                    }
                } else {
                    Self::Network {
                        message: format!("status {status}: {}", source.message),
                    }
                }
            }
            octocrab::Error::Serde { source, .. } => Self::Decode {
                message: source.to_string(),
            },
            octocrab::Error::Json { source, .. } => Self::Decode {
                message: source.to_string(),
            },
            other => Self::Network {
                message: other.to_string(),
            },
        }
    }
}
