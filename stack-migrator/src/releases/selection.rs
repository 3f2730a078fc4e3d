//! Choosing which release to migrate onto.

use super::ReleaseTag;
use thiserror::Error;

/// Errors that can occur while choosing a release.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagSelectionError {
    /// The repository has no releases.
    #[error("Repository has no releases")]
    NoReleases,

    /// The requested or consumed tag is not among the releases.
    #[error("Tag '{tag}' is not a release of this repository")]
    UnknownTag { tag: String },

    /// The consumed tag is already the newest release.
    #[error("Already on the newest release '{tag}'")]
    AlreadyCurrent { tag: String },
}

/// Strategy for picking the target release from a newest-first release list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagSelection {
    /// The newest release.
    #[default]
    Latest,

    /// The release published right after the tag the downstream repository
    /// currently consumes.
    NewerThan(String),

    /// A specific release tag.
    Exact(String),
}

impl TagSelection {
    /// Builds a selection from the optional CLI inputs.
    ///
    /// An explicit tag wins over a consumed tag; with neither, the newest
    /// release is chosen.
    #[must_use]
    pub fn from_options(exact: Option<String>, consumed: Option<String>) -> Self {
        match (exact, consumed) {
            (Some(tag), _) => Self::Exact(tag),
            (None, Some(consumed)) => Self::NewerThan(consumed),
            (None, None) => Self::Latest,
        }
    }

    /// Picks a release from `releases`, which must be in API order
    /// (newest first).
    ///
    /// The returned release is always an element of `releases`.
    pub fn select<'a>(&self, releases: &'a [ReleaseTag]) -> Result<&'a ReleaseTag, TagSelectionError> {
        if releases.is_empty() {
            return Err(TagSelectionError::NoReleases);
        }

        match self {
            Self::Latest => Ok(&releases[0]),
            Self::Exact(tag) => find(releases, tag).map(|position| &releases[position]),
            Self::NewerThan(consumed) => match find(releases, consumed)? {
                0 => Err(TagSelectionError::AlreadyCurrent {
                    tag: consumed.clone(),
                }),
                position => Ok(&releases[position - 1]),
            },
        }
    }
}

fn find(releases: &[ReleaseTag], tag: &str) -> Result<usize, TagSelectionError> {
    releases
        .iter()
        .position(|release| release.tag_name == tag)
        .ok_or_else(|| TagSelectionError::UnknownTag {
            tag: tag.to_string(),
        })
}
