//! Release and commit records returned by the hosting API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published release of the upstream template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTag {
    /// Name of the git tag the release points at.
    pub tag_name: String,

    /// When the release was created.
    pub created_at: DateTime<Utc>,

    /// When the release was published. Drafts carry no publish date.
    pub published_at: Option<DateTime<Utc>>,
}

/// The commit a release tag resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit hash.
    pub sha: String,

    /// GraphQL node identifier.
    pub node_id: String,

    /// Browser URL of the commit. Appending `.patch` yields its mailbox patch.
    pub html_url: String,

    /// Direct ancestors, in the order the API reports them.
    pub parents: Vec<ParentRef>,
}

/// A direct ancestor of a [`CommitRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    /// Commit hash.
    pub sha: String,

    /// API URL of the parent commit.
    pub url: String,

    /// Browser URL of the parent commit.
    pub html_url: String,
}
