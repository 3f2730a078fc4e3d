//! Upstream repository identifiers.

mod error;

pub use error::InputError;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// An upstream repository in `owner/repo` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryId {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepositoryId {
    /// Creates an identifier from already validated parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Full repository name in "owner/name" format.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = InputError;

    /// Parses a single `owner/repo` line.
    ///
    /// Surrounding whitespace is ignored. Anything other than exactly two
    /// segments made of GitHub name characters is rejected.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let mut segments = trimmed.split('/');

        match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(name), None) if is_name(owner) && is_name(name) => {
                Ok(Self::new(owner, name))
            }
            _ => Err(InputError::Format {
                input: trimmed.to_string(),
            }),
        }
    }
}

/// Owner and repository names: ASCII alphanumerics, `-`, `_` and `.`,
/// excluding the `.` and `..` path segments.
fn is_name(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
