//! Input error types.

use thiserror::Error;

/// Errors that can occur while reading the repository identifier.
#[derive(Debug, Error)]
pub enum InputError {
    /// Input did not split into exactly two non-empty segments.
    #[error("Expected a repository in the form owner/repo, got '{input}'")]
    Format { input: String },

    /// Failed to read from standard input.
    #[error("Failed to read repository from standard input: {0}")]
    Read(#[from] std::io::Error),
}
