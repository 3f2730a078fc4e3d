//! Patch retrieval error types.

use thiserror::Error;

/// Errors that can occur while downloading or storing patch files.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The commit URL could not be turned into a patch URL.
    #[error("Invalid commit URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The download failed or returned an error status.
    #[error("Failed to download '{url}': {message}")]
    Download { url: String, message: String },

    /// The download exceeded its time budget.
    #[error("Timed out after {timeout_secs} seconds downloading '{url}'")]
    Timeout { url: String, timeout_secs: u64 },

    /// The patch file could not be written.
    #[error("Failed to write patch file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A failed download together with the files the run had already written.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct IncompleteDownload {
    /// Patch files written before the failure, in download order.
    pub written: Vec<std::path::PathBuf>,

    /// What stopped the download.
    #[source]
    pub source: PatchError,
}
