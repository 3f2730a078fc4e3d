//! Process execution error types.

use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable is not on the search path.
    #[error("{message}")]
    NotInstalled { program: String, message: String },

    /// The process could not be started.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    ///
    /// Renders as the captured stderr followed by the argument vector and the
    /// exit status, ready to show to the user as-is.
    #[error("{}{}: {status}", terminated(.stderr), .args.join(" "))]
    Failed {
        stderr: String,
        args: Vec<String>,
        status: String,
        code: Option<i32>,
    },

    /// The process exceeded its time budget and was killed.
    #[error("{} timed out after {timeout_secs} seconds", .args.join(" "))]
    TimedOut { args: Vec<String>, timeout_secs: u64 },
}

impl ProcessError {
    /// Captured standard error of a failed process, if any.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Exit code of a failed process, if it exited normally.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

fn terminated(stderr: &str) -> String {
    if stderr.is_empty() || stderr.ends_with('\n') {
        stderr.to_string()
    } else {
        format!("{stderr}\n")
    }
}
