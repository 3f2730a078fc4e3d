//! Executable lookup on the search path.

use super::ProcessError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Finds `name` in the directories of `search_path` (a `PATH`-style value).
///
/// On Windows the usual executable extensions are tried as well.
#[must_use]
pub fn search_path(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let search_path = search_path?;
    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut paths = vec![dir.join(name)];
    if cfg!(windows) {
        paths.extend(
            ["exe", "cmd", "bat", "com"]
                .iter()
                .map(|ext| dir.join(format!("{name}.{ext}"))),
        );
    }
    paths
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Builds the error for a missing executable, naming what to install.
pub fn not_installed(program: &str) -> ProcessError {
    ProcessError::NotInstalled {
        program: program.to_string(),
        message: format!(
            "unable to find {program} executable in PATH; please install {} before retrying",
            install_hint(program, std::env::consts::OS)
        ),
    }
}

/// Name of the package that provides `program` on `os`.
fn install_hint(program: &str, os: &str) -> String {
    match (program, os) {
        ("git", "windows") => "Git for Windows".to_string(),
        ("gh", _) => "GitHub CLI (gh)".to_string(),
        _ => program.to_string(),
    }
}
