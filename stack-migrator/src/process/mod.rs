//! External command execution.
//!
//! Every subprocess the pipeline starts goes through [`ProcessRunner`], which
//! captures stderr into its errors and delegates the actual spawning to a
//! [`CommandExecutor`]. Swapping the executor (see [`ScriptedExecutor`])
//! replaces process execution without touching the callers.

mod error;
mod locate;
mod scripted;

pub use error::ProcessError;
pub use locate::{not_installed, search_path};
pub use scripted::ScriptedExecutor;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// When set to a non-empty value, invoked commands are echoed to stderr.
const DEBUG_ENV: &str = "DEBUG";

/// A single command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Resolved path of the executable.
    pub program: PathBuf,

    /// Arguments, excluding the program itself.
    pub args: Vec<String>,

    /// Working directory; inherits the current one when unset.
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation of `program` without arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// The argument vector with the executable reduced to its base name.
    #[must_use]
    pub fn display_args(&self) -> Vec<String> {
        let program = self
            .program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned();
        std::iter::once(program)
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Whether the process exited successfully.
    pub success: bool,

    /// Human readable exit status (e.g. "exit status: 1").
    pub status: String,

    /// Exit code, absent when the process was killed by a signal.
    pub code: Option<i32>,

    /// Captured standard output.
    pub stdout: Vec<u8>,

    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// A successful exit with the given stdout.
    pub fn succeeded(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// A failed exit with the given code and stderr.
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            success: false,
            status: format!("exit status: {code}"),
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }
}

/// Process-execution entry point.
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs the invocation to completion, capturing stdout and stderr.
    async fn execute(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;

    /// Resolves an executable name to a path.
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        search_path(name, std::env::var_os("PATH").as_deref())
    }
}

/// [`CommandExecutor`] that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

#[async_trait::async_trait]
impl CommandExecutor for SystemExecutor {
    async fn execute(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().await?;
        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Runs commands through a [`CommandExecutor`] with a time budget.
#[derive(Clone)]
pub struct ProcessRunner {
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
    echo_args: bool,
}

impl ProcessRunner {
    /// Creates a runner. Argument echoing follows the `DEBUG` variable.
    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self {
            executor,
            timeout,
            echo_args: debug_enabled(),
        }
    }

    /// Creates a runner that spawns real processes.
    pub fn system(timeout: Duration) -> Self {
        Self::new(Arc::new(SystemExecutor), timeout)
    }

    /// Overrides whether invoked commands are echoed to stderr.
    #[must_use]
    pub fn with_echo_args(mut self, echo_args: bool) -> Self {
        self.echo_args = echo_args;
        self
    }

    /// Resolves `name` on the search path.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::NotInstalled`] with an installation hint.
    pub fn locate(&self, name: &str) -> Result<PathBuf, ProcessError> {
        self.executor.lookup(name).ok_or_else(|| not_installed(name))
    }

    /// Runs a command and returns its stdout.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Failed`] on a non-zero exit, embedding the
    /// captured stderr and the argument vector.
    pub async fn run(&self, invocation: &Invocation) -> Result<String, ProcessError> {
        let args = invocation.display_args();
        debug!(command = %args.join(" "), "Running command");
        if self.echo_args {
            eprintln!("[{}]", args.join(" "));
        }

        let output = tokio::time::timeout(self.timeout, self.executor.execute(invocation))
            .await
            .map_err(|_| ProcessError::TimedOut {
                args: args.clone(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|source| ProcessError::Spawn {
                program: args[0].clone(),
                source,
            })?;

        if !output.success {
            return Err(ProcessError::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                args,
                status: output.status,
                code: output.code,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs a command, discarding its stdout.
    ///
    /// # Errors
    ///
    /// Same as [`ProcessRunner::run`].
    pub async fn execute(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        self.run(invocation).await.map(|_| ())
    }
}

fn debug_enabled() -> bool {
    std::env::var_os(DEBUG_ENV).is_some_and(|value| !value.is_empty())
}

/// Convenience for building an invocation rooted in `dir`.
pub(crate) fn invocation_in(program: &Path, dir: &Path) -> Invocation {
    Invocation::new(program).current_dir(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(executor: ScriptedExecutor) -> (Arc<ScriptedExecutor>, ProcessRunner) {
        let executor = Arc::new(executor);
        let runner = ProcessRunner::new(executor.clone(), Duration::from_secs(5));
        (executor, runner)
    }

    #[test]
    fn display_args_use_base_name() {
        let invocation = Invocation::new("/usr/local/bin/git").args(["am", "v2-0.patch"]);
        assert_eq!(invocation.display_args(), vec!["git", "am", "v2-0.patch"]);
    }

    #[tokio::test]
    async fn run_returns_stdout() {
        let (_, runner) = runner(ScriptedExecutor::new(|_| {
            Ok(CommandOutput::succeeded("https://github.com/acme/app/pull/7\n"))
        }));

        let stdout = runner
            .run(&Invocation::new("/usr/bin/gh").args(["pr", "create"]))
            .await
            .unwrap();

        assert_eq!(stdout, "https://github.com/acme/app/pull/7\n");
    }

    #[tokio::test]
    async fn failure_captures_stderr_and_args() {
        let (_, runner) = runner(ScriptedExecutor::new(|_| {
            Ok(CommandOutput::failed(
                128,
                "fatal: a branch named 'patch-apply' already exists",
            ))
        }));

        let error = runner
            .execute(&Invocation::new("/usr/bin/git").args(["checkout", "-b", "patch-apply"]))
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "fatal: a branch named 'patch-apply' already exists\n\
             git checkout -b patch-apply: exit status: 128"
        );
        assert_eq!(
            error.stderr(),
            Some("fatal: a branch named 'patch-apply' already exists")
        );
    }

    #[tokio::test]
    async fn spawn_failure_is_reported() {
        let (_, runner) = runner(ScriptedExecutor::new(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            ))
        }));

        let error = runner
            .execute(&Invocation::new("/usr/bin/git").args(["status"]))
            .await
            .unwrap_err();

        assert!(matches!(error, ProcessError::Spawn { ref program, .. } if program == "git"));
    }

    #[tokio::test]
    async fn locate_uses_executor_lookup() {
        let (_, runner) = runner(ScriptedExecutor::succeeding().with_installed(&["git"]));

        assert_eq!(runner.locate("git").unwrap(), PathBuf::from("/usr/bin/git"));
        assert!(matches!(
            runner.locate("gh"),
            Err(ProcessError::NotInstalled { .. })
        ));
    }

    #[tokio::test]
    async fn records_invocations_in_order() {
        let (executor, runner) = runner(ScriptedExecutor::succeeding());
        let git = PathBuf::from("/usr/bin/git");

        runner
            .execute(&Invocation::new(&git).args(["am", "a.patch"]))
            .await
            .unwrap();
        runner
            .execute(&Invocation::new(&git).args(["am", "b.patch"]))
            .await
            .unwrap();

        assert_eq!(executor.commands(), vec!["git am a.patch", "git am b.patch"]);
    }

    #[test]
    fn debug_variable_enables_echo() {
        temp_env::with_var(DEBUG_ENV, Some("1"), || {
            assert!(debug_enabled());
        });
        temp_env::with_var(DEBUG_ENV, Some(""), || {
            assert!(!debug_enabled());
        });
        temp_env::with_var_unset(DEBUG_ENV, || {
            assert!(!debug_enabled());
        });
    }
}
