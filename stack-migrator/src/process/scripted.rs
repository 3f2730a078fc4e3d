//! Scripted executor that records invocations instead of spawning processes.

use super::{CommandExecutor, CommandOutput, Invocation};
use std::path::PathBuf;
use std::sync::Mutex;

type Responder = dyn Fn(&Invocation) -> std::io::Result<CommandOutput> + Send + Sync;

/// Records every invocation and answers with a canned result (for testing).
pub struct ScriptedExecutor {
    invocations: Mutex<Vec<Invocation>>,
    responder: Box<Responder>,
    installed: Vec<String>,
}

impl ScriptedExecutor {
    /// Creates an executor answering each invocation with `responder`.
    ///
    /// `git` and `gh` are reported as installed.
    pub fn new(
        responder: impl Fn(&Invocation) -> std::io::Result<CommandOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            installed: vec!["git".to_string(), "gh".to_string()],
        }
    }

    /// Creates an executor where every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(CommandOutput::succeeded("")))
    }

    /// Replaces the set of executables that [`CommandExecutor::lookup`] finds.
    #[must_use]
    pub fn with_installed(mut self, programs: &[&str]) -> Self {
        self.installed = programs.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// All invocations so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().clone()
    }

    /// All invocations so far as space-joined argument vectors
    /// (e.g. `"git am v2-0.patch"`).
    pub fn commands(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|invocation| invocation.display_args().join(" "))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Invocation>> {
        self.invocations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        self.lock().push(invocation.clone());
        (self.responder)(invocation)
    }

    fn lookup(&self, name: &str) -> Option<PathBuf> {
        self.installed
            .iter()
            .any(|program| program == name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }
}
