//! Shared test utilities for the `git` module.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::SnapshotError;
use crate::git::runner::{CommandResult, CommandRunner, CommandSpec};
use crate::git::{LATEST_COMMIT_ARGS, STAGED_DIFF_ARGS, STATUS_ARGS, UNSTAGED_DIFF_ARGS};

/// Canned behaviour for one git invocation.
#[derive(Clone, Debug)]
pub(crate) enum Scripted {
    /// Exit 0 with this standard output.
    Output(String),
    /// Exit non-zero with this stderr.
    Fail(i32, String),
    /// Exceed the deadline.
    Timeout,
}

/// Fake runner answering by argument suffix.
///
/// A call matches a script entry when its arguments end with the entry's
/// signature, so the global `--no-pager -c ...` prefix is ignored. Every
/// call is recorded; unmatched calls fail with exit code 127.
#[derive(Clone, Default)]
pub(crate) struct ScriptedRunner {
    scripts: Vec<(Vec<String>, Scripted)>,
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answers calls ending in `signature` with `response`.
    pub(crate) fn on(mut self, signature: &[&str], response: Scripted) -> Self {
        self.scripts
            .push((signature.iter().map(|s| (*s).to_string()).collect(), response));
        self
    }

    /// Scripts all four snapshot queries with successful output.
    pub(crate) fn snapshot(commit: &str, status: &str, staged: &str, unstaged: &str) -> Self {
        Self::new()
            .on(LATEST_COMMIT_ARGS, Scripted::Output(commit.to_string()))
            .on(STATUS_ARGS, Scripted::Output(status.to_string()))
            .on(STAGED_DIFF_ARGS, Scripted::Output(staged.to_string()))
            .on(UNSTAGED_DIFF_ARGS, Scripted::Output(unstaged.to_string()))
    }

    /// Returns a handle to the recorded calls that survives moving the runner.
    pub(crate) fn calls_handle(&self) -> Arc<Mutex<Vec<CommandSpec>>> {
        Arc::clone(&self.calls)
    }

    fn respond(&self, spec: &CommandSpec) -> Result<CommandResult, SnapshotError> {
        self.calls.lock().unwrap().push(spec.clone());

        let script = self
            .scripts
            .iter()
            .find(|(signature, _)| spec.args.ends_with(signature))
            .map(|(_, response)| response.clone());

        match script {
            Some(Scripted::Output(stdout)) => Ok(CommandResult {
                stdout: stdout.trim_end().to_string(),
                exit_code: 0,
                duration: Duration::from_millis(1),
            }),
            Some(Scripted::Fail(exit_code, stderr)) => Err(SnapshotError::ExternalToolFailure {
                command: spec.to_string(),
                exit_code,
                stderr,
            }),
            Some(Scripted::Timeout) => Err(SnapshotError::ExternalToolTimeout {
                command: spec.to_string(),
                timeout: spec.timeout,
            }),
            None => Err(SnapshotError::ExternalToolFailure {
                command: spec.to_string(),
                exit_code: 127,
                stderr: "unscripted invocation".to_string(),
            }),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult, SnapshotError>> + Send + 'a>> {
        Box::pin(async move { self.respond(spec) })
    }
}

/// Number of recorded calls whose arguments end with `signature`.
pub(crate) fn count_calls(calls: &Arc<Mutex<Vec<CommandSpec>>>, signature: &[&str]) -> usize {
    let signature: Vec<String> = signature.iter().map(|s| (*s).to_string()).collect();
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|spec| spec.args.ends_with(&signature))
        .count()
}
