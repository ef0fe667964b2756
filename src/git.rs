//! Git invocations used to build a working-tree snapshot.
//!
//! Every call runs the git binary with the repository as its working
//! directory; the process-wide current directory is never touched.

use std::sync::Arc;
use std::time::Duration;

use crate::error::SnapshotError;

pub mod changes;
pub mod commit;
pub mod repository;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_utils;

pub use changes::{ChangeSet, StatusClass};
pub use commit::CommitDescriptor;
pub use repository::RepositoryPath;
pub use runner::{CommandResult, CommandRunner, CommandSpec, ProcessRunner};

/// Arguments for the latest commit's `<hash>_<subject>` line.
pub const LATEST_COMMIT_ARGS: &[&str] = &["log", "-1", "--format=%h_%s"];

/// Arguments for machine-readable working-tree status.
pub const STATUS_ARGS: &[&str] = &["status", "--porcelain=v1"];

/// Arguments for the name-and-status diff of staged changes.
pub const STAGED_DIFF_ARGS: &[&str] = &["diff", "--cached", "--name-status"];

/// Arguments for the name-and-status diff of unstaged changes.
pub const UNSTAGED_DIFF_ARGS: &[&str] = &["diff", "--name-status"];

/// Default deadline for a single git invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Git binary bound to one repository.
#[derive(Clone)]
pub struct GitCli {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    repo: RepositoryPath,
    timeout: Duration,
}

impl GitCli {
    /// Creates a git wrapper for `repo`.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        binary: impl Into<String>,
        repo: RepositoryPath,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            binary: binary.into(),
            repo,
            timeout,
        }
    }

    /// Returns the repository this wrapper runs in.
    pub fn repository(&self) -> &RepositoryPath {
        &self.repo
    }

    /// Builds the full invocation for `args`.
    ///
    /// Colour and pager are disabled and the locale pinned so output is
    /// stable across user configurations.
    pub fn command(&self, args: &[&str]) -> CommandSpec {
        CommandSpec::new(&self.binary, self.repo.as_path(), self.timeout)
            .args(["--no-pager", "-c", "color.ui=never"])
            .args(args.iter().copied())
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_OPTIONAL_LOCKS", "0")
    }

    /// Runs git with `args` and returns its standard output.
    pub async fn run(&self, args: &[&str]) -> Result<String, SnapshotError> {
        let spec = self.command(args);
        let result = self.runner.run(&spec).await?;
        Ok(result.stdout)
    }
}
