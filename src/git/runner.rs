//! External process execution with per-call deadlines.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::error::SnapshotError;

/// A fully described external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable to run.
    pub program: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Directory the process runs in.
    pub working_dir: PathBuf,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
    /// Deadline after which the process is killed.
    pub timeout: Duration,
}

impl CommandSpec {
    /// Creates a spec with no arguments.
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            env: Vec::new(),
            timeout,
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

    /// Adds an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output of a command that exited successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Standard output with trailing whitespace removed.
    pub stdout: String,
    /// Exit code (always zero for a returned result).
    pub exit_code: i32,
    /// Wall-clock time the process ran.
    pub duration: Duration,
}

/// Runs external commands.
///
/// Implementations spawn exactly one process per call and never retry.
pub trait CommandRunner: Send + Sync {
    /// Runs the command, failing on timeout or a non-zero exit code.
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult, SnapshotError>> + Send + 'a>>;
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a process runner.
    pub fn new() -> Self {
        Self
    }

    async fn execute(spec: &CommandSpec) -> Result<CommandResult, SnapshotError> {
        let start = Instant::now();

        debug!(
            program = %spec.program,
            args = ?spec.args,
            working_dir = %spec.working_dir.display(),
            timeout_ms = spec.timeout.as_millis(),
            "Spawning process"
        );

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| SnapshotError::ToolUnavailable {
            command: spec.to_string(),
            source,
        })?;

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        // Drain both pipes while waiting so a chatty process cannot block on a full buffer.
        let collect = async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let (stdout_read, stderr_read, status) = tokio::join!(
                read_pipe(stdout_pipe.as_mut(), &mut stdout),
                read_pipe(stderr_pipe.as_mut(), &mut stderr),
                child.wait(),
            );
            stdout_read?;
            stderr_read?;
            Ok::<(ExitStatus, Vec<u8>, Vec<u8>), std::io::Error>((status?, stdout, stderr))
        };

        let outcome = tokio::time::timeout(spec.timeout, collect).await;

        let (status, stdout, stderr) = match outcome {
            Ok(Ok(collected)) => collected,
            Ok(Err(source)) => {
                reap(&mut child, spec).await;
                return Err(SnapshotError::ToolUnavailable {
                    command: spec.to_string(),
                    source,
                });
            }
            Err(_) => {
                warn!(
                    command = %spec,
                    timeout_ms = spec.timeout.as_millis(),
                    "Process exceeded its deadline, killing it"
                );
                reap(&mut child, spec).await;
                return Err(SnapshotError::ExternalToolTimeout {
                    command: spec.to_string(),
                    timeout: spec.timeout,
                });
            }
        };

        let duration = start.elapsed();
        let exit_code = status.code().unwrap_or(-1);

        debug!(
            exit_code,
            duration_ms = duration.as_millis(),
            "Process completed"
        );

        if !status.success() {
            return Err(SnapshotError::ExternalToolFailure {
                command: spec.to_string(),
                exit_code,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&stdout).trim_end().to_string();
        trace!(stdout = %stdout, "Process output");

        Ok(CommandResult {
            stdout,
            exit_code,
            duration,
        })
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult, SnapshotError>> + Send + 'a>> {
        Box::pin(Self::execute(spec))
    }
}

async fn read_pipe<R>(pipe: Option<&mut R>, buf: &mut Vec<u8>) -> std::io::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    if let Some(pipe) = pipe {
        pipe.read_to_end(buf).await?;
    }
    Ok(())
}

/// Kills the child and waits for it so no zombie is left behind.
async fn reap(child: &mut tokio::process::Child, spec: &CommandSpec) {
    if let Err(e) = child.kill().await {
        // Already exited between the deadline and the kill.
        debug!(command = %spec, error = %e, "Kill after deadline failed");
        let _ = child.wait().await;
    }
}
