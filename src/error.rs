//! Errors raised while producing a repository snapshot.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures that abort a single snapshot run.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The path does not exist or is not a git working tree.
    #[error("Invalid repository '{}': {reason}", path.display())]
    InvalidRepository {
        /// Path that was rejected.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// An external tool did not exit before its deadline and was killed.
    #[error("'{command}' timed out after {} seconds", timeout.as_secs_f32())]
    ExternalToolTimeout {
        /// Command line that was run.
        command: String,
        /// Deadline that was exceeded.
        timeout: Duration,
    },

    /// An external tool exited with a non-zero code.
    #[error("'{command}' failed with exit code {exit_code}: {stderr}")]
    ExternalToolFailure {
        /// Command line that was run.
        command: String,
        /// Exit code, or -1 when the process was terminated by a signal.
        exit_code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// The external tool could not be started at all.
    #[error("Failed to start '{command}'. Is it installed and on PATH?")]
    ToolUnavailable {
        /// Command line that was attempted.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Creating the log directory or writing the report failed.
    #[error("Filesystem error at '{}'", path.display())]
    Filesystem {
        /// Path being created or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_repository(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRepository {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
