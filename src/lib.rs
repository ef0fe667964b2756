//! # repo-snapshot
//!
//! Saves a readable snapshot of a git working tree: staged and untracked
//! status lines plus name-status diffs, written to
//! `<repo>/Logs/GitLog_<timestamp>_<hash>_<subject>.txt`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use repo_snapshot::git::{ProcessRunner, RepositoryPath, DEFAULT_TIMEOUT};
//! use repo_snapshot::report::ReportPipeline;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let repo = RepositoryPath::new(".")?;
//! let pipeline = ReportPipeline::new(Arc::new(ProcessRunner::new()), "git", DEFAULT_TIMEOUT);
//! let report = pipeline.run(&repo, chrono::Local::now().naive_local()).await?;
//! report.save()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod report;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::error::SnapshotError;

/// The current version of repo-snapshot.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
