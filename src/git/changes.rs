//! Working-tree status and diff collection.

use tracing::debug;

use crate::error::SnapshotError;
use crate::git::{GitCli, STAGED_DIFF_ARGS, STATUS_ARGS, UNSTAGED_DIFF_ARGS};

/// Status prefix marking untracked entries.
pub const UNTRACKED_MARKER: &str = "??";

/// Which report section a status line belongs to.
///
/// This is deliberately coarse: only the `??` prefix is recognised, every
/// other status (including renames and conflicts) counts as staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Anything that is not untracked.
    Staged,
    /// Lines starting with `??`.
    Unstaged,
}

impl StatusClass {
    /// Classifies one porcelain status line.
    pub fn of(line: &str) -> Self {
        if line.starts_with(UNTRACKED_MARKER) {
            Self::Unstaged
        } else {
            Self::Staged
        }
    }
}

/// Raw outputs of the three change queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Non-empty status lines in git's order.
    pub status_lines: Vec<String>,
    /// `--name-status` diff of the index against HEAD.
    pub staged_diff_summary: String,
    /// `--name-status` diff of the working tree against the index.
    pub unstaged_diff_summary: String,
}

impl ChangeSet {
    /// Builds a change set from raw command output.
    pub fn from_outputs(status: &str, staged_diff: &str, unstaged_diff: &str) -> Self {
        Self {
            status_lines: split_status_lines(status),
            staged_diff_summary: staged_diff.to_string(),
            unstaged_diff_summary: unstaged_diff.to_string(),
        }
    }

    /// Status lines classified as staged, in order.
    pub fn staged_lines(&self) -> impl Iterator<Item = &str> {
        self.lines_of(StatusClass::Staged)
    }

    /// Status lines classified as untracked/unstaged, in order.
    pub fn unstaged_lines(&self) -> impl Iterator<Item = &str> {
        self.lines_of(StatusClass::Unstaged)
    }

    fn lines_of(&self, class: StatusClass) -> impl Iterator<Item = &str> {
        self.status_lines
            .iter()
            .map(String::as_str)
            .filter(move |line| StatusClass::of(line) == class)
    }
}

/// Splits status output into its non-empty lines.
pub fn split_status_lines(status: &str) -> Vec<String> {
    status
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs the status and both diff queries concurrently.
///
/// The three invocations share nothing; the first failure aborts the rest.
pub async fn collect_changes(git: &GitCli) -> Result<ChangeSet, SnapshotError> {
    let (status, staged, unstaged) = tokio::try_join!(
        git.run(STATUS_ARGS),
        git.run(STAGED_DIFF_ARGS),
        git.run(UNSTAGED_DIFF_ARGS),
    )?;

    let changes = ChangeSet::from_outputs(&status, &staged, &unstaged);
    debug!(
        status_lines = changes.status_lines.len(),
        staged = changes.staged_lines().count(),
        untracked = changes.unstaged_lines().count(),
        "Collected working-tree changes"
    );
    Ok(changes)
}
