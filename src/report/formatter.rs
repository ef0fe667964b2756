//! Report text layout and destination naming.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::error::SnapshotError;
use crate::git::{ChangeSet, CommitDescriptor, RepositoryPath};

/// Prefix of every report file name.
pub const FILE_PREFIX: &str = "GitLog";

/// Timestamp layout used in report file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The four report sections, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Status lines other than untracked entries.
    StagedChanges,
    /// Name-status diff of the index.
    StagedModifiedFiles,
    /// Untracked status lines.
    UnstagedChanges,
    /// Name-status diff of the working tree.
    UnstagedModifiedFiles,
}

impl Section {
    /// All sections in report order.
    pub const ALL: [Section; 4] = [
        Section::StagedChanges,
        Section::StagedModifiedFiles,
        Section::UnstagedChanges,
        Section::UnstagedModifiedFiles,
    ];

    /// Heading text between the `===` markers.
    pub fn title(self) -> &'static str {
        match self {
            Section::StagedChanges => "Staged Changes",
            Section::StagedModifiedFiles => "Staged Modified Files",
            Section::UnstagedChanges => "Unstaged Changes",
            Section::UnstagedModifiedFiles => "Unstaged Modified Files",
        }
    }

    /// Body used when the section has no content.
    pub fn fallback(self) -> &'static str {
        match self {
            Section::StagedChanges => "No staged changes.",
            Section::StagedModifiedFiles => "No staged modifications.",
            Section::UnstagedChanges => "No unstaged changes.",
            Section::UnstagedModifiedFiles => "No unstaged modifications.",
        }
    }

    fn body(self, changes: &ChangeSet) -> String {
        match self {
            Section::StagedChanges => changes.staged_lines().collect::<Vec<_>>().join("\n"),
            Section::StagedModifiedFiles => changes.staged_diff_summary.clone(),
            Section::UnstagedChanges => changes.unstaged_lines().collect::<Vec<_>>().join("\n"),
            Section::UnstagedModifiedFiles => changes.unstaged_diff_summary.clone(),
        }
    }
}

/// Renders the four-section report body.
pub fn format_report(changes: &ChangeSet) -> String {
    Section::ALL
        .iter()
        .map(|section| {
            let body = section.body(changes);
            let body = if body.trim().is_empty() {
                section.fallback()
            } else {
                body.as_str()
            };
            format!("=== {} ===\n{}\n", section.title(), body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// File name for a report taken at `now` on `commit`.
pub fn report_file_name(commit: &CommitDescriptor, now: NaiveDateTime) -> String {
    format!(
        "{FILE_PREFIX}_{}_{}_{}.txt",
        now.format(TIMESTAMP_FORMAT),
        commit.hash(),
        commit.sanitized_subject()
    )
}

/// Returns the report destination, creating the `Logs` directory if needed.
pub fn build_output_path(
    repo: &RepositoryPath,
    commit: &CommitDescriptor,
    now: NaiveDateTime,
) -> Result<PathBuf, SnapshotError> {
    let logs_dir = repo.logs_dir();
    std::fs::create_dir_all(&logs_dir).map_err(|e| SnapshotError::filesystem(&logs_dir, e))?;
    Ok(logs_dir.join(report_file_name(commit, now)))
}
