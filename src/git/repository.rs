//! Validated repository locations.

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::error::SnapshotError;

/// Path to the root of a non-bare git working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPath {
    path: PathBuf,
}

impl RepositoryPath {
    /// Validates a user-supplied path.
    ///
    /// Surrounding whitespace and quotes (as left by drag-and-drop into a
    /// terminal) are stripped first.
    pub fn new(input: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let raw = input.as_ref().to_string_lossy();
        let cleaned = raw.trim().trim_matches(|c: char| c == '"' || c == '\'');
        if cleaned.is_empty() {
            return Err(SnapshotError::invalid_repository(
                input.as_ref(),
                "no path given",
            ));
        }

        let path = PathBuf::from(cleaned);
        if !path.exists() {
            return Err(SnapshotError::invalid_repository(&path, "path does not exist"));
        }
        if !path.is_dir() {
            return Err(SnapshotError::invalid_repository(&path, "not a directory"));
        }
        if !path.join(".git").exists() {
            return Err(SnapshotError::invalid_repository(
                &path,
                "no .git directory found",
            ));
        }

        let repo = Repository::open(&path)
            .map_err(|e| SnapshotError::invalid_repository(&path, e.message().to_string()))?;
        if repo.is_bare() {
            return Err(SnapshotError::invalid_repository(
                &path,
                "bare repositories have no working tree",
            ));
        }

        debug!(path = %path.display(), "Validated repository path");
        Ok(Self { path })
    }

    /// Returns the working tree root.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory reports are written to.
    pub fn logs_dir(&self) -> PathBuf {
        self.path.join(crate::report::LOGS_DIR)
    }
}

impl AsRef<Path> for RepositoryPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
pub(crate) fn unchecked_repository_path(path: impl Into<PathBuf>) -> RepositoryPath {
    RepositoryPath { path: path.into() }
}
