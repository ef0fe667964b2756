//! Snapshot reports: layout, naming, and persistence.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SnapshotError;

pub mod formatter;
pub mod pipeline;

pub use formatter::{build_output_path, format_report, report_file_name, Section};
pub use pipeline::{PipelineStage, ReportPipeline};

/// Directory under the repository root that receives reports.
pub const LOGS_DIR: &str = "Logs";

/// A rendered report and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    file_path: PathBuf,
    content: String,
}

impl Report {
    /// Creates a report.
    pub fn new(file_path: PathBuf, content: String) -> Self {
        Self { file_path, content }
    }

    /// Destination inside the repository's `Logs` directory.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Report text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Writes the report to [`file_path`](Self::file_path).
    ///
    /// The text goes to a temporary file in the same directory which is then
    /// renamed into place, so readers never observe a partial report. An
    /// existing file at the destination is replaced.
    pub fn save(&self) -> Result<&Path, SnapshotError> {
        let dir = self
            .file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::Builder::new()
            .prefix(".report-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| SnapshotError::filesystem(dir, e))?;
        tmp.write_all(self.content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| SnapshotError::filesystem(tmp.path(), e))?;
        tmp.persist(&self.file_path)
            .map_err(|e| SnapshotError::filesystem(&self.file_path, e.error))?;

        debug!(path = %self.file_path.display(), bytes = self.content.len(), "Saved report");
        Ok(&self.file_path)
    }
}
