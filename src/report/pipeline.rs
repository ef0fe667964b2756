//! End-to-end report generation for one repository.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::error::SnapshotError;
use crate::git::changes::collect_changes;
use crate::git::commit::resolve_latest_commit;
use crate::git::{CommandRunner, GitCli, RepositoryPath};
use crate::report::{build_output_path, format_report, Report};

/// Progress of a single pipeline run.
///
/// A run moves strictly forward through these stages and never revisits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Not started.
    Idle,
    /// Querying the latest commit.
    ResolvingCommit,
    /// Querying status and diffs.
    CollectingChanges,
    /// Rendering text and naming the file.
    Formatting,
    /// Report produced.
    Ready,
    /// Run aborted.
    Failed,
}

/// Produces reports using a git binary and a command runner.
#[derive(Clone)]
pub struct ReportPipeline {
    runner: Arc<dyn CommandRunner>,
    git_binary: String,
    timeout: Duration,
}

impl ReportPipeline {
    /// Creates a pipeline.
    pub fn new(runner: Arc<dyn CommandRunner>, git_binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            git_binary: git_binary.into(),
            timeout,
        }
    }

    /// Generates a report for `repo` stamped with `now`.
    pub async fn run(
        &self,
        repo: &RepositoryPath,
        now: NaiveDateTime,
    ) -> Result<Report, SnapshotError> {
        self.run_observed(repo, now, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting every stage entered to `observer`.
    ///
    /// Nothing is written to disk except the `Logs` directory; saving is up
    /// to the caller.
    pub async fn run_observed<F>(
        &self,
        repo: &RepositoryPath,
        now: NaiveDateTime,
        mut observer: F,
    ) -> Result<Report, SnapshotError>
    where
        F: FnMut(PipelineStage) + Send,
    {
        let mut enter = |stage: PipelineStage| {
            debug!(?stage, repo = %repo.as_path().display(), "Pipeline stage");
            observer(stage);
        };

        enter(PipelineStage::Idle);
        let result = self.generate(repo, now, &mut enter).await;
        match &result {
            Ok(_) => enter(PipelineStage::Ready),
            Err(e) => {
                warn!(error = %e, "Snapshot run failed");
                enter(PipelineStage::Failed);
            }
        }
        result
    }

    async fn generate<F>(
        &self,
        repo: &RepositoryPath,
        now: NaiveDateTime,
        enter: &mut F,
    ) -> Result<Report, SnapshotError>
    where
        F: FnMut(PipelineStage) + Send,
    {
        let git = GitCli::new(
            Arc::clone(&self.runner),
            self.git_binary.clone(),
            repo.clone(),
            self.timeout,
        );

        enter(PipelineStage::ResolvingCommit);
        let commit = resolve_latest_commit(&git).await?;

        enter(PipelineStage::CollectingChanges);
        let changes = collect_changes(&git).await?;

        enter(PipelineStage::Formatting);
        let content = format_report(&changes);
        let file_path = build_output_path(repo, &commit, now)?;

        Ok(Report::new(file_path, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::repository::unchecked_repository_path;
    use crate::git::test_utils::{count_calls, Scripted, ScriptedRunner};
    use crate::git::{LATEST_COMMIT_ARGS, STAGED_DIFF_ARGS, STATUS_ARGS, UNSTAGED_DIFF_ARGS};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    fn pipeline(runner: ScriptedRunner) -> ReportPipeline {
        ReportPipeline::new(Arc::new(runner), "git", Duration::from_secs(10))
    }

    #[tokio::test]
    async fn end_to_end_report() {
        let dir = TempDir::new().unwrap();
        let repo = unchecked_repository_path(dir.path());
        let runner =
            ScriptedRunner::snapshot("abc123_Fix bug #42", "M  a.txt\n?? b.txt", "M\ta.txt", "");

        let report = pipeline(runner).run(&repo, now()).await.unwrap();

        assert_eq!(
            report.content(),
            "=== Staged Changes ===\nM  a.txt\n\n\
             === Staged Modified Files ===\nM\ta.txt\n\n\
             === Unstaged Changes ===\n?? b.txt\n\n\
             === Unstaged Modified Files ===\nNo unstaged modifications.\n"
        );
        insta::assert_snapshot!("end_to_end_report", report.content());

        let name = report.file_path().file_name().unwrap().to_string_lossy();
        assert_eq!(name, "GitLog_20250102_030405_abc123_Fix-bug-#42.txt");
        assert!(name.ends_with("_abc123_Fix-bug-#42.txt"));
        assert_eq!(report.file_path().parent().unwrap(), dir.path().join("Logs"));
        // Generation alone must not write the report.
        assert!(!report.file_path().exists());
    }

    #[tokio::test]
    async fn stages_advance_in_order() {
        let dir = TempDir::new().unwrap();
        let repo = unchecked_repository_path(dir.path());
        let runner = ScriptedRunner::snapshot("abc_x", "", "", "");

        let mut stages = Vec::new();
        pipeline(runner)
            .run_observed(&repo, now(), |s| stages.push(s))
            .await
            .unwrap();

        assert_eq!(
            stages,
            vec![
                PipelineStage::Idle,
                PipelineStage::ResolvingCommit,
                PipelineStage::CollectingChanges,
                PipelineStage::Formatting,
                PipelineStage::Ready,
            ]
        );
    }

    #[tokio::test]
    async fn commit_timeout_aborts_before_collecting() {
        let dir = TempDir::new().unwrap();
        let repo = unchecked_repository_path(dir.path());
        let runner = ScriptedRunner::new()
            .on(LATEST_COMMIT_ARGS, Scripted::Timeout)
            .on(STATUS_ARGS, Scripted::Output(String::new()))
            .on(STAGED_DIFF_ARGS, Scripted::Output(String::new()))
            .on(UNSTAGED_DIFF_ARGS, Scripted::Output(String::new()));
        let calls = runner.calls_handle();

        let mut stages = Vec::new();
        let err = pipeline(runner)
            .run_observed(&repo, now(), |s| stages.push(s))
            .await
            .unwrap_err();

        assert!(matches!(err, SnapshotError::ExternalToolTimeout { .. }));
        assert_eq!(
            stages,
            vec![
                PipelineStage::Idle,
                PipelineStage::ResolvingCommit,
                PipelineStage::Failed,
            ]
        );
        assert_eq!(count_calls(&calls, LATEST_COMMIT_ARGS), 1);
        assert_eq!(count_calls(&calls, STATUS_ARGS), 0);
        assert!(!dir.path().join("Logs").exists());
    }

    #[tokio::test]
    async fn diff_failure_surfaces_without_retry() {
        let dir = TempDir::new().unwrap();
        let repo = unchecked_repository_path(dir.path());
        let runner = ScriptedRunner::new()
            .on(LATEST_COMMIT_ARGS, Scripted::Output("abc_x".to_string()))
            .on(STATUS_ARGS, Scripted::Output(String::new()))
            .on(
                STAGED_DIFF_ARGS,
                Scripted::Fail(129, "error: unknown option".to_string()),
            )
            .on(UNSTAGED_DIFF_ARGS, Scripted::Output(String::new()));
        let calls = runner.calls_handle();

        let err = pipeline(runner).run(&repo, now()).await.unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::ExternalToolFailure { exit_code: 129, .. }
        ));
        assert_eq!(count_calls(&calls, STAGED_DIFF_ARGS), 1);
    }

    #[tokio::test]
    async fn each_run_resolves_fresh() {
        let dir = TempDir::new().unwrap();
        let repo = unchecked_repository_path(dir.path());
        let runner = ScriptedRunner::snapshot("abc_x", "", "", "");
        let calls = runner.calls_handle();
        let pipeline = pipeline(runner);

        pipeline.run(&repo, now()).await.unwrap();
        pipeline.run(&repo, now()).await.unwrap();
        assert_eq!(count_calls(&calls, LATEST_COMMIT_ARGS), 2);
        assert_eq!(calls.lock().unwrap().len(), 8);
    }
}
