//! Interactive session — pick a repository, preview its report, save or open it.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::debug;

use super::formatting::{format_error_chain, parse_editor_command, rule};
use crate::config::SnapshotConfig;
use crate::git::RepositoryPath;
use crate::report::{Report, ReportPipeline};

/// Session command options.
#[derive(Parser, Default)]
pub struct SessionCommand {
    /// Repository to start with; prompts when omitted.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl SessionCommand {
    /// Executes the session command.
    pub async fn execute(self, pipeline: ReportPipeline, config: SnapshotConfig) -> Result<()> {
        check_input(self.path.as_deref(), io::stdin().is_terminal())?;

        let mut session = Session::new(pipeline, config.editor);
        session
            .run(self.path, &mut io::BufReader::new(io::stdin()))
            .await
    }
}

/// Where the session loop currently is.
#[derive(Debug)]
pub enum SessionState {
    /// Waiting for a repository path.
    PromptingPath,
    /// Generating a report for the repository.
    Running(RepositoryPath),
    /// Showing a generated report and offering follow-up actions.
    Previewing {
        /// Repository the report was taken from.
        repo: RepositoryPath,
        /// The generated report.
        report: Report,
        /// Whether the report has been written to disk.
        saved: bool,
    },
    /// Session finished.
    Done,
}

/// Interactive driver around a [`ReportPipeline`].
pub struct Session {
    pipeline: ReportPipeline,
    editor: Option<String>,
}

impl Session {
    /// Creates a session; `editor` is used by the open action.
    pub fn new(pipeline: ReportPipeline, editor: Option<String>) -> Self {
        Self { pipeline, editor }
    }

    /// Runs the loop until the user quits or input ends.
    ///
    /// `reader` is injected so tests can drive the loop without a terminal.
    pub async fn run(
        &mut self,
        initial_path: Option<PathBuf>,
        reader: &mut (dyn BufRead + Send),
    ) -> Result<()> {
        println!("📸 repo-snapshot {}", crate::VERSION);

        let mut state = match initial_path {
            Some(path) => self.validate(&path),
            None => SessionState::PromptingPath,
        };

        loop {
            state = match state {
                SessionState::Done => break,
                other => self.step(other, reader).await?,
            };
        }

        println!("👋 Bye.");
        Ok(())
    }

    /// Advances the state machine by one transition.
    pub async fn step(
        &mut self,
        state: SessionState,
        reader: &mut (dyn BufRead + Send),
    ) -> Result<SessionState> {
        debug!(?state, "Session step");
        match state {
            SessionState::PromptingPath => self.prompt_path(reader),
            SessionState::Running(repo) => self.generate(repo, reader).await,
            SessionState::Previewing {
                repo,
                report,
                saved,
            } => self.follow_up(repo, report, saved, reader),
            SessionState::Done => Ok(SessionState::Done),
        }
    }

    fn validate(&self, path: &Path) -> SessionState {
        match RepositoryPath::new(path) {
            Ok(repo) => SessionState::Running(repo),
            Err(e) => {
                println!("❌ {e}");
                SessionState::PromptingPath
            }
        }
    }

    fn prompt_path(&self, reader: &mut (dyn BufRead + Send)) -> Result<SessionState> {
        let Some(input) = prompt(reader, "📁 Repository path (or 'q' to quit): ")? else {
            return Ok(SessionState::Done);
        };

        match input.trim() {
            "" => Ok(SessionState::PromptingPath),
            "q" | "quit" | "exit" => Ok(SessionState::Done),
            path => Ok(self.validate(Path::new(path))),
        }
    }

    async fn generate(
        &mut self,
        repo: RepositoryPath,
        reader: &mut (dyn BufRead + Send),
    ) -> Result<SessionState> {
        println!("🔍 Inspecting {} ...", repo.as_path().display());

        match self.pipeline.run(&repo, Local::now().naive_local()).await {
            Ok(report) => {
                show_preview(&report);
                Ok(SessionState::Previewing {
                    repo,
                    report,
                    saved: false,
                })
            }
            Err(e) => {
                println!("❌ Snapshot failed: {}", format_error_chain(&e));
                self.after_failure(repo, reader)
            }
        }
    }

    fn after_failure(
        &self,
        repo: RepositoryPath,
        reader: &mut (dyn BufRead + Send),
    ) -> Result<SessionState> {
        loop {
            let message = "❓ [R]etry, [C]hange repository, or [Q]uit? [R/c/q] ";
            let Some(input) = prompt(reader, message)? else {
                return Ok(SessionState::Done);
            };

            match input.trim().to_lowercase().as_str() {
                "r" | "retry" | "" => return Ok(SessionState::Running(repo)),
                "c" | "change" => return Ok(SessionState::PromptingPath),
                "q" | "quit" => return Ok(SessionState::Done),
                _ => println!(
                    "Invalid choice. Please enter 'r' to retry, 'c' to change repository, or 'q' to quit."
                ),
            }
        }
    }

    fn follow_up(
        &self,
        repo: RepositoryPath,
        report: Report,
        mut saved: bool,
        reader: &mut (dyn BufRead + Send),
    ) -> Result<SessionState> {
        let Some(input) = prompt(
            reader,
            "❓ [S]ave, [O]pen, [P]review again, [R]un again, [C]hange repository, or [Q]uit? [S/o/p/r/c/q] ",
        )?
        else {
            return Ok(SessionState::Done);
        };

        match input.trim().to_lowercase().as_str() {
            "s" | "save" | "" => {
                if saved {
                    println!("ℹ️  Already saved to {}", report.file_path().display());
                } else {
                    saved = save(&report);
                }
            }
            "o" | "open" => {
                if !saved {
                    saved = save(&report);
                }
                if saved {
                    self.open(report.file_path())?;
                }
            }
            "p" | "preview" => show_preview(&report),
            "r" | "run" => return Ok(SessionState::Running(repo)),
            "c" | "change" => return Ok(SessionState::PromptingPath),
            "q" | "quit" => return Ok(SessionState::Done),
            _ => println!("Invalid choice. Please enter 's', 'o', 'p', 'r', 'c', or 'q'."),
        }

        Ok(SessionState::Previewing {
            repo,
            report,
            saved,
        })
    }

    /// Opens a saved report in the configured editor.
    fn open(&self, path: &Path) -> Result<()> {
        let Some(editor) = self.editor.as_deref() else {
            println!(
                "🔧 No editor configured. Set REPO_SNAPSHOT_EDITOR or EDITOR to open reports."
            );
            println!("   Report is at: {}", path.display());
            return Ok(());
        };

        println!("📝 Opening report in editor: {editor}");
        let (editor_cmd, args) = parse_editor_command(editor);

        match Command::new(editor_cmd).args(args).arg(path).status() {
            Ok(status) if status.success() => println!("✅ Editor session completed."),
            Ok(status) => println!(
                "⚠️  Editor exited with non-zero status: {:?}",
                status.code()
            ),
            Err(e) => {
                println!("❌ Failed to execute editor '{editor}': {e}");
                println!("   Please check that the editor command is correct and available in your PATH.");
            }
        }

        Ok(())
    }
}

fn show_preview(report: &Report) {
    println!("\n📄 Report preview:");
    println!("{}", rule());
    print!("{}", report.content());
    println!("{}", rule());
    println!("💾 Will be saved as: {}", report.file_path().display());
}

/// Saves the report; a failure is printed and leaves the report unsaved.
fn save(report: &Report) -> bool {
    match report.save() {
        Ok(path) => {
            println!("✅ Report saved to {}", path.display());
            true
        }
        Err(e) => {
            println!("❌ Save failed: {}", format_error_chain(&e));
            false
        }
    }
}

/// Piped input is only accepted when the starting repository is given.
fn check_input(path: Option<&Path>, interactive: bool) -> Result<()> {
    if path.is_none() && !interactive {
        anyhow::bail!(
            "stdin is not interactive; pass a repository path or use `repo-snapshot generate <PATH>`"
        );
    }
    Ok(())
}

/// Prints `message` and reads one line; `None` on end of input.
fn prompt(reader: &mut (dyn BufRead + Send), message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    let bytes = reader.read_line(&mut input)?;
    if bytes == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(input))
}
