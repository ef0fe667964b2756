//! CLI interface for repo-snapshot.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::SnapshotConfig;
use crate::git::ProcessRunner;
use crate::report::ReportPipeline;

pub mod formatting;
pub mod generate;
pub mod session;

pub use generate::GenerateCommand;
pub use session::{Session, SessionCommand, SessionState};

/// repo-snapshot: save a readable snapshot of a git working tree.
#[derive(Parser)]
#[command(name = "repo-snapshot")]
#[command(
    about = "Saves staged and unstaged git changes to a report named after the latest commit",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Git executable to run (defaults to `git` on PATH).
    #[arg(long, global = true, value_name = "BIN")]
    pub git: Option<String>,

    /// Seconds each git invocation may run before it is killed.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Command to execute; starts an interactive session when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Interactive loop: choose a repository, preview, save, and open reports.
    Session(SessionCommand),
    /// Generates a single report without prompting.
    Generate(GenerateCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = SnapshotConfig::load(self.git, self.timeout)?;
        let pipeline = ReportPipeline::new(
            Arc::new(ProcessRunner::new()),
            config.git_binary.clone(),
            config.timeout,
        );

        match self.command {
            Some(Commands::Generate(cmd)) => cmd.execute(&pipeline).await,
            Some(Commands::Session(cmd)) => cmd.execute(pipeline, config).await,
            None => SessionCommand::default().execute(pipeline, config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_session() {
        let cli = Cli::try_parse_from(["repo-snapshot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "repo-snapshot",
            "generate",
            "/tmp/repo",
            "--print",
            "--timeout",
            "5",
            "--git",
            "/usr/bin/git",
        ])
        .unwrap();
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.git.as_deref(), Some("/usr/bin/git"));
        match cli.command {
            Some(Commands::Generate(cmd)) => {
                assert_eq!(cmd.path, std::path::PathBuf::from("/tmp/repo"));
                assert!(cmd.print);
                assert!(!cmd.no_save);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn generate_requires_path() {
        assert!(Cli::try_parse_from(["repo-snapshot", "generate"]).is_err());
    }
}
