//! Generate command — one report, no prompts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use crate::git::RepositoryPath;
use crate::report::ReportPipeline;

/// Generate command options.
#[derive(Parser)]
pub struct GenerateCommand {
    /// Repository working tree to snapshot.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Also write the report text to stdout.
    #[arg(long)]
    pub print: bool,

    /// Do not write the report file.
    #[arg(long)]
    pub no_save: bool,
}

impl GenerateCommand {
    /// Executes the generate command.
    pub async fn execute(self, pipeline: &ReportPipeline) -> Result<()> {
        let repo = RepositoryPath::new(&self.path)?;

        let report = pipeline
            .run(&repo, Local::now().naive_local())
            .await
            .context("Failed to generate report")?;

        if self.print {
            print!("{}", report.content());
        }

        if self.no_save {
            return Ok(());
        }

        let saved = report.save().context("Failed to save report")?;
        if self.print {
            eprintln!("Saved report to {}", saved.display());
        } else {
            println!("{}", saved.display());
        }

        Ok(())
    }
}
