use std::{io, process};

use clap::Parser;
use repo_snapshot::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // stdout carries the saved report path (or report text with --print) for
    // scripts; tracing output and failures stay on stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = Cli::parse().execute().await {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  Caused by: {cause}");
        }
        process::exit(1);
    }
}
