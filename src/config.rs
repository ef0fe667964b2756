//! Runtime configuration.
//!
//! Each value comes from the command line, then the environment, then
//! `$HOME/.repo-snapshot/settings.json`, then a built-in default.

use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::git::DEFAULT_TIMEOUT;
use crate::utils::Settings;

/// Environment key for the git executable.
pub const GIT_BINARY_KEY: &str = "REPO_SNAPSHOT_GIT";

/// Environment key for the per-invocation timeout in seconds.
pub const TIMEOUT_KEY: &str = "REPO_SNAPSHOT_TIMEOUT_SECS";

/// Environment keys consulted, in order, for the editor used to open reports.
pub const EDITOR_KEYS: &[&str] = &["REPO_SNAPSHOT_EDITOR", "EDITOR"];

/// Resolved configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Git executable name or path.
    pub git_binary: String,
    /// Deadline for each git invocation.
    pub timeout: Duration,
    /// Editor command used to open saved reports.
    pub editor: Option<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            git_binary: "git".to_string(),
            timeout: DEFAULT_TIMEOUT,
            editor: None,
        }
    }
}

impl SnapshotConfig {
    /// Loads settings from disk and applies command-line overrides.
    pub fn load(git_override: Option<String>, timeout_override: Option<u64>) -> Result<Self> {
        let settings = Settings::load().context("Failed to load settings")?;
        Self::resolve(&settings, git_override, timeout_override)
    }

    /// Resolves configuration against already loaded settings.
    pub fn resolve(
        settings: &Settings,
        git_override: Option<String>,
        timeout_override: Option<u64>,
    ) -> Result<Self> {
        let git_binary = git_override
            .or_else(|| settings.get_env_var(GIT_BINARY_KEY))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "git".to_string());

        let timeout_secs = match timeout_override {
            Some(secs) => Some(secs),
            None => settings
                .get_env_var(TIMEOUT_KEY)
                .map(|raw| {
                    raw.trim().parse::<u64>().with_context(|| {
                        format!("{TIMEOUT_KEY} must be a whole number of seconds, got '{raw}'")
                    })
                })
                .transpose()?,
        };

        let timeout = match timeout_secs {
            Some(0) => bail!("Timeout must be at least one second"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        let editor = settings
            .get_env_vars(EDITOR_KEYS)
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            git_binary,
            timeout,
            editor,
        })
    }
}
