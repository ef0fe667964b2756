//! Latest commit lookup and filesystem-safe subject labels.

use tracing::debug;

use crate::error::SnapshotError;
use crate::git::{GitCli, LATEST_COMMIT_ARGS};

/// Separator between hash and subject in the commit query output.
const HASH_SEPARATOR: char = '_';

/// Subject used when the commit line has no separator.
pub const NO_MESSAGE: &str = "NoMessage";

/// Label used when sanitizing leaves nothing behind.
pub const NO_COMMIT_MESSAGE: &str = "NoCommitMessage";

/// Maximum number of characters kept from a sanitized subject.
pub const MAX_SUBJECT_CHARS: usize = 50;

/// Appended to subjects that were cut at [`MAX_SUBJECT_CHARS`].
pub const ELLIPSIS: &str = "...";

/// Characters rejected in file names on at least one supported platform.
///
/// The Windows set is used everywhere so a report name produced on Linux can
/// be copied to any machine. `#` is allowed.
pub const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Identity of the most recent commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDescriptor {
    hash: String,
    sanitized_subject: String,
}

impl CommitDescriptor {
    /// Parses a `<hash>_<subject>` line.
    ///
    /// Only the first separator splits; later underscores belong to the
    /// subject. Without a separator the whole line is the hash.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (hash, subject) = match line.split_once(HASH_SEPARATOR) {
            Some((hash, subject)) => (hash, subject),
            None => (line, NO_MESSAGE),
        };

        Self {
            hash: hash.to_string(),
            sanitized_subject: sanitize_subject(subject),
        }
    }

    /// Abbreviated commit hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Subject made safe for use in a file name.
    pub fn sanitized_subject(&self) -> &str {
        &self.sanitized_subject
    }
}

/// Makes a commit subject safe to embed in a file name.
///
/// Invalid characters, control characters and `&` become `_`; spaces become
/// `-`. Subjects longer than [`MAX_SUBJECT_CHARS`] are cut and suffixed with
/// [`ELLIPSIS`].
pub fn sanitize_subject(subject: &str) -> String {
    let replaced: String = subject
        .chars()
        .map(|c| match c {
            ' ' => '-',
            '&' => '_',
            c if c.is_control() || INVALID_FILENAME_CHARS.contains(&c) => '_',
            c => c,
        })
        .collect();

    if replaced.trim().is_empty() {
        return NO_COMMIT_MESSAGE.to_string();
    }

    if replaced.chars().count() > MAX_SUBJECT_CHARS {
        let mut truncated: String = replaced.chars().take(MAX_SUBJECT_CHARS).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        replaced
    }
}

/// Queries the latest commit of the repository behind `git`.
pub async fn resolve_latest_commit(git: &GitCli) -> Result<CommitDescriptor, SnapshotError> {
    let line = git.run(LATEST_COMMIT_ARGS).await?;
    let descriptor = CommitDescriptor::parse(&line);
    debug!(
        hash = descriptor.hash(),
        subject = descriptor.sanitized_subject(),
        "Resolved latest commit"
    );
    Ok(descriptor)
}
