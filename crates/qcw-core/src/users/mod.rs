//! User list loader: one `DOMAIN\user` per line.
//!
//! Malformed lines are logged and skipped; only failing to read the file
//! aborts the run.

mod parse;

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

pub use parse::{parse_line, RejectReason};

/// A `domain\user` pair the QRS can impersonate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    pub domain: String,
    pub user: String,
}

impl UserIdentity {
    pub fn new(domain: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            user: user.into(),
        }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.domain, self.user)
    }
}

/// A line that was excluded from the job set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number in the source file.
    pub line_no: usize,
    pub content: String,
    pub reason: RejectReason,
}

/// Result of loading a user file: accepted identities in file order plus rejections.
#[derive(Debug, Clone, Default)]
pub struct UserList {
    pub identities: Vec<UserIdentity>,
    pub rejected: Vec<RejectedLine>,
}

impl UserList {
    /// Parse every line of `text`. No deduplication.
    ///
    /// A leading UTF-8 byte-order mark is dropped so it never ends up in the
    /// first user's directory.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut list = UserList::default();
        for (idx, line) in text.lines().enumerate() {
            match parse_line(line) {
                Ok(identity) => list.identities.push(identity),
                Err(reason) => {
                    tracing::warn!(line = idx + 1, %reason, content = line, "skipping user line");
                    list.rejected.push(RejectedLine {
                        line_no: idx + 1,
                        content: line.to_string(),
                        reason,
                    });
                }
            }
        }
        list
    }
}

/// Reads and parses a user file.
pub fn load_users(path: &Path) -> Result<UserList> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read user file {}", path.display()))?;
    let list = UserList::parse(&text);
    tracing::info!(
        path = %path.display(),
        accepted = list.identities.len(),
        rejected = list.rejected.len(),
        "loaded user list"
    );
    Ok(list)
}
