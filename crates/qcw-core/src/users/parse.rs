//! Single-line parsing for the user list.

use std::fmt;

use super::UserIdentity;

/// Why a user-list line was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Blank,
    MissingSeparator,
    EmptyDomain,
    EmptyUser,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectReason::Blank => "blank line",
            RejectReason::MissingSeparator => "expected DOMAIN\\user",
            RejectReason::EmptyDomain => "empty domain",
            RejectReason::EmptyUser => "empty user name",
        };
        f.write_str(msg)
    }
}

/// Parses `DOMAIN\user`. The line is trimmed, split on the first backslash,
/// and both halves must be non-empty after trimming.
pub fn parse_line(line: &str) -> Result<UserIdentity, RejectReason> {
    let line = line.trim();
    if line.is_empty() {
        return Err(RejectReason::Blank);
    }
    let (domain, user) = line.split_once('\\').ok_or(RejectReason::MissingSeparator)?;
    let (domain, user) = (domain.trim(), user.trim());
    if domain.is_empty() {
        return Err(RejectReason::EmptyDomain);
    }
    if user.is_empty() {
        return Err(RejectReason::EmptyUser);
    }
    Ok(UserIdentity::new(domain, user))
}
