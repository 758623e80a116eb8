use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use time::UtcOffset;

use crate::{Error, Result};

use super::*;

#[derive(Debug, Clone)]
pub struct CommitUser {
    pub kind: CommitUserKind,
    /// Name and email, as in `Jane Doe <jane@example.com>`
    pub identifier: String,
    pub timestamp: SystemTime,
    pub timezone: UtcOffset,
}

impl CommitUser {
    /// A user signing right now, in the local timezone (or UTC if it can't be determined).
    pub fn now(kind: CommitUserKind, name: &str, email: &str) -> Self {
        CommitUser {
            kind,
            identifier: format!("{} <{}>", name, email),
            timestamp: SystemTime::now(),
            timezone: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    /// Returns the line this user takes in a commit, without the trailing newline:
    ///
    /// `{kind} {identifier} {unix seconds} {timezone}`
    pub fn to_line(&self) -> Result<String> {
        let seconds = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map_err(|_| Error::Formatting("commit timestamp is before the epoch".into()))?
            .as_secs();
        let timezone = self
            .timezone
            .format(TIMEZONE_FORMAT)
            .map_err(|e| Error::Formatting(format!("could not format timezone: {}", e)))?;

        Ok(format!(
            "{} {} {} {}",
            self.kind, self.identifier, seconds, timezone
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitUserKind {
    Author,
    Committer,
}

impl Display for CommitUserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CommitUserKind::Author => AUTHOR_STR,
            CommitUserKind::Committer => COMMITTER_STR,
        })
    }
}
