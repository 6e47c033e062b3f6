use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hex object name of a commit.
///
/// Always stored lower-cased so that ids coming from different sources
/// (git2, user input, todo files) compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitIdError {
    #[error("commit id must be between {min} and {max} hex digits, got {0:?}", min = CommitId::MIN_LEN, max = CommitId::MAX_LEN)]
    Length(String),
    #[error("commit id contains a non-hex character: {0:?}")]
    NotHex(String),
}

impl CommitId {
    pub const MIN_LEN: usize = 4;
    /// Long enough for SHA-256 object names.
    pub const MAX_LEN: usize = 64;
    const SHORT_LEN: usize = 7;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form, as printed by `git log --oneline`
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(Self::SHORT_LEN)]
    }

    /// Whether `prefix` abbreviates this id. Case-insensitive.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.len() >= prefix.len()
            && self.0.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }
}

impl FromStr for CommitId {
    type Err = CommitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < Self::MIN_LEN || s.len() > Self::MAX_LEN {
            return Err(CommitIdError::Length(s.to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CommitIdError::NotHex(s.to_string()));
        }
        Ok(CommitId(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for CommitId {
    type Error = CommitIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        CommitId(oid.to_string())
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
