use chrono::{DateTime, Utc};

use super::commit_id::CommitId;

/// Opaque handle of a commit inside a [`Dag`](super::Dag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A commit node in the DAG
#[derive(Debug, Clone)]
pub struct CommitNode {
    /// Commit object name
    pub id: CommitId,
    /// Parent commit IDs, first parent first
    pub parents: Vec<CommitId>,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
    /// Author name
    pub author: String,
    /// Author email
    pub email: String,
    /// Committer name, email and timestamp
    pub committer: (String, String, DateTime<Utc>),
    /// Full commit message
    pub message: String,
}

impl CommitNode {
    pub fn new(
        id: CommitId,
        parents: Vec<CommitId>,
        timestamp: DateTime<Utc>,
        author: String,
        message: String,
    ) -> Self {
        Self {
            id,
            parents,
            timestamp,
            committer: (author.clone(), String::new(), timestamp),
            author,
            email: String::new(),
            message,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_committer(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        self.committer = (name.into(), email.into(), time);
        self
    }

    /// Subject line, as `git log --format=%s` prints it
    pub fn subject(&self) -> String {
        subject_of(&self.message)
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// First paragraph of a commit message with its lines joined by spaces.
pub fn subject_of(message: &str) -> String {
    message
        .trim_start_matches('\n')
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}
