//! Commit metadata and the batch lookup used to fetch it.

use chrono::{DateTime, Utc};
use graph::{CommitId, CommitNode, Dag};
use serde::Serialize;

/// Name, email and timestamp of an author or committer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub time: DateTime<Utc>,
}

/// What `git log` would print about a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMetadata {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    /// First paragraph of the message, lines joined by spaces
    pub subject: String,
    pub full_message: String,
    pub author: Signature,
    pub committer: Signature,
}

impl From<&CommitNode> for CommitMetadata {
    fn from(node: &CommitNode) -> Self {
        let (committer, committer_email, committed) = &node.committer;
        Self {
            id: node.id.clone(),
            parents: node.parents.clone(),
            subject: node.subject(),
            full_message: node.message.clone(),
            author: Signature {
                name: node.author.clone(),
                email: node.email.clone(),
                time: node.timestamp,
            },
            committer: Signature {
                name: committer.clone(),
                email: committer_email.clone(),
                time: *committed,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("commit {0} not found")]
    NotFound(CommitId),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Batch lookup of commit metadata.
pub trait MetadataLookup {
    /// Fetch metadata for `ids`, returned in the same order.
    fn fetch_metadata(&self, ids: &[CommitId]) -> Result<Vec<CommitMetadata>, MetadataError>;
}

impl MetadataLookup for Dag {
    fn fetch_metadata(&self, ids: &[CommitId]) -> Result<Vec<CommitMetadata>, MetadataError> {
        ids.iter()
            .map(|id| {
                self.commit(id)
                    .map(CommitMetadata::from)
                    .ok_or_else(|| MetadataError::NotFound(id.clone()))
            })
            .collect()
    }
}

impl<M: MetadataLookup + ?Sized> MetadataLookup for &M {
    fn fetch_metadata(&self, ids: &[CommitId]) -> Result<Vec<CommitMetadata>, MetadataError> {
        (**self).fetch_metadata(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn oid(short: &str) -> CommitId {
        format!("{:0<40}", short).parse().unwrap()
    }

    #[test]
    fn test_dag_lookup_preserves_order() {
        let time = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        let mut dag = Dag::new();
        dag.add_node(
            CommitNode::new(oid("c1"), vec![], time, "Ann".into(), "Initial\n\nbody".into())
                .with_email("ann@example.com"),
        );
        dag.add_node(CommitNode::new(oid("c2"), vec![oid("c1")], time, "Bob".into(), "Second".into()));

        let metadata = dag.fetch_metadata(&[oid("c2"), oid("c1")]).unwrap();

        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].id, oid("c2"));
        assert_eq!(metadata[0].parents, vec![oid("c1")]);
        assert_eq!(metadata[1].subject, "Initial");
        assert_eq!(metadata[1].full_message, "Initial\n\nbody");
        assert_eq!(metadata[1].author.email, "ann@example.com");
        assert_eq!(metadata[1].author.time, time);
    }

    #[test]
    fn test_dag_lookup_unknown_commit() {
        let dag = Dag::new();
        let err = dag.fetch_metadata(&[oid("c9")]).unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(id) if id == oid("c9")));
    }
}
