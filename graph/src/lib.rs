//! Commit history as an in-memory DAG, and the traversal primitives used to
//! walk it.

pub mod core;
pub mod git_backend;
pub mod traversal;
pub mod walk;

pub use core::{subject_of, CommitId, CommitIdError, CommitNode, Dag, NodeId};
pub use git_backend::{commit_to_node, GitWalker, HEAD};
pub use traversal::GraphTraversal;
pub use walk::DfsWalk;
