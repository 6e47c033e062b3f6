pub mod commit_id;
pub mod node;
pub mod dag;

pub use commit_id::{CommitId, CommitIdError};
pub use node::{subject_of, CommitNode, NodeId};
pub use dag::Dag;
