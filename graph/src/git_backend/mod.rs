pub mod walker;

pub use walker::{commit_to_node, GitWalker, HEAD};
