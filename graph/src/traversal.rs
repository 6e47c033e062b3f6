use crate::core::{CommitId, Dag, NodeId};
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;

/// Read-only view of a commit graph, edges pointing from child to parents.
pub trait GraphTraversal {
    /// Handle of a commit inside this graph
    type Node: Copy + Eq + Hash + Debug;

    /// Resolve a symbolic name (or a full commit id) to a node
    fn resolve_ref(&self, name: &str) -> Option<Self::Node>;

    /// Parents of `node`, first parent first
    fn parents_of(&self, node: Self::Node) -> SmallVec<[Self::Node; 2]>;

    /// Whether the commit behind `node` is part of the graph. Nodes only
    /// known as the parent of a loaded commit return `false`, and their
    /// parents are unknown.
    fn is_loaded(&self, _node: Self::Node) -> bool {
        true
    }

    fn commit_id_of(&self, node: Self::Node) -> CommitId;

    fn node_of(&self, id: &CommitId) -> Option<Self::Node>;
}

impl GraphTraversal for Dag {
    type Node = NodeId;

    fn resolve_ref(&self, name: &str) -> Option<NodeId> {
        match self.get_ref(name) {
            Some(id) => self.node_id(id),
            None => name.parse::<CommitId>().ok().and_then(|id| self.node_id(&id)),
        }
    }

    /// Commits outside the loaded range have no known parents.
    fn parents_of(&self, node: NodeId) -> SmallVec<[NodeId; 2]> {
        self.parent_nodes(node)
    }

    fn is_loaded(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn commit_id_of(&self, node: NodeId) -> CommitId {
        self.commit_id(node).clone()
    }

    fn node_of(&self, id: &CommitId) -> Option<NodeId> {
        self.node_id(id)
    }
}

impl<G: GraphTraversal + ?Sized> GraphTraversal for &G {
    type Node = G::Node;

    fn resolve_ref(&self, name: &str) -> Option<Self::Node> {
        (**self).resolve_ref(name)
    }

    fn parents_of(&self, node: Self::Node) -> SmallVec<[Self::Node; 2]> {
        (**self).parents_of(node)
    }

    fn is_loaded(&self, node: Self::Node) -> bool {
        (**self).is_loaded(node)
    }

    fn commit_id_of(&self, node: Self::Node) -> CommitId {
        (**self).commit_id_of(node)
    }

    fn node_of(&self, id: &CommitId) -> Option<Self::Node> {
        (**self).node_of(id)
    }
}
