use super::commit_id::CommitId;
use super::node::{CommitNode, NodeId};
use smallvec::SmallVec;
use std::collections::HashMap;

/// A loaded commit together with its resolved parent handles.
#[derive(Debug, Clone)]
struct Slot {
    node: CommitNode,
    parents: SmallVec<[NodeId; 2]>,
}

/// Directed Acyclic Graph representing commit history
///
/// Every commit id the graph has seen, either as a loaded commit or as the
/// parent of one, is interned into a [`NodeId`]. Parents of a commit at the
/// edge of a truncated history are therefore still counted, they just have
/// no [`CommitNode`] of their own.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    /// NodeId -> commit id
    ids: Vec<CommitId>,
    /// Commit id -> NodeId
    index: HashMap<CommitId, NodeId>,
    /// Loaded commits, aligned with `ids`
    slots: Vec<Option<Slot>>,
    /// Symbolic names (`HEAD`, branch names) -> node
    refs: HashMap<String, NodeId>,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, id: &CommitId) -> NodeId {
        if let Some(&node) = self.index.get(id) {
            return node;
        }
        let node = NodeId(self.ids.len() as u32);
        self.ids.push(id.clone());
        self.slots.push(None);
        self.index.insert(id.clone(), node);
        node
    }

    /// Add a commit node to the DAG, replacing an earlier node with the same id
    pub fn add_node(&mut self, node: CommitNode) -> NodeId {
        let id = self.intern(&node.id);
        let parents = node.parents.iter().map(|p| self.intern(p)).collect();
        self.slots[id.index()] = Some(Slot { node, parents });
        id
    }

    /// Point a symbolic name at a commit
    pub fn set_ref(&mut self, name: impl Into<String>, target: &CommitId) {
        let node = self.intern(target);
        self.refs.insert(name.into(), node);
    }

    /// Commit a symbolic name points at
    pub fn get_ref(&self, name: &str) -> Option<&CommitId> {
        self.refs.get(name).map(|node| &self.ids[node.index()])
    }

    pub fn node_id(&self, id: &CommitId) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn commit_id(&self, node: NodeId) -> &CommitId {
        &self.ids[node.index()]
    }

    /// Loaded commit behind a handle
    pub fn node(&self, node: NodeId) -> Option<&CommitNode> {
        self.slots.get(node.index())?.as_ref().map(|slot| &slot.node)
    }

    /// Loaded commit by id
    pub fn commit(&self, id: &CommitId) -> Option<&CommitNode> {
        self.node(self.node_id(id)?)
    }

    pub(crate) fn parent_nodes(&self, node: NodeId) -> SmallVec<[NodeId; 2]> {
        self.slots
            .get(node.index())
            .and_then(|slot| slot.as_ref())
            .map(|slot| slot.parents.clone())
            .unwrap_or_default()
    }

    /// Get loaded parents of a commit
    pub fn get_parents(&self, id: &CommitId) -> Vec<&CommitNode> {
        self.node_id(id)
            .map(|node| {
                self.parent_nodes(node)
                    .into_iter()
                    .filter_map(|parent| self.node(parent))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get all root commits (no parents)
    pub fn roots(&self) -> Vec<&CommitNode> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| &slot.node)
            .filter(|node| node.is_root())
            .collect()
    }

    /// Count of loaded commits
    pub fn node_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Count of loaded merge commits
    pub fn merge_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|slot| slot.node.is_merge())
            .count()
    }
}
