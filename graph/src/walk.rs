//! Depth-first walk over a [`GraphTraversal`].

use crate::traversal::GraphTraversal;
use std::collections::HashSet;
use std::ops::ControlFlow;

/// Depth-first walk from a set of start nodes towards their ancestors.
///
/// Each reachable node is handed to the visitor at most once. Parents are
/// explored first parent first. The visited set lives only as long as the
/// walk.
pub struct DfsWalk<'g, G: GraphTraversal> {
    graph: &'g G,
    starts: Vec<G::Node>,
    visited: HashSet<G::Node>,
}

impl<'g, G: GraphTraversal> DfsWalk<'g, G> {
    pub fn new(graph: &'g G, starts: impl IntoIterator<Item = G::Node>) -> Self {
        Self {
            graph,
            starts: starts.into_iter().collect(),
            visited: HashSet::new(),
        }
    }

    /// Run the walk.
    ///
    /// The visitor returns `Continue` to descend into the node's parents or
    /// `Break` to stop the whole walk. An error from the visitor stops the
    /// walk and is returned as is.
    pub fn walk<E, F>(mut self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(G::Node) -> Result<ControlFlow<()>, E>,
    {
        let mut stack: Vec<G::Node> = self.starts.drain(..).rev().collect();

        while let Some(node) = stack.pop() {
            if !self.visited.insert(node) {
                continue;
            }
            if visit(node)?.is_break() {
                return Ok(());
            }
            let parents = self.graph.parents_of(node);
            stack.extend(
                parents
                    .into_iter()
                    .rev()
                    .filter(|parent| !self.visited.contains(parent)),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommitId, CommitNode, Dag};
    use chrono::Utc;
    use std::convert::Infallible;

    fn oid(short: &str) -> CommitId {
        format!("{:0<40}", short).parse().unwrap()
    }

    fn dag(edges: &[(&str, &[&str])]) -> Dag {
        let mut dag = Dag::new();
        for (id, parents) in edges {
            dag.add_node(CommitNode::new(
                oid(id),
                parents.iter().map(|p| oid(p)).collect(),
                Utc::now(),
                "Author".to_string(),
                format!("Commit {id}"),
            ));
        }
        dag
    }

    fn visit_all(dag: &Dag, start: &str) -> Vec<CommitId> {
        let mut seen = Vec::new();
        let start = dag.resolve_ref(oid(start).as_str()).unwrap();
        DfsWalk::new(dag, [start])
            .walk(|node| {
                seen.push(dag.commit_id_of(node));
                Ok::<_, Infallible>(ControlFlow::Continue(()))
            })
            .unwrap();
        seen
    }

    #[test]
    fn test_walks_first_parent_first() {
        let dag = dag(&[
            ("a0", &[]),
            ("b1", &["a0"]),
            ("b2", &["a0"]),
            ("d3", &["b1", "b2"]),
        ]);

        assert_eq!(visit_all(&dag, "d3"), vec![oid("d3"), oid("b1"), oid("a0"), oid("b2")]);
    }

    #[test]
    fn test_break_stops_walk() {
        let dag = dag(&[("c1", &[]), ("c2", &["c1"]), ("c3", &["c2"])]);
        let start = dag.node_of(&oid("c3")).unwrap();
        let mut seen = Vec::new();

        DfsWalk::new(&dag, [start])
            .walk(|node| {
                let id = dag.commit_id_of(node);
                let stop = id == oid("c2");
                seen.push(id);
                Ok::<_, Infallible>(if stop { ControlFlow::Break(()) } else { ControlFlow::Continue(()) })
            })
            .unwrap();

        assert_eq!(seen, vec![oid("c3"), oid("c2")]);
    }

    #[test]
    fn test_error_propagates() {
        let dag = dag(&[("c1", &[]), ("c2", &["c1"])]);
        let start = dag.node_of(&oid("c2")).unwrap();

        let result = DfsWalk::new(&dag, [start]).walk(|node| {
            if dag.parents_of(node).is_empty() {
                Err("root")
            } else {
                Ok(ControlFlow::Continue(()))
            }
        });

        assert_eq!(result, Err("root"));
    }
}
