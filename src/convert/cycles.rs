//! Cycle detection and repair on the dependency graph.
//!
//! Detection walks from each node to its heads (along incoming edges) with an
//! explicit stack, so deep chains never touch the call stack.

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::model::{Edge, EdgeId, Graph, NodeIdx};
use super::tags;

struct Frame {
    node: NodeIdx,
    cursor: usize,
    /// Edge taken from this frame to the next one on the stack.
    via: Option<EdgeId>,
}

/// A cycle found by `find_cycle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Nodes on the walk when the cycle closed, starting node first. This
    /// includes any tail that leads into the cycle.
    pub path: Vec<NodeIdx>,
    /// The cycle's own edges, from the dependent where the walk entered the
    /// cycle up through its heads.
    pub edges: Vec<EdgeId>,
}

impl Cycle {
    /// Every live incoming edge of a path node, in path order.
    pub fn candidates<'g>(&'g self, graph: &'g Graph) -> impl Iterator<Item = EdgeId> + 'g {
        self.path.iter().flat_map(move |node| graph.incoming(*node).iter().copied())
    }
}

/// Find one cycle, if any exists.
pub fn find_cycle(graph: &Graph) -> Option<Cycle> {
    let mut visited: HashSet<NodeIdx> = HashSet::new();

    for start in (0..graph.len()).map(NodeIdx) {
        if !visited.insert(start) {
            continue;
        }
        let mut on_path: HashMap<NodeIdx, usize> = HashMap::new();
        on_path.insert(start, 0);
        let mut stack = vec![Frame { node: start, cursor: 0, via: None }];

        while let Some(top) = stack.len().checked_sub(1) {
            let node = stack[top].node;
            let incoming = graph.incoming(node);
            let Some(&edge_id) = incoming.get(stack[top].cursor) else {
                on_path.remove(&node);
                stack.pop();
                continue;
            };
            stack[top].cursor += 1;

            let Some(head) = graph.edge(edge_id).and_then(Edge::head) else {
                continue;
            };
            if let Some(&depth) = on_path.get(&head) {
                let mut edges: Vec<EdgeId> =
                    stack[depth..top].iter().filter_map(|f| f.via).collect();
                edges.push(edge_id);
                let path = stack.iter().map(|f| f.node).collect();
                return Some(Cycle { path, edges });
            }
            if visited.insert(head) {
                on_path.insert(head, stack.len());
                stack[top].via = Some(edge_id);
                stack.push(Frame { node: head, cursor: 0, via: None });
            }
        }
    }
    None
}

/// Remove edges until the graph is acyclic; returns the removed edges.
///
/// Each round removes one incoming edge of a node on the walk that closed a
/// cycle, minimizing (primary?, label ≠ Linker): remote edges first, then
/// Linker edges, then the first edge in path order. The victim may lie off
/// the cycle itself, in which case later rounds find the cycle again.
pub fn break_cycles(graph: &mut Graph) -> Vec<Edge> {
    let mut removed = Vec::new();
    while let Some(cycle) = find_cycle(graph) {
        let victim = cycle.candidates(graph).min_by_key(|id| {
            graph
                .edge(*id)
                .map(|e| (!e.remote, e.rel != tags::LINKER))
                .unwrap_or((true, true))
        });
        let Some(edge) = victim.and_then(|id| graph.remove_edge(id)) else {
            break;
        };
        debug!(edge = %edge, sentence = ?graph.id, "removed edge to break cycle");
        removed.push(edge);
    }
    removed
}
