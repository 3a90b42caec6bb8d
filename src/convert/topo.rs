//! Topological leveling of dependency nodes.

use hashbrown::{HashMap, HashSet};

use crate::model::{Graph, NodeIdx};

/// Level every node and return the leveled ones in (level, position) order.
///
/// A node's level is one more than the highest level among its heads; nodes
/// without incoming edges sit at level 0 and are left out of the result.
/// Nodes that no leaf reaches (only possible on a residual cycle) stay
/// unleveled and are also left out.
pub fn topological_sort(graph: &mut Graph) -> Vec<NodeIdx> {
    graph.clear_levels();

    let mut visited: HashMap<NodeIdx, HashSet<NodeIdx>> = HashMap::new();
    let mut remaining: Vec<NodeIdx> = (0..graph.len())
        .map(NodeIdx)
        .filter(|idx| graph.outgoing(*idx).is_empty())
        .collect();

    while let Some(idx) = remaining.pop() {
        if graph.node(idx).level.is_some() {
            continue;
        }
        let level = if graph.incoming(idx).is_empty() {
            0
        } else {
            let heads: Vec<NodeIdx> =
                graph.incoming_edges(idx).filter_map(|(_, e)| e.head()).collect();
            let seen = visited.entry(idx).or_default();
            let pending: Vec<NodeIdx> = heads
                .iter()
                .copied()
                .filter(|h| graph.node(*h).level.is_none() && !seen.contains(h))
                .collect();
            if !pending.is_empty() {
                seen.extend(pending.iter().copied());
                remaining.push(idx);
                remaining.extend(pending);
                continue;
            }
            1 + heads.iter().filter_map(|h| graph.node(*h).level).max().unwrap_or(0)
        };
        graph.node_mut(idx).level = Some(level);
    }

    let mut order: Vec<NodeIdx> = (0..graph.len())
        .map(NodeIdx)
        .filter(|idx| graph.node(*idx).level.is_some_and(|l| l > 0))
        .collect();
    order.sort_by_key(|idx| {
        let node = graph.node(*idx);
        (node.level, node.position)
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Token};

    fn graph_of(n: usize) -> Graph {
        let mut graph = Graph::new(None);
        for i in 1..=n {
            graph.push_node(Node::new(i).with_token(Token::new(format!("w{i}"), "X")));
        }
        graph
    }

    #[test]
    fn test_levels_follow_heads() {
        // root -> 3 -> 2 -> 1
        let mut graph = graph_of(3);
        graph.add_edge(NodeIdx(0), NodeIdx(3), "root", false);
        graph.add_edge(NodeIdx(3), NodeIdx(2), "nsubj", false);
        graph.add_edge(NodeIdx(2), NodeIdx(1), "det", false);

        let order = topological_sort(&mut graph);
        assert_eq!(order, vec![NodeIdx(3), NodeIdx(2), NodeIdx(1)]);
        assert_eq!(graph.node(NodeIdx(0)).level, Some(0));
        assert_eq!(graph.node(NodeIdx(1)).level, Some(3));
    }

    #[test]
    fn test_ties_break_by_position() {
        let mut graph = graph_of(3);
        graph.add_edge(NodeIdx(0), NodeIdx(2), "root", false);
        graph.add_edge(NodeIdx(2), NodeIdx(3), "obj", false);
        graph.add_edge(NodeIdx(2), NodeIdx(1), "nsubj", false);

        let order = topological_sort(&mut graph);
        assert_eq!(order, vec![NodeIdx(2), NodeIdx(1), NodeIdx(3)]);
    }

    #[test]
    fn test_level_uses_deepest_head() {
        // 3 has heads 1 (level 1) and 2 (level 2)
        let mut graph = graph_of(3);
        graph.add_edge(NodeIdx(0), NodeIdx(1), "root", false);
        graph.add_edge(NodeIdx(1), NodeIdx(2), "A", false);
        graph.add_edge(NodeIdx(1), NodeIdx(3), "A", false);
        graph.add_edge(NodeIdx(2), NodeIdx(3), "A", true);

        topological_sort(&mut graph);
        assert_eq!(graph.node(NodeIdx(3)).level, Some(3));
    }

    #[test]
    fn test_unattached_nodes_are_excluded() {
        let mut graph = graph_of(2);
        graph.add_edge(NodeIdx(0), NodeIdx(1), "root", false);

        let order = topological_sort(&mut graph);
        assert_eq!(order, vec![NodeIdx(1)]);
        assert_eq!(graph.node(NodeIdx(2)).level, Some(0));
    }

    #[test]
    fn test_terminates_on_cycle() {
        // 1 <-> 2 with leaf 3 below 2
        let mut graph = graph_of(3);
        graph.add_edge(NodeIdx(1), NodeIdx(2), "A", false);
        graph.add_edge(NodeIdx(2), NodeIdx(1), "A", false);
        graph.add_edge(NodeIdx(2), NodeIdx(3), "A", false);

        let order = topological_sort(&mut graph);
        assert_eq!(order.len(), 3);
        assert!(graph.token_indices().all(|i| graph.node(i).level.is_some()));
    }

    #[test]
    fn test_cycle_without_leaf_is_unleveled() {
        let mut graph = graph_of(2);
        graph.add_edge(NodeIdx(1), NodeIdx(2), "A", false);
        graph.add_edge(NodeIdx(2), NodeIdx(1), "A", false);

        assert!(topological_sort(&mut graph).is_empty());
    }
}
