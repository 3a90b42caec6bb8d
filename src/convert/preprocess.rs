//! Root and orphan repair, run before building in either direction.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{EdgeId, Graph, NodeIdx};
use super::{ConverterConfig, Formalism, tags};

/// Which way the sentence is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Hierarchy → dependency lines.
    ToDependency,
    /// Dependency lines → hierarchy.
    ToHierarchy,
}

pub struct Preprocessor<'a> {
    config: &'a ConverterConfig,
    formalism: Formalism,
}

impl<'a> Preprocessor<'a> {
    pub fn new(config: &'a ConverterConfig, formalism: Formalism) -> Self {
        Self { config, formalism }
    }

    /// Nodes of `order` carrying an incoming `root` relation.
    pub fn roots(&self, graph: &Graph, order: &[NodeIdx]) -> Vec<NodeIdx> {
        order
            .iter()
            .copied()
            .filter(|idx| graph.incoming_edges(*idx).any(|(_, e)| tags::is_root_rel(&e.rel)))
            .collect()
    }

    /// Drop or demote remote edges and re-attach parentless nodes.
    ///
    /// In tree mode a node left without a primary edge loses its remaining
    /// edges and hangs off the first root as `orphan`; with no root yet it
    /// becomes the root itself.
    pub fn run(&self, graph: &mut Graph, order: &[NodeIdx], direction: Direction) {
        let mut roots = self.roots(graph, order);

        if direction == Direction::ToDependency && self.config.tree && roots.len() > 1 {
            for &root in &roots[1..] {
                let demoted: Vec<EdgeId> = graph
                    .incoming_edges(root)
                    .filter(|(_, e)| tags::is_root_rel(&e.rel) || e.head_index < 0)
                    .map(|(id, _)| id)
                    .collect();
                for id in demoted {
                    graph.remove_edge(id);
                }
                debug!(node = %root, "demoted extra root");
            }
            roots.truncate(1);
        }

        for &idx in order {
            let mut parentless = true;
            let incoming: Vec<EdgeId> = graph.incoming(idx).to_vec();
            for id in incoming {
                let Some(edge) = graph.edge(id) else { continue };
                let (remote, flat) = (edge.remote, self.config.is_flat(&edge.rel));
                if !remote {
                    parentless = false;
                } else if flat {
                    // a flat dependent cannot have a second parent
                    graph.remove_edge(id);
                } else if !self.formalism.has_remotes() {
                    graph.set_remote(id, false);
                    parentless = false;
                }
            }

            if parentless && self.config.tree {
                let stale: Vec<EdgeId> = graph.incoming(idx).to_vec();
                for id in stale {
                    graph.remove_edge(id);
                }
                match roots.first() {
                    Some(&root) => {
                        graph.add_edge(root, idx, tags::ORPHAN, false);
                    }
                    None => {
                        roots.push(idx);
                        graph.add_edge(NodeIdx::ROOT, idx, tags::ROOT_REL, false);
                    }
                }
            }
        }
    }
}
