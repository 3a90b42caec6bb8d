//! Graph: one sentence's dependency nodes plus the edge table linking them.
//!
//! Every adjacency change goes through `add_edge`, `set_head`,
//! `set_dependent` or `remove_edge`. Each of them updates the edge and both
//! endpoint lists in one step, so a node never lists an edge whose current
//! endpoints disagree with it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::{Edge, EdgeId, HeadRef, Node, NodeIdx};
use crate::{Error, Result};

/// A sentence-level dependency graph. `nodes[0]` is the virtual root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    multi_words: Vec<Node>,
    edges: Vec<Option<Edge>>,
    pub id: Option<String>,
    /// Original annotation format, recorded for round trips only.
    pub format: Option<String>,
}

impl Graph {
    pub fn new(id: Option<String>) -> Self {
        Self {
            nodes: vec![Node::root()],
            multi_words: Vec::new(),
            edges: Vec::new(),
            id,
            format: None,
        }
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Append a node. Any adjacency it carried is discarded.
    pub fn push_node(&mut self, mut node: Node) -> NodeIdx {
        node.incoming.clear();
        node.outgoing.clear();
        self.nodes.push(node);
        NodeIdx(self.nodes.len() - 1)
    }

    /// Register a multi-word token; returns its index in `multi_words()`.
    pub fn push_multi_word(&mut self, mut node: Node) -> usize {
        node.incoming.clear();
        node.outgoing.clear();
        node.is_multi_word = true;
        self.multi_words.push(node);
        self.multi_words.len() - 1
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
        &mut self.nodes[idx.0]
    }

    /// Indices of every node except the virtual root.
    pub fn token_indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (1..self.nodes.len()).map(NodeIdx)
    }

    /// Number of nodes, virtual root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph holds nothing but the virtual root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn multi_words(&self) -> &[Node] {
        &self.multi_words
    }

    pub fn multi_word_of(&self, idx: NodeIdx) -> Option<&Node> {
        self.node(idx).parent_multi_word.and_then(|m| self.multi_words.get(m))
    }

    pub(crate) fn multi_word_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.multi_words.get_mut(index)
    }

    pub fn clear_levels(&mut self) {
        for node in &mut self.nodes {
            node.level = None;
        }
    }

    // ========================================================================
    // Edges
    // ========================================================================

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0).and_then(Option::as_ref)
    }

    /// Live edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i), e)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    pub fn incoming(&self, idx: NodeIdx) -> &[EdgeId] {
        &self.nodes[idx.0].incoming
    }

    pub fn outgoing(&self, idx: NodeIdx) -> &[EdgeId] {
        &self.nodes[idx.0].outgoing
    }

    /// Incoming edges of `idx`, resolved.
    pub fn incoming_edges(&self, idx: NodeIdx) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.nodes[idx.0]
            .incoming
            .iter()
            .filter_map(|id| self.edge(*id).map(|e| (*id, e)))
    }

    /// Outgoing edges of `idx`, resolved.
    pub fn outgoing_edges(&self, idx: NodeIdx) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.nodes[idx.0]
            .outgoing
            .iter()
            .filter_map(|id| self.edge(*id).map(|e| (*id, e)))
    }

    /// Relation labels of the edges leaving `idx`.
    pub fn dependent_rels(&self, idx: NodeIdx) -> impl Iterator<Item = &str> {
        self.outgoing_edges(idx).map(|(_, e)| e.rel.as_str())
    }

    /// Add an edge whose head is still an unresolved reference.
    pub fn add_pending_edge(
        &mut self,
        dependent: NodeIdx,
        head: HeadRef,
        rel: impl Into<String>,
        remote: bool,
    ) -> EdgeId {
        let mut edge = Edge::new(rel, remote);
        if let HeadRef::Position(p) = head {
            edge.head_index = p - 1;
        }
        edge.pending = Some(head);
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(edge));
        self.set_dependent(id, Some(dependent));
        id
    }

    /// Add an edge between two existing nodes.
    pub fn add_edge(
        &mut self,
        head: NodeIdx,
        dependent: NodeIdx,
        rel: impl Into<String>,
        remote: bool,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge::new(rel, remote)));
        self.set_head(id, Some(head));
        self.set_dependent(id, Some(dependent));
        id
    }

    /// Re-point the head side of an edge.
    pub fn set_head(&mut self, id: EdgeId, head: Option<NodeIdx>) {
        let Some(edge) = self.edges.get_mut(id.0).and_then(Option::as_mut) else {
            return;
        };
        let old = edge.head.take();
        if let Some(head) = head {
            edge.head = Some(head);
            edge.pending = None;
            edge.head_index = self.nodes[head.0].position as i64 - 1;
        }
        if let Some(old) = old {
            self.nodes[old.0].outgoing.retain(|e| *e != id);
        }
        if let Some(head) = head {
            self.nodes[head.0].outgoing.push(id);
        }
    }

    /// Re-point the dependent side of an edge.
    pub fn set_dependent(&mut self, id: EdgeId, dependent: Option<NodeIdx>) {
        let Some(edge) = self.edges.get_mut(id.0).and_then(Option::as_mut) else {
            return;
        };
        let old = std::mem::replace(&mut edge.dependent, dependent);
        if let Some(old) = old {
            self.nodes[old.0].incoming.retain(|e| *e != id);
        }
        if let Some(dependent) = dependent {
            self.nodes[dependent.0].incoming.push(id);
        }
    }

    pub fn set_remote(&mut self, id: EdgeId, remote: bool) {
        if let Some(edge) = self.edges.get_mut(id.0).and_then(Option::as_mut) {
            edge.remote = remote;
        }
    }

    /// Detach an edge from both endpoints and drop it from the table.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.set_head(id, None);
        self.set_dependent(id, None);
        self.edges.get_mut(id.0).and_then(Option::take)
    }

    // ========================================================================
    // Linking
    // ========================================================================

    /// Resolve pending head references against head-eligible nodes, then
    /// attach terminals to their multi-word tokens.
    pub fn link_heads(&mut self, copy_of: &HashMap<String, usize>) -> Result<()> {
        let heads: Vec<NodeIdx> = (0..self.nodes.len())
            .filter(|i| self.nodes[*i].is_head)
            .map(NodeIdx)
            .collect();

        let pending: Vec<(EdgeId, HeadRef)> = self
            .edges()
            .filter_map(|(id, e)| e.pending.clone().map(|p| (id, p)))
            .collect();

        for (id, head_ref) in pending {
            let index = match head_ref {
                HeadRef::Position(p) => p,
                HeadRef::Copy(copy) => resolve_copy(&copy, copy_of)?,
            };
            let head = usize::try_from(index)
                .ok()
                .and_then(|i| heads.get(i).copied())
                .ok_or(Error::HeadOutOfRange { index, available: heads.len() })?;
            self.set_head(id, Some(head));
        }

        self.link_multi_words();
        Ok(())
    }

    /// Set `parent_multi_word` on every node inside a multi-word span.
    pub fn link_multi_words(&mut self) {
        for (m, multi_word) in self.multi_words.iter().enumerate() {
            let Some((start, end)) = multi_word.span else { continue };
            for node in self.nodes.iter_mut().skip(1) {
                if (start..=end).contains(&node.position) {
                    node.parent_multi_word = Some(m);
                }
            }
        }
    }
}

fn resolve_copy(copy: &str, copy_of: &HashMap<String, usize>) -> Result<i64> {
    if let Some(original) = copy_of.get(copy) {
        return Ok(*original as i64);
    }
    let (base, _) = copy.split_once('.').unwrap_or((copy, ""));
    base.parse().map_err(|_| Error::UnresolvedCopy(copy.to_string()))
}
