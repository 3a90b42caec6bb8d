//! Dependency graph → hierarchical graph.
//!
//! Each dependency node gets up to three units:
//!
//! - `terminal`: its surface leaf
//! - `unit`: the constituent its head edge attaches
//! - `preterminal`: the unit directly above its terminal
//!
//! Flat dependents share their head's `unit` and `preterminal`, so several
//! terminals can sit under one preterminal.

use hashbrown::HashSet;
use tracing::debug;

use crate::Result;
use crate::model::{EdgeId, Graph, NodeIdx, UnitId, attributes::keys};
use crate::storage::HierarchyBackend;
use super::{ConverterConfig, Direction, Formalism, Preprocessor, break_cycles, tags, topological_sort};

pub struct ForwardConverter<'a> {
    config: &'a ConverterConfig,
    formalism: Formalism,
}

impl<'a> ForwardConverter<'a> {
    pub fn new(config: &'a ConverterConfig, formalism: Formalism) -> Self {
        Self { config, formalism }
    }

    /// Populate `backend` from `graph`. With `terminals_only` no
    /// non-terminal structure is built.
    pub fn build<B: HierarchyBackend + ?Sized>(
        &self,
        graph: &mut Graph,
        backend: &mut B,
        terminals_only: bool,
    ) -> Result<()> {
        self.create_terminals(graph, backend)?;
        if !terminals_only {
            self.create_non_terminals(graph, backend)?;
            self.link_pre_terminals(graph, backend)?;
        }
        Ok(())
    }

    // ========================================================================
    // Labels
    // ========================================================================

    /// Semantic category guessed from the node's own dependents.
    pub fn label(&self, graph: &Graph, node: NodeIdx, top: bool) -> &'static str {
        if self.config.is_punct(graph.node(node).token.as_ref()) {
            return tags::PUNCTUATION;
        }
        let rels: HashSet<&str> = graph.dependent_rels(node).collect();
        if top || rels.contains(tags::PARALLEL_SCENE) {
            tags::PARALLEL_SCENE
        } else if rels.contains(tags::PARTICIPANT) || rels.contains(tags::ADVERBIAL) {
            // could as well be a state
            tags::PROCESS
        } else {
            tags::CENTER
        }
    }

    pub fn label_edge(&self, graph: &Graph, node: NodeIdx, top: bool) -> String {
        self.formalism.edge_label(self.label(graph, node, top), self.config.mark_aux)
    }

    // ========================================================================
    // Terminals
    // ========================================================================

    pub fn create_terminals<B: HierarchyBackend + ?Sized>(
        &self,
        graph: &mut Graph,
        backend: &mut B,
    ) -> Result<()> {
        let indices: Vec<NodeIdx> = graph.token_indices().collect();
        for idx in indices {
            let node = graph.node(idx);
            let Some(token) = node.token.as_ref() else { continue };
            if node.terminal.is_some() {
                continue;
            }
            let punct = self.config.is_punct(Some(token));
            let terminal = backend.add_terminal(&token.text, punct, token.paragraph)?;

            let mut attrs = vec![
                (keys::TAG, token.tag.clone()),
                (keys::POS, token.pos.clone()),
                (keys::LEMMA, token.lemma.clone()),
                (keys::FEATURES, token.features.clone()),
                (keys::ENHANCED, node.enhanced.clone()),
                (keys::FRAME, node.frame.clone()),
                (keys::MISC, node.misc.clone()),
            ];
            if let Some(multi_word) = graph.multi_word_of(idx) {
                attrs.push((keys::MULTI_WORD_TEXT, multi_word.text().to_string()));
            }
            for (key, value) in attrs {
                backend.set_attr(terminal, key, value)?;
            }
            graph.node_mut(idx).terminal = Some(terminal);
        }
        Ok(())
    }

    // ========================================================================
    // Non-terminals
    // ========================================================================

    pub fn create_non_terminals<B: HierarchyBackend + ?Sized>(
        &self,
        graph: &mut Graph,
        backend: &mut B,
    ) -> Result<()> {
        break_cycles(graph);
        self.open_top_units(graph, backend)?;

        let mut order = topological_sort(graph);
        Preprocessor::new(self.config, self.formalism).run(graph, &order, Direction::ToHierarchy);
        if self.formalism == Formalism::Semantic {
            let rootless: Vec<NodeIdx> = graph
                .token_indices()
                .filter(|i| graph.incoming(*i).is_empty() && !graph.node(*i).is_top)
                .collect();
            order.splice(0..0, rootless);
        }

        let mut remotes: Vec<EdgeId> = Vec::new();
        for idx in order {
            let mut incoming: Vec<EdgeId> = graph.incoming(idx).to_vec();
            if let Some(&first) = incoming.first() {
                let first_head = graph.edge(first).and_then(|e| e.head());
                if graph.node(idx).is_top && first_head != Some(NodeIdx::ROOT) {
                    let top = graph.add_edge(NodeIdx::ROOT, idx, tags::TOP, false);
                    incoming.insert(0, top);
                }
                self.attach(graph, backend, incoming[0])?;
                remotes.extend_from_slice(&incoming[1..]);
            }

            let has_flat = graph.incoming_edges(idx).any(|(_, e)| self.config.is_flat(&e.rel));
            if !graph.outgoing(idx).is_empty() && !has_flat {
                let label = self.label_edge(graph, idx, false);
                let preterminal = backend.add_unit(graph.node(idx).preterminal, &label)?;
                graph.node_mut(idx).preterminal = Some(preterminal);
            }
        }

        for id in remotes {
            let Some(edge) = graph.edge(id) else { continue };
            let (Some(head), Some(dependent)) = (edge.head(), edge.dependent()) else { continue };
            let rel = edge.rel.clone();
            let parent = graph.node(head).unit.unwrap_or(backend.root());
            let child = graph.node(dependent).unit.unwrap_or(backend.root());
            if backend.can_add_remote(parent, child)? {
                backend.add_remote(parent, &rel, child)?;
            } else {
                debug!(%parent, %child, %rel, "skipped remote edge");
            }
        }
        Ok(())
    }

    /// Open top-level units for headless dependency roots and move edges off
    /// punctuation so it never heads anything.
    fn open_top_units<B: HierarchyBackend + ?Sized>(
        &self,
        graph: &mut Graph,
        backend: &mut B,
    ) -> Result<()> {
        for idx in (0..graph.len()).map(NodeIdx) {
            if graph.outgoing(idx).is_empty() {
                continue;
            }
            let node = graph.node(idx);
            if self.formalism == Formalism::Dependency
                && !self.config.tree
                && node.position > 0
                && graph.incoming(idx).is_empty()
            {
                let tag = if node.is_top { tags::TOP } else { tags::ROOT };
                let unit = backend.add_unit(None, tag)?;
                let node = graph.node_mut(idx);
                node.unit = Some(unit);
                node.preterminal = Some(unit);
            }

            if self.config.is_punct(graph.node(idx).token.as_ref()) {
                let head = graph
                    .incoming_edges(idx)
                    .next()
                    .and_then(|(_, e)| e.head())
                    .unwrap_or(NodeIdx::ROOT);
                let moved: Vec<EdgeId> = graph
                    .outgoing(idx)
                    .iter()
                    .chain(graph.incoming(idx).iter().skip(1))
                    .copied()
                    .collect();
                for id in moved {
                    graph.set_head(id, Some(head));
                }
            }
        }
        Ok(())
    }

    /// Create (or share) the unit a node's first incoming edge attaches.
    fn attach<B: HierarchyBackend + ?Sized>(
        &self,
        graph: &mut Graph,
        backend: &mut B,
        id: EdgeId,
    ) -> Result<()> {
        let Some(edge) = graph.edge(id) else { return Ok(()) };
        let (Some(head), Some(dependent)) = (edge.head(), edge.dependent()) else {
            return Ok(());
        };
        let rel = edge.rel.clone();

        let (unit, preterminal) = if self.config.is_flat(&rel) {
            let head = graph.node(head);
            (head.unit, head.preterminal)
        } else if tags::is_root_rel(&rel) {
            let label = self.label_edge(graph, dependent, true);
            let unit = backend.add_unit(graph.node(dependent).preterminal, &label)?;
            (Some(unit), Some(unit))
        } else {
            let unit = backend.add_unit(graph.node(head).unit, &rel)?;
            (Some(unit), Some(unit))
        };

        let node = graph.node_mut(dependent);
        node.unit = unit;
        node.preterminal = preterminal;
        Ok(())
    }

    // ========================================================================
    // Preterminals
    // ========================================================================

    /// Hang terminals under their preterminals: owners first, then flat
    /// dependents, each group by position.
    pub fn link_pre_terminals<B: HierarchyBackend + ?Sized>(
        &self,
        graph: &Graph,
        backend: &mut B,
    ) -> Result<()> {
        let is_flat_dependent = |idx: &NodeIdx| {
            graph
                .incoming_edges(*idx)
                .next()
                .is_some_and(|(_, e)| self.config.is_flat(&e.rel))
        };
        let (flat, owners): (Vec<NodeIdx>, Vec<NodeIdx>) = graph
            .token_indices()
            .filter(|i| graph.node(*i).preterminal.is_some())
            .partition(is_flat_dependent);

        let mut preterminals: Vec<UnitId> = Vec::new();
        for idx in owners.into_iter().chain(flat) {
            let node = graph.node(idx);
            let (Some(preterminal), Some(terminal)) = (node.preterminal, node.terminal) else {
                continue;
            };
            backend.add_edge(preterminal, tags::TERMINAL, terminal)?;
            if !preterminals.contains(&preterminal) {
                preterminals.push(preterminal);
            }
        }

        for preterminal in preterminals {
            let children = backend.children(preterminal)?;
            let mut all_punct = true;
            for child in &children {
                if !backend.get(*child)?.is_punct() {
                    all_punct = false;
                    break;
                }
            }
            if all_punct {
                backend.mark_punctuation(preterminal)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Token};
    use crate::storage::MemoryHierarchy;

    /// "The cat sleeps ." with flat determiner and punctuation.
    fn sentence() -> Graph {
        let mut graph = Graph::new(Some("1".into()));
        for (i, (text, tag)) in
            [("The", "DET"), ("cat", "NOUN"), ("sleeps", "VERB"), (".", "PUNCT")].iter().enumerate()
        {
            graph.push_node(Node::new(i + 1).with_token(Token::new(*text, *tag)));
        }
        graph.add_edge(NodeIdx(2), NodeIdx(1), "det", false);
        graph.add_edge(NodeIdx(3), NodeIdx(2), "nsubj", false);
        graph.add_edge(NodeIdx::ROOT, NodeIdx(3), "root", false);
        graph.add_edge(NodeIdx(3), NodeIdx(4), "punct", false);
        graph
    }

    fn tag_of(h: &MemoryHierarchy, unit: UnitId) -> String {
        h.get(unit).unwrap().incoming[0].tag.clone()
    }

    #[test]
    fn test_terminals_carry_attributes() {
        let config = ConverterConfig::default();
        let mut graph = sentence();
        let mut h = MemoryHierarchy::new("1");
        ForwardConverter::new(&config, Formalism::Dependency).build(&mut graph, &mut h, true).unwrap();

        assert_eq!(h.terminals().len(), 4);
        let cat = h.get(h.terminals()[1]).unwrap();
        assert_eq!(cat.terminal().unwrap().text, "cat");
        assert_eq!(cat.attr(keys::TAG), Some("NOUN"));
        assert!(h.get(h.terminals()[3]).unwrap().is_punct());
        assert!(h.children(h.root()).unwrap().is_empty());
    }

    #[test]
    fn test_dependency_structure() {
        let config = ConverterConfig::default().with_flat_relation("det");
        let mut graph = sentence();
        let mut h = MemoryHierarchy::new("1");
        ForwardConverter::new(&config, Formalism::Dependency).build(&mut graph, &mut h, false).unwrap();

        let sleeps = graph.node(NodeIdx(3));
        assert_eq!(tag_of(&h, sleeps.unit.unwrap()), "head");
        assert_eq!(tag_of(&h, sleeps.preterminal.unwrap()), "head");

        let cat = graph.node(NodeIdx(2));
        assert_eq!(tag_of(&h, cat.unit.unwrap()), "nsubj");
        assert_eq!(h.parents(cat.unit.unwrap()).unwrap(), vec![sleeps.unit.unwrap()]);

        // the flat determiner shares the noun's preterminal, after the noun
        let the = graph.node(NodeIdx(1));
        assert_eq!(the.preterminal, cat.preterminal);
        let leaves = h.children(cat.preterminal.unwrap()).unwrap();
        assert_eq!(leaves, vec![cat.terminal.unwrap(), the.terminal.unwrap()]);
    }

    #[test]
    fn test_punctuation_unit_is_marked() {
        let config = ConverterConfig::default();
        let mut graph = sentence();
        let mut h = MemoryHierarchy::new("1");
        ForwardConverter::new(&config, Formalism::Semantic).build(&mut graph, &mut h, false).unwrap();

        let period = graph.node(NodeIdx(4)).unit.unwrap();
        assert_eq!(tag_of(&h, period), "punct");
        assert!(matches!(
            h.get(period).unwrap().kind,
            crate::model::UnitKind::NonTerminal(crate::model::NodeTag::Punctuation)
        ));
    }

    #[test]
    fn test_semantic_labels() {
        let config = ConverterConfig::default().with_mark_aux(true);
        let mut graph = sentence();
        let mut h = MemoryHierarchy::new("1");
        ForwardConverter::new(&config, Formalism::Semantic).build(&mut graph, &mut h, false).unwrap();

        let sleeps = graph.node(NodeIdx(3));
        assert_eq!(tag_of(&h, sleeps.unit.unwrap()), "#H");
        assert_eq!(tag_of(&h, sleeps.preterminal.unwrap()), "#C");
    }

    #[test]
    fn test_punctuation_heads_are_flipped() {
        // "." heads "x"; x must move up to the punctuation's own head
        let config = ConverterConfig::default();
        let mut graph = Graph::new(None);
        graph.push_node(Node::new(1).with_token(Token::new("go", "VERB")));
        graph.push_node(Node::new(2).with_token(Token::new(".", "PUNCT")));
        graph.push_node(Node::new(3).with_token(Token::new("x", "X")));
        graph.add_edge(NodeIdx::ROOT, NodeIdx(1), "root", false);
        graph.add_edge(NodeIdx(1), NodeIdx(2), "punct", false);
        let moved = graph.add_edge(NodeIdx(2), NodeIdx(3), "dep", false);

        let mut h = MemoryHierarchy::new("p");
        ForwardConverter::new(&config, Formalism::Dependency).build(&mut graph, &mut h, false).unwrap();

        assert_eq!(graph.edge(moved).unwrap().head(), Some(NodeIdx(1)));
        assert!(graph.outgoing(NodeIdx(2)).is_empty());
    }

    #[test]
    fn test_headless_node_gets_root_unit() {
        let config = ConverterConfig::default();
        let mut graph = Graph::new(None);
        graph.push_node(Node::new(1).with_token(Token::new("a", "X")));
        graph.push_node(Node::new(2).with_token(Token::new("b", "X")));
        graph.add_edge(NodeIdx(1), NodeIdx(2), "dep", false);

        let mut h = MemoryHierarchy::new("p");
        ForwardConverter::new(&config, Formalism::Dependency).build(&mut graph, &mut h, false).unwrap();

        let a = graph.node(NodeIdx(1)).unit.unwrap();
        assert_eq!(tag_of(&h, a), "ROOT");
        let b = graph.node(NodeIdx(2)).unit.unwrap();
        assert_eq!(h.parents(b).unwrap(), vec![a]);
    }

    #[test]
    fn test_remote_edge_attached() {
        let config = ConverterConfig::default();
        let mut graph = Graph::new(None);
        for (i, text) in ["John", "wants", "to", "leave"].iter().enumerate() {
            graph.push_node(Node::new(i + 1).with_token(Token::new(*text, "X")));
        }
        graph.add_edge(NodeIdx::ROOT, NodeIdx(2), "root", false);
        graph.add_edge(NodeIdx(2), NodeIdx(1), "A", false);
        graph.add_edge(NodeIdx(2), NodeIdx(4), "A", false);
        graph.add_edge(NodeIdx(4), NodeIdx(3), "F", false);
        graph.add_edge(NodeIdx(4), NodeIdx(1), "A", true);

        let mut h = MemoryHierarchy::new("p");
        ForwardConverter::new(&config, Formalism::Semantic).build(&mut graph, &mut h, false).unwrap();

        let john = graph.node(NodeIdx(1)).unit.unwrap();
        let leave = graph.node(NodeIdx(4)).unit.unwrap();
        let remote = h.get(john).unwrap().incoming.iter().find(|e| e.remote).cloned().unwrap();
        assert_eq!(remote.parent, leave);
        assert_eq!(remote.tag, "A");
    }
}
