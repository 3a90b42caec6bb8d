//! Hierarchical graph → dependency graph.
//!
//! Every terminal becomes a dependency node. Its heads come from the edges
//! above the highest unit it heads: each such edge points at the head
//! terminal of the edge's parent.

use hashbrown::HashMap;

use crate::Result;
use crate::format::LineFormat;
use crate::model::{Graph, HeadRef, Node, NodeIdx, PendingHead, Token, UnitId, attributes::keys, token::EMPTY_FIELD};
use crate::storage::HierarchyBackend;
use super::{ConverterConfig, Direction, HeadFinder, Preprocessor, tags};

pub struct BackwardConverter<'a, F: LineFormat + ?Sized> {
    config: &'a ConverterConfig,
    finder: HeadFinder,
    format: &'a F,
}

impl<'a, F: LineFormat + ?Sized> BackwardConverter<'a, F> {
    pub fn new(config: &'a ConverterConfig, finder: HeadFinder, format: &'a F) -> Self {
        Self { config, finder, format }
    }

    pub fn finder(&self) -> &HeadFinder {
        &self.finder
    }

    /// Head edges of one terminal; empty in test mode.
    pub fn incoming_edges<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        terminal: UnitId,
        test: bool,
        tree: bool,
    ) -> Result<Vec<PendingHead>> {
        if test {
            return Ok(Vec::new());
        }
        let position = backend.get(terminal)?.terminal().map(|t| t.position);

        let mut heads: Vec<PendingHead> = Vec::new();
        for edge in self.finder.find_top_headed_edges(backend, terminal)? {
            let head = self.finder.find_surface_head_terminal(backend, edge.parent)?;
            let head_position = backend.get(head)?.terminal().map(|t| t.position);
            if head_position == position || self.format.omit_edge(&edge, tree) {
                continue;
            }
            let Some(head_position) = head_position else { continue };
            let rel = if edge.tag == tags::TERMINAL {
                self.config.flat_relation.clone()
            } else {
                edge.tag.clone()
            };
            let pending = PendingHead {
                head: HeadRef::Position(head_position as i64),
                rel,
                remote: edge.remote,
            };
            if !heads.contains(&pending) {
                heads.push(pending);
            }
        }
        heads.sort_by_key(|h| h.remote);
        Ok(heads)
    }

    /// Rebuild the dependency graph of `backend`, linked and preprocessed.
    ///
    /// `original_format` is recorded on the graph for the `# format` header.
    pub fn build_graph<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        original_format: Option<String>,
        test: bool,
        tree: bool,
        enhanced: bool,
    ) -> Result<Graph> {
        let mut graph = Graph::new(Some(backend.passage_id().to_string())).with_format(original_format);
        let mut multi_word: Option<(usize, String)> = None;

        for terminal_id in backend.terminals() {
            let unit = backend.get(terminal_id)?;
            let Some(terminal) = unit.terminal() else { continue };
            let attr = |key: &str| unit.attr(key).map(str::to_string);

            let default_tag = if terminal.punct { tags::PUNCT_TOKEN } else { tags::WORD_TOKEN };
            let tag = attr(keys::TAG).unwrap_or_else(|| default_tag.to_string());
            let token = Token::new(terminal.text.clone(), tag.clone())
                .with_lemma(attr(keys::LEMMA).unwrap_or_else(|| EMPTY_FIELD.to_string()))
                .with_pos(attr(keys::POS).unwrap_or(tag))
                .with_features(attr(keys::FEATURES).unwrap_or_else(|| EMPTY_FIELD.to_string()))
                .with_paragraph(terminal.paragraph);
            let enhanced_deps = attr(keys::ENHANCED).filter(|_| enhanced);

            let mut node = Node::new(terminal.position)
                .with_token(token)
                .with_top(self.finder.is_top(backend, terminal_id)?)
                .with_enhanced(enhanced_deps.unwrap_or_else(|| EMPTY_FIELD.to_string()))
                .with_misc(attr(keys::MISC).unwrap_or_else(|| EMPTY_FIELD.to_string()))
                .with_frame(attr(keys::FRAME).unwrap_or_else(|| EMPTY_FIELD.to_string()));
            node.terminal = Some(terminal_id);
            node.parent_multi_word = self.track_multi_word(
                &mut graph,
                &mut multi_word,
                unit.attr(keys::MULTI_WORD_TEXT),
                terminal.position,
            );

            let idx = graph.push_node(node);
            for head in self.incoming_edges(backend, terminal_id, test, tree)? {
                graph.add_pending_edge(idx, head.head, head.rel, head.remote);
            }
        }

        graph.link_heads(&HashMap::new())?;
        let order: Vec<NodeIdx> = graph.token_indices().collect();
        Preprocessor::new(self.config, self.finder.formalism()).run(&mut graph, &order, Direction::ToDependency);
        Ok(graph)
    }

    /// Extend the running multi-word when `text` continues it, else start a
    /// new one. Returns the multi-word index for the current terminal.
    fn track_multi_word(
        &self,
        graph: &mut Graph,
        current: &mut Option<(usize, String)>,
        text: Option<&str>,
        position: usize,
    ) -> Option<usize> {
        let Some(text) = text else {
            *current = None;
            return None;
        };
        if let Some((index, running)) = current.as_ref() {
            if running == text {
                let index = *index;
                if let Some(multi_word) = graph.multi_word_mut(index) {
                    multi_word.span = multi_word.span.map(|(start, _)| (start, position));
                }
                return Some(index);
            }
        }
        let index = graph.push_multi_word(Node::multi_word(position, position, text));
        *current = Some((index, text.to_string()));
        Some(index)
    }
}
