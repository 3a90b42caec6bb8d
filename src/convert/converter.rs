//! `DependencyConverter`: the entry point tying a line format to the
//! forward and backward converters.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;
use crate::format::{self, LineFormat, ParsedGraph};
use crate::model::Graph;
use crate::storage::{HierarchyBackend, MemoryHierarchy};
use super::{
    BackwardConverter, ConverterConfig, ForwardConverter, Formalism, HeadFinder, SEMANTIC_FORMAT,
};

/// Options for writing a hierarchy back to lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Leave the dependency columns blank.
    pub test: bool,
    /// Drop remote edges and keep DEPS verbatim.
    pub tree: bool,
    /// Keep the enhanced dependencies recorded on terminals.
    pub enhanced: bool,
    /// Override the passage's original format.
    pub format: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { test: false, tree: true, enhanced: true, format: None }
    }
}

impl WriteOptions {
    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    pub fn with_tree(mut self, tree: bool) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_enhanced(mut self, enhanced: bool) -> Self {
        self.enhanced = enhanced;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// One converted sentence with the lines it came from.
#[derive(Debug, Clone)]
pub struct Converted {
    pub passage: MemoryHierarchy,
    pub lines: Vec<String>,
}

/// Converts between a line format `F` and hierarchical passages.
#[derive(Debug, Clone)]
pub struct DependencyConverter<F: LineFormat> {
    config: ConverterConfig,
    format: F,
}

impl<F: LineFormat> DependencyConverter<F> {
    pub fn new(config: ConverterConfig, format: F) -> Self {
        Self { config, format }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    // ========================================================================
    // Lines → hierarchy
    // ========================================================================

    pub fn read_graphs<I, S>(&self, lines: I, split: bool) -> Vec<ParsedGraph>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        format::read_graphs(&self.format, lines, split)
    }

    /// Build a fresh in-memory passage from one graph.
    pub fn build_passage(&self, mut graph: Graph, terminals_only: bool) -> Result<MemoryHierarchy> {
        let id = graph.id.clone().unwrap_or_default();
        let mut passage = MemoryHierarchy::new(id);
        self.build_passage_into(&mut graph, &mut passage, terminals_only)?;
        Ok(passage)
    }

    /// Populate `backend` from `graph`, recording the graph's format (or the
    /// configured one) on the passage.
    pub fn build_passage_into<B: HierarchyBackend + ?Sized>(
        &self,
        graph: &mut Graph,
        backend: &mut B,
        terminals_only: bool,
    ) -> Result<()> {
        let formalism = Formalism::from_format(graph.format.as_deref());
        backend.set_format(Some(graph.format.clone().unwrap_or_else(|| self.config.format.clone())));
        ForwardConverter::new(&self.config, formalism).build(graph, backend, terminals_only)
    }

    /// Read every sentence and convert it. Sentences without an id are named
    /// `{passage_id}_{n}`; failures are logged and skipped.
    pub fn from_format<I, S>(&self, lines: I, passage_id: &str, split: bool) -> Vec<Converted>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut converted = Vec::new();
        for (n, ParsedGraph { mut graph, lines }) in self.read_graphs(lines, split).into_iter().enumerate() {
            if graph.id.is_none() {
                graph.id = Some(if split { format!("{passage_id}_{n}") } else { passage_id.to_string() });
            }
            let id = graph.id.clone();
            match self.build_passage(graph, false) {
                Ok(passage) => converted.push(Converted { passage, lines }),
                Err(e) => warn!(sentence = ?id, error = %e, "skipped sentence"),
            }
        }
        converted
    }

    // ========================================================================
    // Hierarchy → lines
    // ========================================================================

    /// Format tag to write: `None` when the passage is in the native format.
    fn original_format<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        options: &WriteOptions,
    ) -> Option<String> {
        let format = options
            .format
            .as_deref()
            .or(backend.format())
            .unwrap_or(SEMANTIC_FORMAT);
        (format != self.config.format).then(|| format.to_string())
    }

    /// Recover the dependency graph of a passage.
    pub fn build_graph<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        options: &WriteOptions,
    ) -> Result<Graph> {
        let original_format = self.original_format(backend, options);
        let formalism = Formalism::from_format(original_format.as_deref());
        let finder = HeadFinder::new(&self.config, formalism);
        BackwardConverter::new(&self.config, finder, &self.format).build_graph(
            backend,
            original_format,
            options.test,
            options.tree,
            options.enhanced,
        )
    }

    /// Write a passage as lines, ending with a blank separator line.
    pub fn to_format<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        options: &WriteOptions,
    ) -> Result<Vec<String>> {
        let graph = self.build_graph(backend, options)?;
        let mut lines = format::header_lines(&graph);
        lines.extend(
            self.format
                .generate_lines(&graph, options.test, options.tree)
                .into_iter()
                .map(|row| row.join("\t")),
        );
        lines.push(String::new());
        Ok(lines)
    }
}
