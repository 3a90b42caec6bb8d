//! # Line Formats
//!
//! A `LineFormat` turns one line into a node (plus its pending head edges)
//! and one `Graph` back into rows of columns. Sentence splitting, comment
//! handling and head linking are shared by every format and live in
//! `read_graphs`.
//!
//! | Format | Module | Columns |
//! |--------|--------|---------|
//! | `Conllu` | `conllu` | ID FORM LEMMA UPOS XPOS FEATS HEAD DEPREL DEPS MISC |

pub mod conllu;

use hashbrown::HashMap;
use tracing::warn;

use crate::model::{Graph, Node, PendingHead, UnitEdge};
use crate::Result;

pub use conllu::Conllu;

// ============================================================================
// LineFormat Trait
// ============================================================================

/// Result of reading one non-comment line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A token node and the edges to its heads, primary first.
    Token { node: Node, heads: Vec<PendingHead> },
    /// A multi-word token spanning later token lines.
    MultiWord(Node),
    /// A line that yields no node (an empty node, a format-specific extra).
    Skip,
}

pub trait LineFormat {
    /// Format tag written to and read from `# format = …`.
    fn name(&self) -> &str;

    /// Parse one line. `copy_of` collects copy (empty node) ids and the
    /// position they duplicate.
    fn read_line(&self, line: &str, copy_of: &mut HashMap<String, usize>) -> Result<ParsedLine>;

    /// Rows of columns for `graph`, including any comment rows the format
    /// writes. `test` blanks the dependency columns.
    fn generate_lines(&self, graph: &Graph, test: bool, tree: bool) -> Vec<Vec<String>>;

    /// Whether a hierarchical edge is dropped when writing.
    fn omit_edge(&self, edge: &UnitEdge, tree: bool) -> bool {
        tree && edge.remote
    }
}

/// `# format = …` when the graph records an original format.
pub fn header_lines(graph: &Graph) -> Vec<String> {
    graph.format.iter().map(|f| format!("# format = {f}")).collect()
}

// ============================================================================
// Reader
// ============================================================================

/// A graph with the raw lines it was read from.
#[derive(Debug, Clone)]
pub struct ParsedGraph {
    pub graph: Graph,
    pub lines: Vec<String>,
}

enum Comment {
    Id(String),
    Format(String),
    Other,
}

fn parse_comment(line: &str) -> Comment {
    let body = line.trim_start_matches('#').trim_start();
    let digits: String = body.chars().take_while(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        return Comment::Id(digits);
    }
    let key_value = body.split_once('=').map(|(k, v)| (k.trim(), v.split_whitespace().next()));
    match key_value {
        Some(("sent_id", Some(id))) => Comment::Id(id.to_string()),
        Some(("format", Some(format))) => Comment::Format(format.to_string()),
        _ => Comment::Other,
    }
}

#[derive(Default)]
struct Sentence {
    graph: Option<Graph>,
    id: Option<String>,
    format: Option<String>,
    lines: Vec<String>,
    error: Option<crate::Error>,
}

impl Sentence {
    fn finish(self, copy_of: &HashMap<String, usize>) -> Option<ParsedGraph> {
        let mut graph = self.graph?;
        let linked = match self.error {
            Some(e) => Err(e),
            None => graph.link_heads(copy_of),
        };
        if let Err(e) = linked {
            warn!(sentence = ?self.id, error = %e, "skipped sentence");
            return None;
        }
        graph.id = self.id;
        graph.format = self.format;
        Some(ParsedGraph { graph, lines: self.lines })
    }
}

/// Read sentences from `lines`.
///
/// With `split`, a blank line ends the current sentence; otherwise the whole
/// input is one graph and blank lines only advance the paragraph number.
/// Sentences that fail to parse or link are logged and skipped.
pub fn read_graphs<F, I, S>(format: &F, lines: I, split: bool) -> Vec<ParsedGraph>
where
    F: LineFormat + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut graphs = Vec::new();
    let mut copy_of: HashMap<String, usize> = HashMap::new();
    let mut sentence = Sentence::default();
    let mut paragraph = 1;

    for raw in lines {
        let line = raw.as_ref().trim();
        if line.starts_with('#') {
            sentence.lines.push(line.to_string());
            match parse_comment(line) {
                Comment::Id(id) => sentence.id = Some(id),
                Comment::Format(f) => sentence.format = Some(f),
                Comment::Other => {}
            }
        } else if !line.is_empty() {
            sentence.lines.push(line.to_string());
            let graph = sentence.graph.get_or_insert_with(|| Graph::new(None));
            if sentence.error.is_some() {
                continue;
            }
            match format.read_line(line, &mut copy_of) {
                Ok(ParsedLine::Token { mut node, heads }) => {
                    if let Some(token) = node.token.as_mut() {
                        token.paragraph = paragraph;
                    }
                    let idx = graph.push_node(node);
                    for head in heads {
                        graph.add_pending_edge(idx, head.head, head.rel, head.remote);
                    }
                }
                Ok(ParsedLine::MultiWord(node)) => {
                    graph.push_multi_word(node);
                }
                Ok(ParsedLine::Skip) => {}
                Err(e) => sentence.error = Some(e),
            }
        } else if split && sentence.graph.is_some() {
            graphs.extend(std::mem::take(&mut sentence).finish(&copy_of));
            paragraph = 1;
        } else {
            paragraph += 1;
        }
    }
    graphs.extend(sentence.finish(&copy_of));
    graphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comment() {
        assert!(matches!(parse_comment("# 120 some text"), Comment::Id(id) if id == "120"));
        assert!(matches!(parse_comment("# sent_id = a-1"), Comment::Id(id) if id == "a-1"));
        assert!(matches!(parse_comment("#format=ucca"), Comment::Format(f) if f == "ucca"));
        assert!(matches!(parse_comment("# text = The cat"), Comment::Other));
    }

    #[test]
    fn test_header_lines() {
        let graph = Graph::new(None).with_format(Some("ucca".into()));
        assert_eq!(header_lines(&graph), vec!["# format = ucca".to_string()]);
        assert!(header_lines(&Graph::new(None)).is_empty());
    }
}
