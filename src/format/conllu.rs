//! CoNLL-U: ten tab-separated columns per token.
//!
//! | # | Column | Maps to |
//! |---|--------|---------|
//! | 1 | ID | position; `a-b` multi-word, `a.b` empty node |
//! | 2 | FORM | `Token::text` |
//! | 3 | LEMMA | `Token::lemma` |
//! | 4 | UPOS | `Token::tag` |
//! | 5 | XPOS | `Token::pos` |
//! | 6 | FEATS | `Token::features` |
//! | 7-8 | HEAD, DEPREL | primary edge |
//! | 9 | DEPS | further edges, kept verbatim as `Node::enhanced` |
//! | 10 | MISC | `Node::misc`; `CopyOf=n` maps an empty node to `n` |

use hashbrown::HashMap;

use crate::model::{Graph, Node, PendingHead, Token, token::EMPTY_FIELD};
use crate::{Error, Result};
use super::{LineFormat, ParsedLine};

const COLUMNS: usize = 10;

/// The CoNLL-U line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conllu;

fn parse_error(line: &str, message: impl Into<String>) -> Error {
    Error::Parse { line: line.to_string(), message: message.into() }
}

fn parse_position(line: &str, id: &str) -> Result<usize> {
    id.parse().map_err(|_| parse_error(line, format!("invalid token id {id:?}")))
}

fn copy_source(misc: &str) -> Option<usize> {
    misc.split('|').find_map(|entry| entry.strip_prefix("CopyOf=")).and_then(|n| n.parse().ok())
}

impl LineFormat for Conllu {
    fn name(&self) -> &str {
        "conllu"
    }

    fn read_line(&self, line: &str, copy_of: &mut HashMap<String, usize>) -> Result<ParsedLine> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != COLUMNS {
            return Err(parse_error(
                line,
                format!("expected {COLUMNS} columns, found {}", fields.len()),
            ));
        }
        let [id, form, lemma, upos, xpos, feats, head, deprel, deps, misc] = fields[..] else {
            return Err(parse_error(line, "malformed columns"));
        };

        if let Some((start, end)) = id.split_once('-') {
            let span = (parse_position(line, start)?, parse_position(line, end)?);
            return Ok(ParsedLine::MultiWord(Node::multi_word(span.0, span.1, form)));
        }
        if id.contains('.') {
            if let Some(original) = copy_source(misc) {
                copy_of.insert(id.to_string(), original);
            }
            return Ok(ParsedLine::Skip);
        }

        let position = parse_position(line, id)?;
        let pos = if xpos == EMPTY_FIELD { upos } else { xpos };
        let token = Token::new(form, upos).with_lemma(lemma).with_pos(pos).with_features(feats);
        let node = Node::new(position).with_token(token).with_enhanced(deps).with_misc(misc);

        let mut heads: Vec<PendingHead> = Vec::new();
        if head != EMPTY_FIELD {
            let primary = PendingHead::create(head, deprel)
                .ok_or_else(|| parse_error(line, format!("invalid head {head:?}")))?;
            heads.push(primary);
        }
        if deps != EMPTY_FIELD {
            for entry in deps.split('|') {
                let (h, rel) = entry
                    .split_once(':')
                    .ok_or_else(|| parse_error(line, format!("invalid DEPS entry {entry:?}")))?;
                let extra = PendingHead::create(h, rel)
                    .ok_or_else(|| parse_error(line, format!("invalid head {h:?}")))?;
                if !heads.contains(&extra) {
                    heads.push(extra);
                }
            }
        }
        heads.sort_by_key(|h| h.remote);

        Ok(ParsedLine::Token { node, heads })
    }

    fn generate_lines(&self, graph: &Graph, test: bool, tree: bool) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        if let Some(id) = &graph.id {
            rows.push(vec![format!("# sent_id = {id}")]);
        }

        for idx in graph.token_indices() {
            let node = graph.node(idx);
            let Some(token) = node.token.as_ref() else { continue };

            let multi_word = graph.multi_word_of(idx);
            if let Some((start, end)) = multi_word.and_then(|m| m.span).filter(|s| s.0 == node.position) {
                let text = multi_word.map(Node::text).unwrap_or_default();
                let mut row = vec![format!("{start}-{end}"), text.to_string()];
                row.resize(COLUMNS, EMPTY_FIELD.to_string());
                rows.push(row);
            }

            let primary = graph.incoming_edges(idx).map(|(_, e)| e).find(|e| !e.remote);
            let (head, rel) = match primary {
                Some(edge) if !test => ((edge.head_index + 1).to_string(), edge.rel.clone()),
                _ => (EMPTY_FIELD.to_string(), EMPTY_FIELD.to_string()),
            };
            let deps = if test || tree {
                node.enhanced.clone()
            } else {
                let mut entries: Vec<(i64, String)> = graph
                    .incoming_edges(idx)
                    .map(|(_, e)| {
                        let marker = if e.remote { "*" } else { "" };
                        (e.head_index + 1, format!("{}:{}{marker}", e.head_index + 1, e.rel))
                    })
                    .collect();
                entries.sort();
                if entries.is_empty() {
                    EMPTY_FIELD.to_string()
                } else {
                    entries.into_iter().map(|(_, s)| s).collect::<Vec<_>>().join("|")
                }
            };

            rows.push(vec![
                node.position.to_string(),
                token.text.clone(),
                token.lemma.clone(),
                token.tag.clone(),
                token.pos.clone(),
                token.features.clone(),
                head,
                rel,
                deps,
                node.misc.clone(),
            ]);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadRef;

    fn read(line: &str) -> Result<ParsedLine> {
        Conllu.read_line(line, &mut HashMap::new())
    }

    #[test]
    fn test_read_token() {
        let parsed = read("2\tcat\tcat\tNOUN\tNN\tNumber=Sing\t3\tnsubj\t_\t_").unwrap();
        let ParsedLine::Token { node, heads } = parsed else { panic!("expected token") };
        let token = node.token.unwrap();
        assert_eq!(node.position, 2);
        assert_eq!(token.text, "cat");
        assert_eq!(token.tag, "NOUN");
        assert_eq!(token.pos, "NN");
        assert_eq!(token.features, "Number=Sing");
        assert_eq!(heads, vec![PendingHead::create("3", "nsubj").unwrap()]);
    }

    #[test]
    fn test_missing_xpos_falls_back_to_upos() {
        let ParsedLine::Token { node, .. } = read("1\tgo\tgo\tVERB\t_\t_\t0\troot\t_\t_").unwrap() else {
            panic!("expected token")
        };
        assert_eq!(node.token.unwrap().pos, "VERB");
    }

    #[test]
    fn test_deps_add_remote_edges() {
        let line = "1\tJohn\tJohn\tPROPN\tNNP\t_\t2\tA\t2:A|4:A*\t_";
        let ParsedLine::Token { node, heads } = read(line).unwrap() else { panic!("expected token") };
        assert_eq!(node.enhanced, "2:A|4:A*");
        assert_eq!(heads.len(), 2);
        assert_eq!(heads[1].head, HeadRef::Position(4));
        assert!(heads[1].remote);
    }

    #[test]
    fn test_multi_word_and_copy_lines() {
        let ParsedLine::MultiWord(node) = read("2-3\tzum\t_\t_\t_\t_\t_\t_\t_\t_").unwrap() else {
            panic!("expected multi-word")
        };
        assert_eq!(node.span, Some((2, 3)));
        assert_eq!(node.text(), "zum");

        let mut copy_of = HashMap::new();
        let parsed = Conllu.read_line("8.1\tgot\tget\tVERB\t_\t_\t_\t_\t5:conj\tCopyOf=5", &mut copy_of);
        assert_eq!(parsed.unwrap(), ParsedLine::Skip);
        assert_eq!(copy_of.get("8.1"), Some(&5));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(read("1\tcat"), Err(Error::Parse { .. })));
        assert!(matches!(read("x\tcat\t_\t_\t_\t_\t0\troot\t_\t_"), Err(Error::Parse { .. })));
        assert!(matches!(read("1\tcat\t_\t_\t_\t_\t?\troot\t_\t_"), Err(Error::Parse { .. })));
        assert!(matches!(read("1\tcat\t_\t_\t_\t_\t0\troot\tbad\t_"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_generate_lines() {
        let mut graph = Graph::new(Some("7".into()));
        let a = graph.push_node(Node::new(1).with_token(Token::new("Hi", "INTJ")));
        let b = graph.push_node(Node::new(2).with_token(Token::new("!", "PUNCT")));
        graph.add_edge(crate::model::NodeIdx::ROOT, a, "root", false);
        graph.add_edge(a, b, "punct", false);
        graph.add_edge(crate::model::NodeIdx::ROOT, b, "dep", true);

        let rows = Conllu.generate_lines(&graph, false, false);
        assert_eq!(rows[0], vec!["# sent_id = 7".to_string()]);
        assert_eq!(rows[1].join("\t"), "1\tHi\t_\tINTJ\tINTJ\t_\t0\troot\t0:root\t_");
        assert_eq!(rows[2].join("\t"), "2\t!\t_\tPUNCT\tPUNCT\t_\t1\tpunct\t0:dep*|1:punct\t_");

        let test_rows = Conllu.generate_lines(&graph, true, true);
        assert_eq!(test_rows[1].join("\t"), "1\tHi\t_\tINTJ\tINTJ\t_\t_\t_\t_\t_");
    }
}
