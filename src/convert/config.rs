//! Converter configuration.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::model::Token;
use super::tags;

/// Read-only settings shared by every stage.
///
/// Loadable from JSON; missing keys take their defaults:
///
/// ```json
/// { "format": "conllu", "tree": true, "flat_relation": "flat" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Native line format; passages in this format are written without a
    /// `# format` header.
    pub format: String,
    /// Enforce a single root and drop remote edges.
    pub tree: bool,
    /// Prefix auxiliary preterminal labels with `#`.
    pub mark_aux: bool,
    /// Token tag (or POS) marking punctuation.
    pub punct_tag: String,
    /// Extra head-child labels tried before the defaults.
    pub tag_priority: Vec<String>,
    /// Relation of flat (unanalyzable) edges.
    pub flat_relation: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            format: "conllu".to_string(),
            tree: false,
            mark_aux: false,
            punct_tag: "PUNCT".to_string(),
            tag_priority: Vec::new(),
            flat_relation: tags::TERMINAL.to_string(),
        }
    }
}

impl ConverterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_tree(mut self, tree: bool) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_mark_aux(mut self, mark_aux: bool) -> Self {
        self.mark_aux = mark_aux;
        self
    }

    pub fn with_punct_tag(mut self, punct_tag: impl Into<String>) -> Self {
        self.punct_tag = punct_tag.into();
        self
    }

    pub fn with_tag_priority<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_priority = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flat_relation(mut self, rel: impl Into<String>) -> Self {
        self.flat_relation = rel.into();
        self
    }

    /// Whether `rel` makes the dependent share its head's unit.
    pub fn is_flat(&self, rel: &str) -> bool {
        rel == self.flat_relation || rel == tags::TERMINAL
    }

    pub fn is_punct(&self, token: Option<&Token>) -> bool {
        token.is_some_and(|t| {
            [t.tag.as_str(), t.pos.as_str()]
                .into_iter()
                .any(|tag| tag == tags::PUNCT_TOKEN || tag == self.punct_tag)
        })
    }
}
