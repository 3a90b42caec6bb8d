//! Token: the surface annotation carried by a dependency node.

use serde::{Deserialize, Serialize};

/// Placeholder used for absent annotation fields.
pub const EMPTY_FIELD: &str = "_";

/// Immutable surface token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Coarse tag (UPOS in CoNLL-U).
    pub tag: String,
    pub lemma: String,
    /// Fine tag; defaults to `tag`.
    pub pos: String,
    pub features: String,
    pub paragraph: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            text: text.into(),
            pos: tag.clone(),
            tag,
            lemma: EMPTY_FIELD.to_string(),
            features: EMPTY_FIELD.to_string(),
            paragraph: 1,
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = lemma.into();
        self
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = pos.into();
        self
    }

    pub fn with_features(mut self, features: impl Into<String>) -> Self {
        self.features = features.into();
        self
    }

    pub fn with_paragraph(mut self, paragraph: usize) -> Self {
        self.paragraph = paragraph;
        self
    }
}
