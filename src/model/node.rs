//! Node in the dependency graph.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::token::EMPTY_FIELD;
use super::{EdgeId, Token, UnitId};

/// Index of a node inside its `Graph` (0 is the virtual root).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIdx(pub usize);

impl NodeIdx {
    pub const ROOT: NodeIdx = NodeIdx(0);
}

impl std::fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dependency node: the virtual root, a token, or a multi-word token.
///
/// Adjacency (`incoming`/`outgoing`) is read-only from outside the model;
/// `Graph` is the only writer so both endpoints of an edge stay in sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub position: usize,
    pub token: Option<Token>,
    pub(crate) incoming: SmallVec<[EdgeId; 2]>,
    pub(crate) outgoing: SmallVec<[EdgeId; 4]>,
    /// Copy/ellipsis nodes are not eligible as heads.
    pub is_head: bool,
    pub is_top: bool,
    pub is_multi_word: bool,
    /// Inclusive `[start, end]` positions covered by a multi-word token.
    pub span: Option<(usize, usize)>,
    /// Index into `Graph::multi_words` of the enclosing multi-word token.
    pub parent_multi_word: Option<usize>,
    pub frame: String,
    pub enhanced: String,
    pub misc: String,
    /// Terminal leaf in the hierarchical graph.
    pub terminal: Option<UnitId>,
    /// Hierarchical unit standing for this node (its constituent).
    pub unit: Option<UnitId>,
    /// Lowest hierarchical unit that will dominate `terminal`.
    pub preterminal: Option<UnitId>,
    /// Topological depth; `None` until leveled.
    pub level: Option<usize>,
}

impl Node {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            token: None,
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
            is_head: true,
            is_top: false,
            is_multi_word: false,
            span: None,
            parent_multi_word: None,
            frame: EMPTY_FIELD.to_string(),
            enhanced: EMPTY_FIELD.to_string(),
            misc: EMPTY_FIELD.to_string(),
            terminal: None,
            unit: None,
            preterminal: None,
            level: None,
        }
    }

    /// The virtual root at position 0.
    pub fn root() -> Self {
        Self::new(0)
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// A multi-word token covering `start..=end`.
    pub fn multi_word(start: usize, end: usize, text: impl Into<String>) -> Self {
        let mut node = Self::new(start).with_token(Token::new(text, EMPTY_FIELD));
        node.is_multi_word = true;
        node.span = Some((start, end));
        node
    }

    pub fn with_top(mut self, is_top: bool) -> Self {
        self.is_top = is_top;
        self
    }

    pub fn with_enhanced(mut self, enhanced: impl Into<String>) -> Self {
        self.enhanced = enhanced.into();
        self
    }

    pub fn with_misc(mut self, misc: impl Into<String>) -> Self {
        self.misc = misc.into();
        self
    }

    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = frame.into();
        self
    }

    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn is_root(&self) -> bool {
        self.position == 0 && self.token.is_none()
    }

    pub fn text(&self) -> &str {
        self.token.as_ref().map(|t| t.text.as_str()).unwrap_or("ROOT")
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.span == other.span
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.position.hash(state);
        self.span.hash(state);
    }
}
