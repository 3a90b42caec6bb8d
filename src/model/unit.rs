//! Units of the hierarchical graph: terminals and constituents.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Attributes;

/// Opaque unit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Tag of a non-terminal unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeTag {
    /// Ordinary constituent.
    Foundational,
    /// Constituent dominating punctuation only.
    Punctuation,
}

impl std::fmt::Display for NodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Foundational => write!(f, "FN"),
            Self::Punctuation => write!(f, "PNCT"),
        }
    }
}

/// Surface leaf of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    /// 1-based order in the sentence.
    pub position: usize,
    pub text: String,
    pub punct: bool,
    pub paragraph: usize,
}

/// What a unit is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Terminal(Terminal),
    NonTerminal(NodeTag),
}

/// A labeled parent → child edge. `remote` marks a secondary parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEdge {
    pub parent: UnitId,
    pub child: UnitId,
    pub tag: String,
    pub remote: bool,
}

impl UnitEdge {
    pub fn new(parent: UnitId, child: UnitId, tag: impl Into<String>, remote: bool) -> Self {
        Self { parent, child, tag: tag.into(), remote }
    }
}

/// A unit with its adjacency. The primary parent, when present, is the
/// parent of the first non-remote incoming edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    /// Non-surface unit (e.g. an elided argument).
    pub implicit: bool,
    pub attrs: Attributes,
    pub incoming: SmallVec<[UnitEdge; 2]>,
    pub outgoing: SmallVec<[UnitEdge; 4]>,
}

impl Unit {
    pub fn new(id: UnitId, kind: UnitKind) -> Self {
        Self {
            id,
            kind,
            implicit: false,
            attrs: Attributes::new(),
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
        }
    }

    pub fn terminal(&self) -> Option<&Terminal> {
        match &self.kind {
            UnitKind::Terminal(t) => Some(t),
            UnitKind::NonTerminal(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, UnitKind::Terminal(_))
    }

    pub fn is_punct(&self) -> bool {
        self.terminal().is_some_and(|t| t.punct)
    }

    /// Parent of the first incoming edge.
    pub fn first_parent(&self) -> Option<UnitId> {
        self.incoming.first().map(|e| e.parent)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}
