//! Edge (head → dependent relation) in the dependency graph.

use serde::{Deserialize, Serialize};

use super::NodeIdx;

/// Slot of an edge in the `Graph` edge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Head reference that has not been linked to a node yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadRef {
    /// Absolute position among head-eligible nodes (0 = virtual root).
    Position(i64),
    /// Reference to a copy node such as `"3.1"`.
    Copy(String),
}

impl HeadRef {
    /// Parse a head column value: integers are positions, `a.b` are copies.
    pub fn parse(s: &str) -> Option<Self> {
        if s.contains('.') {
            Some(Self::Copy(s.to_string()))
        } else {
            s.parse().ok().map(Self::Position)
        }
    }
}

/// A head reference paired with its relation, as read from one column set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingHead {
    pub head: HeadRef,
    pub rel: String,
    pub remote: bool,
}

impl PendingHead {
    /// Build from raw columns; a trailing `*` on the relation marks a remote edge.
    pub fn create(head: &str, rel: &str) -> Option<Self> {
        Some(Self {
            head: HeadRef::parse(head)?,
            rel: rel.trim_end_matches('*').to_string(),
            remote: rel.ends_with('*'),
        })
    }
}

/// A typed dependency relation.
///
/// `head_index` follows the `head.position - 1` convention, so an edge from
/// the virtual root has index `-1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub rel: String,
    pub remote: bool,
    pub head_index: i64,
    pub(crate) pending: Option<HeadRef>,
    pub(crate) head: Option<NodeIdx>,
    pub(crate) dependent: Option<NodeIdx>,
}

impl Edge {
    pub(crate) fn new(rel: impl Into<String>, remote: bool) -> Self {
        Self {
            rel: rel.into(),
            remote,
            head_index: -1,
            pending: None,
            head: None,
            dependent: None,
        }
    }

    pub fn head(&self) -> Option<NodeIdx> {
        self.head
    }

    pub fn dependent(&self) -> Option<NodeIdx> {
        self.dependent
    }

    pub fn pending(&self) -> Option<&HeadRef> {
        self.pending.as_ref()
    }

    pub fn is_linked(&self) -> bool {
        self.head.is_some()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.head_index == other.head_index
            && self.dependent == other.dependent
            && self.rel == other.rel
            && self.remote == other.remote
    }
}

impl Eq for Edge {}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dependent = self.dependent.map(|d| d.to_string()).unwrap_or_else(|| "?".into());
        write!(
            f,
            "{}-[{}{}]->{}",
            self.head_index + 1,
            self.rel,
            if self.remote { "*" } else { "" },
            dependent,
        )
    }
}
