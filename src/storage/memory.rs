//! In-memory hierarchy backend.
//!
//! This is the reference implementation of `HierarchyBackend`: a plain arena
//! of units indexed by `UnitId`, with the root at slot 0.
//!
//! ## Limitations
//!
//! - **Append-only**: units and edges are never deleted.
//! - **Positions are insertion order**: terminal `n` is the `n`-th
//!   `add_terminal()` call.

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::{Error, Result};
use super::HierarchyBackend;

// ============================================================================
// MemoryHierarchy
// ============================================================================

/// In-memory hierarchical graph for one passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryHierarchy {
    id: String,
    format: Option<String>,
    units: Vec<Unit>,
    terminals: Vec<UnitId>,
}

impl MemoryHierarchy {
    pub fn new(id: impl Into<String>) -> Self {
        let root = Unit::new(UnitId(0), UnitKind::NonTerminal(NodeTag::Foundational));
        Self {
            id: id.into(),
            format: None,
            units: vec![root],
            terminals: Vec::new(),
        }
    }

    /// All units in creation order, root first.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Create an implicit (non-surface) unit under `parent`.
    pub fn add_implicit_unit(&mut self, parent: Option<UnitId>, tag: &str) -> Result<UnitId> {
        let id = self.add_unit(parent, tag)?;
        self.unit_mut(id)?.implicit = true;
        Ok(id)
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(id.0 as usize).ok_or(Error::UnknownUnit(id))
    }

    fn push(&mut self, kind: UnitKind) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(Unit::new(id, kind));
        id
    }

    fn link(&mut self, edge: UnitEdge) -> Result<()> {
        self.get(edge.child)?;
        self.unit_mut(edge.parent)?.outgoing.push(edge.clone());
        self.unit_mut(edge.child)?.incoming.push(edge);
        Ok(())
    }
}

// ============================================================================
// HierarchyBackend impl
// ============================================================================

impl HierarchyBackend for MemoryHierarchy {
    fn passage_id(&self) -> &str {
        &self.id
    }

    fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    fn set_format(&mut self, format: Option<String>) {
        self.format = format;
    }

    fn root(&self) -> UnitId {
        UnitId(0)
    }

    fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0 as usize)
    }

    fn terminals(&self) -> Vec<UnitId> {
        self.terminals.clone()
    }

    fn add_terminal(&mut self, text: &str, punct: bool, paragraph: usize) -> Result<UnitId> {
        let terminal = Terminal {
            position: self.terminals.len() + 1,
            text: text.to_string(),
            punct,
            paragraph,
        };
        let id = self.push(UnitKind::Terminal(terminal));
        self.terminals.push(id);
        Ok(id)
    }

    fn add_unit(&mut self, parent: Option<UnitId>, tag: &str) -> Result<UnitId> {
        let parent = parent.unwrap_or(self.root());
        self.get(parent)?;
        let id = self.push(UnitKind::NonTerminal(NodeTag::Foundational));
        self.link(UnitEdge::new(parent, id, tag, false))?;
        Ok(id)
    }

    fn add_edge(&mut self, parent: UnitId, tag: &str, child: UnitId) -> Result<()> {
        if self.get(parent)?.is_terminal() {
            return Err(Error::ConstraintViolation(format!("terminal {parent} cannot have children")));
        }
        self.link(UnitEdge::new(parent, child, tag, false))
    }

    fn add_remote(&mut self, parent: UnitId, tag: &str, child: UnitId) -> Result<()> {
        if !self.can_add_remote(parent, child)? {
            return Err(Error::ConstraintViolation(format!(
                "remote edge {parent} -[{tag}]-> {child} would form a cycle or duplicate"
            )));
        }
        self.link(UnitEdge::new(parent, child, tag, true))
    }

    fn set_attr(&mut self, id: UnitId, key: &str, value: String) -> Result<()> {
        self.unit_mut(id)?.attrs.insert(key.to_string(), value);
        Ok(())
    }

    fn mark_punctuation(&mut self, id: UnitId) -> Result<()> {
        let unit = self.unit_mut(id)?;
        if unit.is_terminal() {
            return Err(Error::ConstraintViolation(format!("{id} is a terminal")));
        }
        unit.kind = UnitKind::NonTerminal(NodeTag::Punctuation);
        Ok(())
    }
}
