//! # Hierarchy Backend Trait
//!
//! The contract between the converter and whatever owns the hierarchical
//! graph. The converter only ever adds terminals, units and edges, then reads
//! them back; everything else is up to the backend.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryHierarchy` | `memory` | Arena of units, for tests and embedding |

pub mod memory;

use hashbrown::HashSet;

use crate::model::*;
use crate::{Error, Result};

pub use memory::MemoryHierarchy;

// ============================================================================
// HierarchyBackend Trait
// ============================================================================

/// Storage contract for one passage's hierarchical graph.
///
/// A backend has a distinguished root unit. Units created without a parent
/// hang under it. `add_remote` must refuse edges that would create a cycle or
/// repeat an existing parent → child relation.
pub trait HierarchyBackend {
    // ========================================================================
    // Passage metadata
    // ========================================================================

    fn passage_id(&self) -> &str;

    /// Original annotation format recorded on the passage.
    fn format(&self) -> Option<&str>;

    fn set_format(&mut self, format: Option<String>);

    // ========================================================================
    // Reads
    // ========================================================================

    /// The top-level unit all parentless units attach to.
    fn root(&self) -> UnitId;

    /// Get a unit by ID. Returns None if not found.
    fn unit(&self, id: UnitId) -> Option<&Unit>;

    /// Terminal IDs ordered by position.
    fn terminals(&self) -> Vec<UnitId>;

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a terminal leaf at the next position.
    fn add_terminal(&mut self, text: &str, punct: bool, paragraph: usize) -> Result<UnitId>;

    /// Create a non-terminal unit under `parent` (the root when `None`).
    fn add_unit(&mut self, parent: Option<UnitId>, tag: &str) -> Result<UnitId>;

    /// Add a primary edge between existing units.
    fn add_edge(&mut self, parent: UnitId, tag: &str, child: UnitId) -> Result<()>;

    /// Add a remote (secondary) edge between existing units.
    fn add_remote(&mut self, parent: UnitId, tag: &str, child: UnitId) -> Result<()>;

    /// Set a string attribute (upsert).
    fn set_attr(&mut self, id: UnitId, key: &str, value: String) -> Result<()>;

    /// Retag a non-terminal as dominating punctuation only.
    fn mark_punctuation(&mut self, id: UnitId) -> Result<()>;

    // ========================================================================
    // Derived queries
    // ========================================================================

    /// Like `unit`, but a missing unit is an error.
    fn get(&self, id: UnitId) -> Result<&Unit> {
        self.unit(id).ok_or(Error::UnknownUnit(id))
    }

    /// Children over all outgoing edges, remote included.
    fn children(&self, id: UnitId) -> Result<Vec<UnitId>> {
        Ok(self.get(id)?.outgoing.iter().map(|e| e.child).collect())
    }

    /// Parents over all incoming edges, primary first.
    fn parents(&self, id: UnitId) -> Result<Vec<UnitId>> {
        Ok(self.get(id)?.incoming.iter().map(|e| e.parent).collect())
    }

    /// Number of terminals reachable through primary edges.
    fn count_terminals(&self, id: UnitId) -> Result<usize> {
        let mut count = 0;
        let mut stack = vec![id];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let unit = self.get(current)?;
            if unit.is_terminal() {
                count += 1;
            }
            stack.extend(unit.outgoing.iter().filter(|e| !e.remote).map(|e| e.child));
        }
        Ok(count)
    }

    /// True if `unit` is `ancestor` or reachable from it over any edge.
    fn is_descendant_or_self(&self, ancestor: UnitId, unit: UnitId) -> Result<bool> {
        let mut stack = vec![ancestor];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == unit {
                return Ok(true);
            }
            if seen.insert(current) {
                stack.extend(self.get(current)?.outgoing.iter().map(|e| e.child));
            }
        }
        Ok(false)
    }

    /// Whether a remote edge `parent → child` keeps the graph acyclic and
    /// free of duplicate parent → child relations.
    fn can_add_remote(&self, parent: UnitId, child: UnitId) -> Result<bool> {
        if self.children(parent)?.contains(&child) {
            return Ok(false);
        }
        Ok(!self.is_descendant_or_self(child, parent)?)
    }
}
