//! Head selection in the hierarchical graph.
//!
//! Every non-terminal unit has one head child, chosen by label priority:
//!
//! | Tier | Labels |
//! |------|--------|
//! | 1 | `head` |
//! | 2 | `ConverterConfig::tag_priority`, in order |
//! | 3 | `C N H P S A D T Q E R F L LR LA G Terminal U` |
//! | 4 | anything |
//!
//! Within a tier the first matching edge in child order wins.

use crate::model::{UnitEdge, UnitId};
use crate::storage::HierarchyBackend;
use crate::{Error, Result};
use super::{ConverterConfig, Formalism, tags};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tier {
    Label(String),
    Any,
}

impl Tier {
    fn matches(&self, tag: &str) -> bool {
        match self {
            Self::Label(label) => label == tag,
            Self::Any => true,
        }
    }
}

/// Walks a hierarchy to find head children, head terminals and the edges
/// that head a terminal from above.
#[derive(Debug, Clone)]
pub struct HeadFinder {
    tiers: Vec<Tier>,
    formalism: Formalism,
}

impl HeadFinder {
    pub fn new(config: &ConverterConfig, formalism: Formalism) -> Self {
        let tiers = std::iter::once(Tier::Label(tags::HEAD.to_string()))
            .chain(config.tag_priority.iter().cloned().map(Tier::Label))
            .chain(tags::DEFAULT_PRIORITY.iter().map(|t| Tier::Label(t.to_string())))
            .chain(std::iter::once(Tier::Any))
            .collect();
        Self { tiers, formalism }
    }

    pub fn formalism(&self) -> Formalism {
        self.formalism
    }

    /// Highest-priority primary child of `unit` that is not implicit.
    pub fn find_head_child<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        unit: UnitId,
    ) -> Result<UnitId> {
        let outgoing = &backend.get(unit)?.outgoing;
        for tier in &self.tiers {
            for edge in outgoing.iter().filter(|e| !e.remote && tier.matches(&e.tag)) {
                if !backend.get(edge.child)?.implicit {
                    return Ok(edge.child);
                }
            }
        }
        Err(Error::NoHeadChild(unit))
    }

    /// Looser head choice: default labels over every outgoing edge, then the
    /// child with the widest terminal yield (first one on ties).
    pub fn find_head_child_edge<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        unit: UnitId,
    ) -> Result<UnitEdge> {
        let outgoing = &backend.get(unit)?.outgoing;
        for tag in tags::DEFAULT_PRIORITY {
            for edge in outgoing.iter().filter(|e| e.tag == tag) {
                if !backend.get(edge.child)?.implicit {
                    return Ok(edge.clone());
                }
            }
        }

        let mut widest: Option<(usize, &UnitEdge)> = None;
        for edge in outgoing {
            let count = backend.count_terminals(edge.child)?;
            if widest.is_none_or(|(best, _)| count > best) {
                widest = Some((count, edge));
            }
        }
        widest.map(|(_, e)| e.clone()).ok_or(Error::NoHeadChild(unit))
    }

    /// Follow head children down to a terminal.
    pub fn find_head_terminal<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        unit: UnitId,
    ) -> Result<UnitId> {
        self.descend(backend, unit, false)
    }

    /// Like `find_head_terminal`, but a unit with no head child under the
    /// strict rule falls back to `find_head_child_edge`.
    pub fn find_surface_head_terminal<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        unit: UnitId,
    ) -> Result<UnitId> {
        self.descend(backend, unit, true)
    }

    fn descend<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        unit: UnitId,
        fallback: bool,
    ) -> Result<UnitId> {
        let mut current = unit;
        loop {
            let node = backend.get(current)?;
            if node.outgoing.is_empty() {
                return if node.is_terminal() { Ok(current) } else { Err(Error::ImplicitUnit(current)) };
            }
            current = match self.find_head_child(backend, current) {
                Ok(child) => child,
                Err(Error::NoHeadChild(_)) if fallback => {
                    self.find_head_child_edge(backend, current)?.child
                }
                Err(e) => return Err(e),
            };
        }
    }

    /// Climb from `unit` while it heads its first parent.
    pub fn find_headed_unit<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        unit: UnitId,
    ) -> Result<UnitId> {
        let mut current = unit;
        loop {
            let node = backend.get(current)?;
            let Some(first) = node.incoming.first() else {
                return Ok(current);
            };
            let parent = first.parent;
            let headed = match self.formalism {
                Formalism::Semantic => self.find_head_child(backend, parent)? == current,
                Formalism::Dependency => {
                    let first_child = backend.get(parent)?.outgoing.first().map(|e| e.child);
                    (node.outgoing.is_empty() || first.tag == tags::HEAD)
                        && !(first.tag == tags::TERMINAL && first_child != Some(current))
                }
            };
            if !headed {
                return Ok(current);
            }
            current = parent;
        }
    }

    /// Incoming edges of the headed unit above `unit`, minus `ROOT`/`TOP`.
    pub fn find_top_headed_edges<B: HierarchyBackend + ?Sized>(
        &self,
        backend: &B,
        unit: UnitId,
    ) -> Result<Vec<UnitEdge>> {
        let headed = self.find_headed_unit(backend, unit)?;
        Ok(backend
            .get(headed)?
            .incoming
            .iter()
            .filter(|e| e.tag != tags::ROOT && e.tag != tags::TOP)
            .cloned()
            .collect())
    }

    /// Whether the headed unit above `unit` hangs off a `TOP` edge.
    pub fn is_top<B: HierarchyBackend + ?Sized>(&self, backend: &B, unit: UnitId) -> Result<bool> {
        let headed = self.find_headed_unit(backend, unit)?;
        Ok(backend.get(headed)?.incoming.iter().any(|e| e.tag == tags::TOP))
    }
}
