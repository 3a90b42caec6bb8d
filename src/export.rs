//! Passage export: bracketed text for eyeballing, JSON for tooling.
//!
//! ```text
//! HierarchyBackend → export_bracketed() → [head [head sleeps] [nsubj [head cat The]]]
//!                  → export_json()      → {"id": …, "units": […]}
//! ```

use std::io::Write;

use hashbrown::HashSet;
use serde::Serialize;

use crate::model::*;
use crate::storage::HierarchyBackend;
use crate::Result;

/// Write the passage as nested brackets, one line.
///
/// Each primary child renders as `[tag …]`, terminals as their text and
/// remote children as `[tag* uN]` so shared units are not repeated.
pub fn export_bracketed<B: HierarchyBackend + ?Sized>(
    backend: &B,
    writer: &mut dyn Write,
) -> Result<()> {
    writeln!(writer, "{}", to_bracketed(backend)?)?;
    Ok(())
}

pub fn to_bracketed<B: HierarchyBackend + ?Sized>(backend: &B) -> Result<String> {
    render(backend, backend.root())
}

fn render<B: HierarchyBackend + ?Sized>(backend: &B, id: UnitId) -> Result<String> {
    let unit = backend.get(id)?;
    if let Some(terminal) = unit.terminal() {
        return Ok(terminal.text.clone());
    }
    let mut parts = Vec::with_capacity(unit.outgoing.len());
    for edge in &unit.outgoing {
        if edge.remote {
            parts.push(format!("[{}* {}]", edge.tag, edge.child));
        } else if backend.get(edge.child)?.is_terminal() && edge.tag == "Terminal" {
            parts.push(render(backend, edge.child)?);
        } else {
            parts.push(format!("[{} {}]", edge.tag, render(backend, edge.child)?));
        }
    }
    Ok(parts.join(" "))
}

#[derive(Serialize)]
struct PassageDump<'a> {
    id: &'a str,
    format: Option<&'a str>,
    units: Vec<&'a Unit>,
}

/// Write every unit reachable from the root (plus all terminals) as JSON.
pub fn export_json<B: HierarchyBackend + ?Sized>(
    backend: &B,
    writer: &mut dyn Write,
) -> Result<()> {
    let mut seen: HashSet<UnitId> = HashSet::new();
    let mut stack = vec![backend.root()];
    stack.extend(backend.terminals().into_iter().rev());
    let mut ids = Vec::new();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        ids.push(id);
        stack.extend(backend.get(id)?.outgoing.iter().rev().map(|e| e.child));
    }
    ids.sort();

    let units = ids.into_iter().map(|id| backend.get(id)).collect::<Result<Vec<_>>>()?;
    let dump = PassageDump { id: backend.passage_id(), format: backend.format(), units };
    serde_json::to_writer_pretty(&mut *writer, &dump)?;
    writeln!(writer)?;
    Ok(())
}
