//! # semgraph-conv: Dependency ⇄ Hierarchical Graph Conversion
//!
//! Converts sentence annotations between a flat dependency graph (tokens with
//! typed edges to head tokens) and a hierarchical semantic graph (tokens as
//! leaves of a rooted structure with primary and remote parents).
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `HierarchyBackend` is the contract between the converter
//!    and whatever stores the hierarchical graph
//! 2. **Edge table**: dependency adjacency only changes through `Graph` methods
//! 3. **Formalism as a value**: `Formalism` is chosen per sentence and passed
//!    to every stage instead of being re-derived
//! 4. **Stages compose**: cycle breaking → leveling → preprocessing → build
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use semgraph_conv::{Conllu, ConverterConfig, DependencyConverter, WriteOptions};
//!
//! # fn example() -> semgraph_conv::Result<()> {
//! let converter = DependencyConverter::new(ConverterConfig::default().with_tree(true), Conllu);
//! let lines = [
//!     "# sent_id = 1",
//!     "1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_",
//!     "2\tcat\tcat\tNOUN\tNN\t_\t3\tnsubj\t_\t_",
//!     "3\tsleeps\tsleep\tVERB\tVBZ\t_\t0\troot\t_\t_",
//! ];
//! for converted in converter.from_format(lines, "doc", true) {
//!     let out = converter.to_format(&converted.passage, &WriteOptions::default())?;
//!     println!("{}", out.join("\n"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! | Direction | Stages |
//! |-----------|--------|
//! | read | `LineFormat` → `Graph` → cycles → topo → preprocess → forward |
//! | write | `HierarchyBackend` → head finder → backward → preprocess → `LineFormat` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod convert;
pub mod format;
pub mod export;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Attributes, Edge, EdgeId, Graph, HeadRef, Node, NodeIdx, NodeTag, PendingHead, Terminal, Token,
    Unit, UnitEdge, UnitId, UnitKind,
};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{HierarchyBackend, MemoryHierarchy};

// ============================================================================
// Re-exports: Conversion
// ============================================================================

pub use convert::{
    BackwardConverter, Converted, Cycle, ConverterConfig, DependencyConverter, Direction, Formalism,
    ForwardConverter, HeadFinder, Preprocessor, WriteOptions, break_cycles, find_cycle,
    topological_sort,
};

// ============================================================================
// Re-exports: Formats
// ============================================================================

pub use format::{Conllu, LineFormat, ParsedGraph, ParsedLine, read_graphs};

// ============================================================================
// Re-exports: Export
// ============================================================================

pub use export::{export_bracketed, export_json, to_bracketed};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Head index {index} out of range ({available} heads available)")]
    HeadOutOfRange { index: i64, available: usize },

    #[error("Unresolvable copy reference: {0}")]
    UnresolvedCopy(String),

    #[error("Implicit unit in conversion to dependencies: {0}")]
    ImplicitUnit(UnitId),

    #[error("Could not find head child for unit {0}")]
    NoHeadChild(UnitId),

    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),

    #[error("Failed reading line {line:?}: {message}")]
    Parse { line: String, message: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
