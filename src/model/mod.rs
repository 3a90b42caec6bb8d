//! # Graph Model
//!
//! Two families of DTOs live here:
//!
//! - the flat dependency side: `Token`, `Node`, `Edge`, `Graph`
//! - the hierarchical side: `Unit`, `UnitEdge`, `Terminal`
//!
//! Design rule: no conversion logic here. This module is pure data plus the
//! adjacency bookkeeping that keeps `Graph` edges and node lists consistent.

pub mod token;
pub mod node;
pub mod edge;
pub mod graph;
pub mod unit;
pub mod attributes;

pub use token::Token;
pub use node::{Node, NodeIdx};
pub use edge::{Edge, EdgeId, HeadRef, PendingHead};
pub use graph::Graph;
pub use unit::{NodeTag, Terminal, Unit, UnitEdge, UnitId, UnitKind};
pub use attributes::Attributes;
