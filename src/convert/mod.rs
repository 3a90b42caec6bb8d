//! # Conversion Pipeline
//!
//! Dependency graph ⇄ hierarchical graph, one sentence at a time.
//!
//! | Stage | Module | Direction |
//! |-------|--------|-----------|
//! | Cycle breaking | `cycles` | read |
//! | Leveling | `topo` | read |
//! | Root/orphan repair | `preprocess` | both |
//! | Unit construction | `forward` | read |
//! | Head finding | `head` | write |
//! | Edge recovery | `backward` | write |
//! | Facade + config | `converter`, `config` | both |
//!
//! Every stage takes the sentence's `Formalism` as a value. Nothing is
//! re-derived from global state.

pub mod config;
pub mod converter;
pub mod cycles;
pub mod topo;
pub mod preprocess;
pub mod head;
pub mod forward;
pub mod backward;

pub use config::ConverterConfig;
pub use converter::{Converted, DependencyConverter, WriteOptions};
pub use cycles::{Cycle, break_cycles, find_cycle};
pub use topo::topological_sort;
pub use preprocess::{Direction, Preprocessor};
pub use head::HeadFinder;
pub use forward::ForwardConverter;
pub use backward::BackwardConverter;

use serde::{Deserialize, Serialize};

// ============================================================================
// Labels
// ============================================================================

/// Edge and unit labels the converter emits or recognizes.
pub mod tags {
    pub const ROOT: &str = "ROOT";
    pub const TOP: &str = "TOP";
    pub const HEAD: &str = "head";
    pub const ORPHAN: &str = "orphan";
    /// Dependency relation of the sentence root. Compared case-insensitively.
    pub const ROOT_REL: &str = "root";
    pub const TERMINAL: &str = "Terminal";

    pub const PUNCTUATION: &str = "U";
    pub const CENTER: &str = "C";
    pub const CONNECTOR: &str = "N";
    pub const PARALLEL_SCENE: &str = "H";
    pub const PROCESS: &str = "P";
    pub const STATE: &str = "S";
    pub const PARTICIPANT: &str = "A";
    pub const ADVERBIAL: &str = "D";
    pub const TIME: &str = "T";
    pub const QUANTIFIER: &str = "Q";
    pub const ELABORATOR: &str = "E";
    pub const RELATOR: &str = "R";
    pub const FUNCTION: &str = "F";
    pub const LINKER: &str = "L";
    pub const LINK_RELATION: &str = "LR";
    pub const LINK_ARGUMENT: &str = "LA";
    pub const GROUND: &str = "G";

    /// Head-child preference after `head` and any configured labels.
    pub const DEFAULT_PRIORITY: [&str; 18] = [
        CENTER, CONNECTOR, PARALLEL_SCENE, PROCESS, STATE, PARTICIPANT, ADVERBIAL, TIME,
        QUANTIFIER, ELABORATOR, RELATOR, FUNCTION, LINKER, LINK_RELATION, LINK_ARGUMENT, GROUND,
        TERMINAL, PUNCTUATION,
    ];

    /// Token tag of punctuation terminals.
    pub const PUNCT_TOKEN: &str = "Punctuation";
    /// Token tag of word terminals that carry no tag attribute.
    pub const WORD_TOKEN: &str = "Word";

    /// Prefix of auxiliary labels when `mark_aux` is on.
    pub const AUX_PREFIX: &str = "#";

    pub fn is_root_rel(rel: &str) -> bool {
        rel.eq_ignore_ascii_case(ROOT_REL)
    }
}

// ============================================================================
// Formalism
// ============================================================================

/// Format tag that selects the semantic formalism.
pub const SEMANTIC_FORMAT: &str = "ucca";

/// Target annotation scheme of one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formalism {
    /// Hierarchical labels (scenes, participants, centers, …) with remotes.
    Semantic,
    /// Plain dependency relations; every internal edge is `head`.
    Dependency,
}

impl Formalism {
    /// `None` and every tag other than `"ucca"` mean plain dependencies.
    pub fn from_format(format: Option<&str>) -> Self {
        match format {
            Some(f) if f == SEMANTIC_FORMAT => Self::Semantic,
            _ => Self::Dependency,
        }
    }

    /// Whether remote edges survive preprocessing.
    pub fn has_remotes(self) -> bool {
        matches!(self, Self::Semantic)
    }

    /// Label for the edge from a node's unit down to its preterminal.
    pub fn edge_label(self, label: &str, mark_aux: bool) -> String {
        match self {
            Self::Semantic if mark_aux => format!("{}{label}", tags::AUX_PREFIX),
            Self::Semantic => label.to_string(),
            Self::Dependency => tags::HEAD.to_string(),
        }
    }
}

impl std::fmt::Display for Formalism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Dependency => write!(f, "dependency"),
        }
    }
}
