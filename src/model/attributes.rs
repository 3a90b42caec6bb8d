//! Attributes: the string key-value store on hierarchical units.

use hashbrown::HashMap;

/// Free-form annotation attached to a unit (tag, lemma, features, ...).
pub type Attributes = HashMap<String, String>;

/// Well-known attribute keys written on terminals.
pub mod keys {
    pub const TAG: &str = "tag";
    pub const POS: &str = "pos";
    pub const LEMMA: &str = "lemma";
    pub const FEATURES: &str = "features";
    pub const ENHANCED: &str = "enhanced";
    pub const FRAME: &str = "frame";
    pub const MISC: &str = "misc";
    /// Surface text of the multi-word token a terminal belongs to.
    pub const MULTI_WORD_TEXT: &str = "multi_word_text";
}
