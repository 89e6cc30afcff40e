//! Engine configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default depth budget for a top-level rule query.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Tunables for a [`KnowledgeBase`](crate::KnowledgeBase).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Depth budget given to every top-level `match_rule` / `rule_applies`.
    /// Running out is an ordinary failure.
    pub max_depth: usize,
    /// Cache rule-match results keyed by rule and arguments.
    ///
    /// The key ignores the remaining depth, so an answer computed deep in a
    /// recursion (with little budget left) is reused by shallower calls.
    pub memoize: bool,
    /// Count stored relational facts as domain elements, so variables can
    /// range over facts as well as constants.
    pub quantify_over_facts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            memoize: true,
            quantify_over_facts: true,
        }
    }
}

impl EngineConfig {
    /// Default settings with a different depth budget.
    #[must_use]
    pub fn deep(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Default settings with a domain made of constants and integers only.
    #[must_use]
    pub fn atoms_only() -> Self {
        Self {
            quantify_over_facts: false,
            ..Self::default()
        }
    }

    /// Set whether rule-match results are cached.
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}
