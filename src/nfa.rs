//! The compiled automaton: a flat, integer-indexed state pool.
//!
//! States are addressed by index rather than linked through pointers, which
//! both simplifies the deep-cloning the [compiler](crate::compiler) needs
//! for quantifier expansion and makes the automaton trivially movable and
//! (optionally) serializable as a plain descriptor.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One consuming transition out of a state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeKind {
    Char(char),
    Dot,
    /// A shorthand class selector: one of `d D w W s S`.
    Pred(char),
    Class {
        negated: bool,
        literals: Vec<char>,
        ranges: Vec<(char, char)>,
        /// Shorthand selectors (`d D w W s S`) nested inside the class,
        /// preserved on the edge rather than expanded into a sub-alternation.
        shorthands: Vec<char>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub kind: EdgeKind,
    pub target: usize,
}

/// A single NFA state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State {
    pub index: usize,
    pub accept: bool,
    pub edges: Vec<Edge>,
    pub epsilon_transitions: Vec<usize>,
    pub require_bol: bool,
    pub require_eol: bool,
    /// Group indices whose start position is recorded when the epsilon
    /// closure reaches this state at a given text position.
    pub enter_groups: Vec<u32>,
    /// Group indices whose end position is recorded when the epsilon
    /// closure reaches this state at a given text position.
    pub exit_groups: Vec<u32>,
}

impl State {
    pub(crate) fn new(index: usize) -> Self {
        State {
            index,
            ..Default::default()
        }
    }
}

/// The automaton produced by the [compiler](crate::compiler): a start
/// state, the full state pool, and the set of accepting indices (kept
/// alongside the per-state `accept` flag so the descriptor is self
/// contained without re-scanning `states`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Nfa {
    pub start: usize,
    pub accepts: Vec<usize>,
    pub state_count: usize,
    pub states: Vec<State>,
    /// Total number of capturing groups declared by the compiled pattern,
    /// including ones that a particular match may never cause to fire
    /// (e.g. group 2 in `(a)(b)?` against `"a"`). The matcher needs this to
    /// normalize a match's group list to a fixed width.
    pub group_count: u32,
}

impl Nfa {
    pub fn is_accepting(&self, state: usize) -> bool {
        self.states[state].accept
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use crate::{compiler, parser};

    #[test]
    fn nfa_round_trips_through_json() {
        let parsed = parser::parse(r"(\d+)-[a-z]*").unwrap();
        let nfa = compiler::compile(&parsed.expr, parsed.group_count).unwrap();

        let json = serde_json::to_string(&nfa).unwrap();
        let restored: super::Nfa = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, nfa);
        assert_eq!(restored.group_count, 1);
        assert_eq!(restored.state_count, nfa.state_count);
    }
}
