//! Turns regular expressions into automata: a Thompson NFA, optionally without epsilon
//! edges, or a DFA built by subset construction and optionally minimized.
//!
//! Every automaton is labelled with the classes of a [`ClassTable`], disjoint character
//! ranges cut along every range the expression mentions.
//!
//! ```
//! use regex_fa::{DFA, NFA};
//!
//! let nfa = NFA::regex("a*abb").unwrap();
//! let dfa = DFA::from(&nfa).minimize();
//! assert!(dfa.is_match("aabb"));
//! assert!(!dfa.is_match("abbb"));
//! ```

#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;

mod compiler;
mod error;
pub mod regex;

pub use compiler::{compile, compile_regex, Automaton, Options, Target};
pub use error::{BuildError, OptionsError};
pub use regex::{
    CharacterRange, ClassId, ClassSpan, ClassTable, ClassTableBuilder, Digraph, Edge, Label,
    Node, Regex, StateId, UnsupportedFeature, DEFAULT_SIZE_LIMIT, DFA, EPSILON, NFA,
};
