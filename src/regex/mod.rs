pub mod classes;
pub mod dfa;
mod dfa_minimize;
pub mod digraph;
mod epsilon_removal;
pub mod nfa;
mod nfa_to_dfa;
mod qc;
mod regex_to_nfa;
pub mod stateid;
pub mod syntax;

pub use classes::*;
pub use dfa::*;
pub use digraph::*;
pub use nfa::*;
pub use stateid::*;
pub use syntax::*;
