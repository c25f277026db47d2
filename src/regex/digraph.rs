use std::{collections::HashMap, fmt};

use super::{classes::CharacterRange, dfa::DFA, nfa::NFA, stateid::StateId};

/// What an edge is taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Epsilon,
    Range(CharacterRange),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => write!(f, "ε"),
            Label::Range(range) => write!(f, "{}", range),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub label: Label,
    /// Index into [`Digraph::nodes`].
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub is_final: bool,
    pub edges: Vec<Edge>,
}

/// Renderer facing view of an automaton: the states reachable from the start, numbered
/// in breadth first order so that node 0 is the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digraph {
    pub name: &'static str,
    pub nodes: Vec<Node>,
}

impl Digraph {
    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }
}

fn numbering(order: &[StateId]) -> HashMap<StateId, usize> {
    order.iter().enumerate().map(|(i, id)| (*id, i)).collect()
}

impl From<&NFA> for Digraph {
    fn from(nfa: &NFA) -> Self {
        let order = nfa.reachable();
        let index = numbering(&order);
        let table = nfa.table();

        let nodes = order
            .iter()
            .map(|id| {
                let state = &nfa[*id];
                let edges = state
                    .slots()
                    .flat_map(|(class, targets)| {
                        let label = if class.is_epsilon() {
                            Label::Epsilon
                        } else {
                            Label::Range(table.range_of(class))
                        };
                        targets.iter().map(move |t| (label, *t))
                    })
                    .map(|(label, t)| Edge {
                        label,
                        to: index[&t],
                    })
                    .collect();
                Node {
                    is_final: state.is_final(),
                    edges,
                }
            })
            .collect();

        Digraph { name: "NFA", nodes }
    }
}

impl From<&DFA> for Digraph {
    fn from(dfa: &DFA) -> Self {
        let order = dfa.reachable();
        let index = numbering(&order);
        let table = dfa.table();

        let nodes = order
            .iter()
            .map(|id| {
                let state = &dfa[*id];
                Node {
                    is_final: state.is_final(),
                    edges: state
                        .transitions()
                        .map(|(class, to)| Edge {
                            label: Label::Range(table.range_of(class)),
                            to: index[&to],
                        })
                        .collect(),
                }
            })
            .collect();

        Digraph { name: "DFA", nodes }
    }
}
