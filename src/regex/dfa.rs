use crate::regex::{
    classes::{ClassId, ClassTable},
    stateid::StateId,
};
use std::{
    collections::VecDeque,
    ops::{Index, IndexMut},
    sync::Arc,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    // Slot k - 1 holds the target on class k. `None` rejects.
    table: Vec<Option<StateId>>,
    is_final: bool,
}

impl DfaState {
    fn empty(classes: usize, is_final: bool) -> Self {
        Self {
            table: vec![None; classes],
            is_final,
        }
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Outgoing transitions by ascending class.
    pub fn transitions(&self) -> impl Iterator<Item = (ClassId, StateId)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(i, to)| to.map(|to| (ClassId::of(i + 1), to)))
    }
}

impl Index<ClassId> for DfaState {
    type Output = Option<StateId>;
    fn index(&self, class: ClassId) -> &Self::Output {
        assert!(!class.is_epsilon(), "a dfa has no epsilon transitions");
        &self.table[class.index() - 1]
    }
}

#[derive(Debug, Clone)]
pub struct DFA {
    /// The states are the nodes of the DFA. The first one is the start.
    pub(crate) states: Vec<DfaState>,
    table: Arc<ClassTable>,
}

impl DFA {
    pub fn new(table: Arc<ClassTable>) -> Self {
        Self {
            states: vec![],
            table,
        }
    }

    pub fn table(&self) -> &Arc<ClassTable> {
        &self.table
    }

    pub fn start(&self) -> StateId {
        StateId(0)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn is_final(&self, id: StateId) -> bool {
        self[id].is_final
    }

    /// Create a new state without transitions and returns its id.
    pub(crate) fn push_state(&mut self, is_final: bool) -> StateId {
        let id = StateId::of(self.states.len());
        self.states
            .push(DfaState::empty(self.table.len(), is_final));
        id
    }

    pub(crate) fn set_transition(&mut self, from: StateId, class: ClassId, to: StateId) {
        assert!(!class.is_epsilon(), "a dfa has no epsilon transitions");
        self[from].table[class.index() - 1] = Some(to);
    }

    /// States reachable from the start, in breadth first order by ascending class.
    pub fn reachable(&self) -> Vec<StateId> {
        if self.states.is_empty() {
            return vec![];
        }

        let mut seen = vec![false; self.states.len()];
        let mut order = vec![];
        let mut queue = VecDeque::new();
        queue.push_back(self.start());
        seen[self.start().index()] = true;

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for (_, to) in self[id].transitions() {
                if !seen[to.index()] {
                    seen[to.index()] = true;
                    queue.push_back(to);
                }
            }
        }
        order
    }

    /// Runs the automaton over `input`. Returns the accepting state it ends in, or the
    /// state it got stuck in (`None` when there are no states at all).
    pub fn find<T: AsRef<str>>(&self, input: T) -> Result<StateId, Option<StateId>> {
        if self.states.is_empty() {
            return Err(None);
        }

        let mut current = self.start();
        for c in input.as_ref().chars() {
            let next = self
                .table
                .class_of_input_char(c)
                .and_then(|class| self[(current, class)]);
            match next {
                Some(next) => current = next,
                None => return Err(Some(current)),
            }
        }

        if self.is_final(current) {
            Ok(current)
        } else {
            Err(Some(current))
        }
    }

    pub fn is_match<T: AsRef<str>>(&self, input: T) -> bool {
        self.find(input).is_ok()
    }
}

impl Index<StateId> for DFA {
    type Output = DfaState;
    fn index(&self, index: StateId) -> &Self::Output {
        &self.states[index.0 as usize]
    }
}

impl IndexMut<StateId> for DFA {
    fn index_mut(&mut self, index: StateId) -> &mut Self::Output {
        &mut self.states[index.0 as usize]
    }
}

impl Index<(StateId, ClassId)> for DFA {
    type Output = Option<StateId>;

    fn index(&self, (id, class): (StateId, ClassId)) -> &Self::Output {
        &self[id][class]
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::regex::{classes::EPSILON, nfa::NFA};

    #[test]
    fn empty() {
        let empty = DFA::new(Arc::new(ClassTable::default()));
        let x = empty.find("");
        assert!(x.is_err());
        assert!(x.unwrap_err().is_none());
    }

    #[test]
    fn literal() {
        let nfa = NFA::regex("hello").unwrap();
        let dfa: DFA = nfa.into();
        assert!(dfa.find("hello").is_ok());
        assert!(dfa.find("ello").is_err());
        assert!(dfa.find("hhello").is_err());
        assert!(dfa.find("helloo").is_err());
        assert!(dfa.find("helo").is_err());
        assert!(dfa.find("hxllo").is_err());
        assert!(dfa.find("hell").is_err());
        assert!(dfa.find("helln").is_err());
    }

    #[test]
    fn empty_literal() {
        let dfa: DFA = NFA::regex("").unwrap().into();
        assert!(dfa.find("").is_ok());
        assert!(dfa.find(" ").is_err());
    }

    #[test]
    fn simple_or() {
        let dfa: DFA = NFA::regex("a|b").unwrap().into();

        assert!(dfa.find("a").is_ok());
        assert!(dfa.find("b").is_ok());
        assert!(dfa.find("c").is_err());
        assert!(dfa.find("").is_err());
    }

    #[test]
    fn simple_or_eq() {
        let dfa: DFA = NFA::regex("a|a").unwrap().into();

        assert!(dfa.find("a").is_ok());
        assert!(dfa.find("b").is_err());
        assert!(dfa.find("").is_err());
    }

    #[test]
    fn simple_or_empty() {
        let dfa: DFA = NFA::regex("a|").unwrap().into();

        assert!(dfa.find("a").is_ok());
        assert!(dfa.find("b").is_err());
        assert!(dfa.find("").is_ok());
    }

    #[test]
    fn stuck_state_is_reported() {
        let dfa: DFA = NFA::regex("ab").unwrap().into();
        let after_a = dfa[(dfa.start(), ClassId(1))].unwrap();
        assert_eq!(dfa.find("aa"), Err(Some(after_a)));
        assert_eq!(dfa.find("x"), Err(Some(dfa.start())));
    }

    #[test]
    #[should_panic(expected = "a dfa has no epsilon transitions")]
    fn epsilon_lookup() {
        let dfa: DFA = NFA::regex("a").unwrap().into();
        let _ = dfa[(dfa.start(), EPSILON)];
    }

    #[test]
    fn transitions_are_by_class() {
        let dfa: DFA = NFA::regex("[a-c]x").unwrap().into();
        let start: Vec<_> = dfa[dfa.start()].transitions().map(|(c, _)| c).collect();
        assert_eq!(start, vec![ClassId(1)]);
        assert_eq!(dfa.reachable().len(), dfa.len());
    }
}
