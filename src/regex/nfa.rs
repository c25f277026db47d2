use super::classes::{ClassId, ClassTable, EPSILON};
use super::stateid::StateId;
use std::{
    collections::{BTreeSet, VecDeque},
    iter,
    ops::{Index, IndexMut},
    sync::Arc,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaState {
    // Slot 0 holds the epsilon successors, slot k the successors on class k.
    // Always `classes + 1` long.
    table: Vec<BTreeSet<StateId>>,
    is_final: bool,
}

impl NfaState {
    fn empty(classes: usize) -> Self {
        Self {
            table: vec![BTreeSet::new(); classes + 1],
            is_final: false,
        }
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn epsilons(&self) -> &BTreeSet<StateId> {
        &self.table[EPSILON.index()]
    }

    /// The non-empty slots, epsilon first, then by ascending class.
    pub fn slots(&self) -> impl Iterator<Item = (ClassId, &BTreeSet<StateId>)> {
        self.table
            .iter()
            .enumerate()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(class, targets)| (ClassId::of(class), targets))
    }

    pub(crate) fn clear_epsilons(&mut self) {
        self.table[EPSILON.index()].clear();
    }
}

/// Returns the states one would get to from self on the class (or epsilon for class 0).
impl Index<ClassId> for NfaState {
    type Output = BTreeSet<StateId>;
    fn index(&self, class: ClassId) -> &Self::Output {
        &self.table[class.index()]
    }
}

impl IndexMut<ClassId> for NfaState {
    fn index_mut(&mut self, class: ClassId) -> &mut Self::Output {
        &mut self.table[class.index()]
    }
}

#[derive(Debug, Clone)]
pub struct NFA {
    /// Represents the nodes in the NFA.
    pub(crate) states: Vec<NfaState>,

    /// The classes every transition is labelled with.
    table: Arc<ClassTable>,

    pub(crate) start: StateId,

    /// The single accepting state of a freshly built NFA. Gone once epsilons are removed,
    /// since finality is then spread over several states.
    pub(crate) end: Option<StateId>,
}

impl Index<StateId> for NFA {
    type Output = NfaState;
    fn index(&self, StateId(index): StateId) -> &Self::Output {
        &self.states[index as usize]
    }
}

impl IndexMut<StateId> for NFA {
    fn index_mut(&mut self, StateId(index): StateId) -> &mut Self::Output {
        &mut self.states[index as usize]
    }
}

impl Index<(StateId, ClassId)> for NFA {
    type Output = BTreeSet<StateId>;
    fn index(&self, (id, class): (StateId, ClassId)) -> &Self::Output {
        &self[id][class]
    }
}

impl NFA {
    /// An NFA without states over `table`. Only useful as a starting point for construction.
    pub(crate) fn new(table: Arc<ClassTable>) -> Self {
        Self {
            states: vec![],
            table,
            start: StateId(0),
            end: None,
        }
    }

    pub fn table(&self) -> &Arc<ClassTable> {
        &self.table
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn end(&self) -> Option<StateId> {
        self.end
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

    pub fn has_epsilons(&self) -> bool {
        self.states.iter().any(|s| !s.epsilons().is_empty())
    }

    pub(crate) fn push_state(&mut self) -> StateId {
        let id = StateId::of(self.states.len());
        self.states.push(NfaState::empty(self.table.len()));
        id
    }

    pub(crate) fn push_connection(&mut self, from: StateId, to: StateId, class: ClassId) {
        debug_assert!(!class.is_epsilon());
        self[from][class].insert(to);
    }

    pub(crate) fn push_epsilon(&mut self, from: StateId, to: StateId) {
        self[from][EPSILON].insert(to);
    }

    pub(crate) fn set_final(&mut self, id: StateId, is_final: bool) {
        self[id].is_final = is_final;
    }

    /// States reachable from the start, in breadth first order. Successors are visited
    /// epsilon first, then by ascending class.
    pub fn reachable(&self) -> Vec<StateId> {
        if self.states.is_empty() {
            return vec![];
        }

        let mut seen = BTreeSet::new();
        let mut order = vec![];
        let mut queue: VecDeque<StateId> = iter::once(self.start).collect();
        seen.insert(self.start);

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for (_, targets) in self[id].slots() {
                for t in targets {
                    if seen.insert(*t) {
                        queue.push_back(*t);
                    }
                }
            }
        }
        order
    }

    /// Runs the automaton over `text`. On success returns the accepting states reached,
    /// otherwise the states it was in when it got stuck or ran out of input.
    pub fn find<T: AsRef<str>>(&self, text: T) -> Result<BTreeSet<StateId>, BTreeSet<StateId>> {
        if self.states.is_empty() {
            return Err(BTreeSet::new());
        }

        let mut current = self.epsilon_closure(iter::once(self.start).collect());
        for c in text.as_ref().chars() {
            let class = match self.table.class_of_input_char(c) {
                Some(class) => class,
                None => return Err(current),
            };
            let next = self.epsilon_closure(self.go(&current, class));
            if next.is_empty() {
                return Err(current);
            }
            current = next;
        }

        let ends: BTreeSet<StateId> = current
            .iter()
            .copied()
            .filter(|id| self.is_final(*id))
            .collect();
        if ends.is_empty() {
            Err(current)
        } else {
            Ok(ends)
        }
    }

    pub fn is_match<T: AsRef<str>>(&self, text: T) -> bool {
        self.find(text).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::classes::{CharacterRange, ClassTableBuilder};

    fn abc_table() -> Arc<ClassTable> {
        let mut builder = ClassTableBuilder::new();
        builder.add_char('a').add_char('b').add_char('c');
        Arc::new(builder.build())
    }

    #[test]
    fn empty() {
        // An NFA without states matches nothing, not even the empty string.
        let nfa = NFA::new(abc_table());
        assert!(nfa.find("").is_err());
        assert!(nfa.reachable().is_empty());
    }

    #[test]
    fn hand_built() {
        // >(0) -a-> (1) -ε-> ((2))
        //            \<-b-/
        let mut nfa = NFA::new(abc_table());
        let s0 = nfa.push_state();
        let s1 = nfa.push_state();
        let s2 = nfa.push_state();
        nfa.push_connection(s0, s1, ClassId(1));
        nfa.push_epsilon(s1, s2);
        nfa.push_connection(s2, s1, ClassId(2));
        nfa.set_final(s2, true);
        nfa.end = Some(s2);

        assert!(nfa.is_match("a"));
        assert!(nfa.is_match("ab"));
        assert!(nfa.is_match("abbb"));
        assert!(!nfa.is_match(""));
        assert!(!nfa.is_match("b"));
        assert!(!nfa.is_match("ac"));
        assert!(!nfa.is_match("ax"));
        assert_eq!(nfa.find("ab"), Ok(iter::once(s2).collect()));
        assert_eq!(nfa.reachable(), vec![s0, s1, s2]);
        assert!(nfa.has_epsilons());
    }

    #[test]
    fn slots_skip_empty() {
        let mut nfa = NFA::new(abc_table());
        let s0 = nfa.push_state();
        let s1 = nfa.push_state();
        nfa.push_connection(s0, s1, ClassId(3));
        nfa.push_connection(s0, s1, ClassId(3));
        nfa.push_epsilon(s0, s0);
        let slots: Vec<_> = nfa[s0].slots().map(|(c, t)| (c, t.len())).collect();
        assert_eq!(slots, vec![(EPSILON, 1), (ClassId(3), 1)]);
        assert_eq!(nfa.table().range_of(ClassId(3)), CharacterRange::single('c'));
    }
}
