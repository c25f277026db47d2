// http://www.cs.nuim.ie/~jpower/Courses/Previous/parsing/node9.html

use super::*;
use classes::ClassId;
use dfa::DFA;
use nfa::NFA;
use stateid::StateId;
use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    iter,
    sync::Arc,
};

impl NFA {
    /// Goes through all the states in 'from' and adds all the states one can get to by using epsilon
    /// transitions.
    pub(crate) fn epsilon_closure(&self, from: BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut stack: Vec<_> = from.into_iter().collect();
        let mut states = BTreeSet::new();
        while let Some(q) = stack.pop() {
            states.insert(q);
            for q_e in self[q].epsilons().iter() {
                if states.insert(*q_e) {
                    stack.push(*q_e)
                }
            }
        }
        states
    }

    /// The states one gets to from any of `states` on `class`, without following epsilons.
    pub(crate) fn go(&self, states: &BTreeSet<StateId>, class: ClassId) -> BTreeSet<StateId> {
        states
            .iter()
            .flat_map(|id| self[(*id, class)].iter().copied())
            .collect()
    }
}

impl From<&NFA> for DFA {
    fn from(nfa: &NFA) -> Self {
        let table = Arc::clone(nfa.table());
        let mut dfa = DFA::new(Arc::clone(&table));
        if nfa.is_empty() {
            return dfa;
        }

        let mut nfa_to_dfa: BTreeMap<BTreeSet<StateId>, StateId> = BTreeMap::new();
        let is_final = |ids: &BTreeSet<StateId>| ids.iter().any(|id| nfa.is_final(*id));

        // Create the start state of the DFA by taking the epsilon_closure of the start state of the NFA.
        let start_ids = nfa.epsilon_closure(iter::once(nfa.start()).collect());
        let dfa_id = dfa.push_state(is_final(&start_ids));
        nfa_to_dfa.insert(start_ids.clone(), dfa_id);

        let mut queue: VecDeque<BTreeSet<StateId>> = iter::once(start_ids).collect();

        while let Some(nfa_ids) = queue.pop_front() {
            let dfa_id = nfa_to_dfa[&nfa_ids];

            for class in table.classes() {
                // `nfa_ids` is already closed, so the plain move is enough.
                let move_states = nfa.go(&nfa_ids, class);
                if move_states.is_empty() {
                    continue;
                }

                let move_states_e = nfa.epsilon_closure(move_states);

                let dfa_e_id = match nfa_to_dfa.get(&move_states_e) {
                    Some(dfa_e_id) => *dfa_e_id,
                    None => {
                        let dfa_e_id = dfa.push_state(is_final(&move_states_e));
                        log::trace!("new subset {}: {:?}", dfa_e_id, move_states_e);
                        nfa_to_dfa.insert(move_states_e.clone(), dfa_e_id);
                        queue.push_back(move_states_e);
                        dfa_e_id
                    }
                };

                dfa.set_transition(dfa_id, class, dfa_e_id);
            }
        }

        log::debug!(
            "subset construction: {} nfa states -> {} dfa states",
            nfa.len(),
            dfa.len()
        );
        dfa
    }
}

impl From<NFA> for DFA {
    fn from(nfa: NFA) -> Self {
        DFA::from(&nfa)
    }
}

#[cfg(test)]
mod tests {

    use crate::regex::qc::RegexQtCase;
    use crate::regex::{dfa::DFA, NFA};

    #[test]
    fn start_is_closure_of_nfa_start() {
        let dfa: DFA = NFA::regex("a*").unwrap().into();
        assert!(dfa.is_final(dfa.start()));
        // Reading an `a` leads back to the same closure.
        assert_eq!(dfa.len(), 1);
    }

    #[test]
    fn fixtures() {
        let dfa: DFA = NFA::regex("a*abb").unwrap().into();
        for case in &["abb", "aabb", "aaabb"] {
            assert!(dfa.is_match(case), "{}", case);
        }
        for case in &["", "ab", "bb", "abbb"] {
            assert!(!dfa.is_match(case), "{}", case);
        }
    }

    #[test]
    fn same_subset_from_epsilon_free_nfa() {
        let mut nfa = NFA::regex("(a|b)*abb").unwrap();
        let dfa = DFA::from(&nfa);
        nfa.remove_epsilons();
        let free = DFA::from(&nfa);
        for case in &["abb", "babb", "aabb", "ab", "abba", ""] {
            assert_eq!(dfa.is_match(case), free.is_match(case), "{}", case);
        }
    }

    #[quickcheck]
    fn qc_nfa_to_dfa(case: RegexQtCase) -> bool {
        let dfa = DFA::from(&case.nfa);

        for x in case.matches.iter() {
            if !dfa.is_match(x) || !case.nfa.is_match(x) {
                println!("{:?} should match {:?}", case.kind, x);
                return false;
            }
        }
        for x in case.non_matches.iter() {
            if dfa.is_match(x) {
                println!("{:?} should not match {:?}", case.kind, x);
                return false;
            }
        }

        true
    }
}
