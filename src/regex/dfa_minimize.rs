use std::sync::Arc;

use log::trace;

use super::{classes::ClassId, dfa::DFA, stateid::StateId};

/// Groups of states that are not (yet) known to be distinguishable.
struct Partition {
    groups: Vec<Vec<StateId>>,
    /// Group of every state, indexed by state.
    group_of: Vec<usize>,
}

impl Partition {
    /// Non-final states first, then final ones. Empty groups are left out.
    fn new(dfa: &DFA, states: &[StateId]) -> Self {
        let (finals, non_finals): (Vec<StateId>, Vec<StateId>) =
            states.iter().partition(|id| dfa.is_final(**id));

        let mut partition = Self {
            groups: vec![],
            group_of: vec![usize::MAX; dfa.len()],
        };
        for group in vec![non_finals, finals] {
            if !group.is_empty() {
                partition.push_group(group);
            }
        }
        partition
    }

    fn push_group(&mut self, group: Vec<StateId>) {
        let index = self.groups.len();
        for id in &group {
            self.group_of[id.index()] = index;
        }
        self.groups.push(group);
    }

    fn target_group(&self, dfa: &DFA, id: StateId, class: ClassId) -> Option<usize> {
        dfa[(id, class)].map(|to| self.group_of[to.index()])
    }

    /// Moves the members of `group` that disagree with its first member on `class` into
    /// a new group. Returns whether anything moved.
    fn split(&mut self, dfa: &DFA, group: usize, class: ClassId) -> bool {
        let members = &self.groups[group];
        let expected = self.target_group(dfa, members[0], class);

        let (stay, leave): (Vec<StateId>, Vec<StateId>) = members
            .iter()
            .partition(|id| self.target_group(dfa, **id, class) == expected);

        if leave.is_empty() {
            return false;
        }

        trace!(
            "split group {} on class {}: {:?} / {:?}",
            group,
            class.0,
            stay,
            leave
        );
        self.groups[group] = stay;
        self.push_group(leave);
        true
    }
}

impl DFA {
    /// Merges indistinguishable states (Moore's algorithm).
    ///
    /// The result recognizes the same strings, shares the class table and never has
    /// more states. Its start is the group of the old start.
    pub fn minimize(&self) -> DFA {
        let table = Arc::clone(self.table());
        let mut minimized = DFA::new(Arc::clone(&table));
        let states = self.reachable();
        if states.is_empty() {
            return minimized;
        }

        let mut partition = Partition::new(self, &states);

        loop {
            let mut changed = false;
            let mut group = 0;
            // Groups created during a pass are refined in the same pass.
            while group < partition.groups.len() {
                if partition.groups[group].len() > 1 {
                    for class in table.classes() {
                        if partition.split(self, group, class) {
                            changed = true;
                            break;
                        }
                    }
                }
                group += 1;
            }
            if !changed {
                break;
            }
        }

        // One new state per group, created on first reference while walking the old
        // states from the start.
        let mut group_state: Vec<Option<StateId>> = vec![None; partition.groups.len()];
        let mut state_of = |minimized: &mut DFA, id: StateId| {
            let group = partition.group_of[id.index()];
            match group_state[group] {
                Some(state) => state,
                None => {
                    let state = minimized.push_state(self.is_final(id));
                    group_state[group] = Some(state);
                    state
                }
            }
        };

        for id in states {
            let from = state_of(&mut minimized, id);
            for (class, to) in self[id].transitions() {
                let to = state_of(&mut minimized, to);
                minimized.set_transition(from, class, to);
            }
        }

        log::debug!("minimization: {} -> {} states", self.len(), minimized.len());
        minimized
    }
}

#[cfg(test)]
mod tests {
    use crate::regex::{dfa::DFA, nfa::NFA, qc::RegexQtCase};

    fn minimal(pattern: &str) -> DFA {
        DFA::from(NFA::regex(pattern).unwrap()).minimize()
    }

    #[test]
    fn minimal_state_counts() {
        for (pattern, count) in &[
            ("(abc)*abb+", 4),
            ("(from)|(frog)", 5),
            ("(a|b)*abb*", 3),
            ("((a|b)*)|([abc]+)|(abb*)", 1),
            ("abcd", 5),
            ("", 1),
        ] {
            assert_eq!(minimal(pattern).len(), *count, "{}", pattern);
        }
    }

    #[test]
    fn start_stays_first() {
        let dfa = minimal("(a|b)*abb*");
        assert!(!dfa.is_final(dfa.start()));
        assert!(dfa.is_match("ab"));
        assert!(dfa.is_match("babbb"));
        assert!(!dfa.is_match("ba"));
    }

    #[test]
    fn minimizing_twice_changes_nothing() {
        let once = minimal("(abc)*abb+");
        let twice = once.minimize();
        assert_eq!(once.len(), twice.len());
        for case in &["abb", "abcabbb", "abc", "ab"] {
            assert_eq!(once.is_match(case), twice.is_match(case), "{}", case);
        }
    }

    #[test]
    fn empty_dfa() {
        let dfa = DFA::new(Default::default());
        assert!(dfa.minimize().is_empty());
    }

    #[quickcheck]
    fn same_language_fewer_states(case: RegexQtCase) -> bool {
        let dfa = DFA::from(&case.nfa);
        let min = dfa.minimize();
        min.len() <= dfa.len()
            && case.matches.iter().all(|m| min.is_match(m))
            && case.non_matches.iter().all(|m| !min.is_match(m))
    }
}
