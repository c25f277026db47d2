use std::collections::BTreeSet;

use super::{classes::ClassId, nfa::NFA, stateid::StateId};

/// What a state inherits from its epsilon closure.
struct Inherited {
    id: StateId,
    transitions: Vec<(ClassId, StateId)>,
    is_final: bool,
}

impl NFA {
    /// States reachable from `id` through epsilon edges only, excluding `id` unless it
    /// lies on an epsilon cycle through itself.
    fn strict_epsilon_closure(&self, id: StateId) -> BTreeSet<StateId> {
        let mut visited: BTreeSet<StateId> = BTreeSet::new();
        visited.insert(id);
        let mut closure = BTreeSet::new();
        let mut stack: Vec<StateId> = self[id].epsilons().iter().copied().collect();

        while let Some(q) = stack.pop() {
            closure.insert(q);
            if visited.insert(q) {
                stack.extend(self[q].epsilons().iter().copied());
            }
        }
        closure
    }

    /// Rewrites the NFA so it has no epsilon edges and accepts the same language.
    ///
    /// Every state reachable from the start takes over the transitions and finality of
    /// its epsilon closure. Closures are all computed on the unmodified graph before any
    /// state changes. Afterwards there is no single end state any more.
    pub fn remove_epsilons(&mut self) {
        let reachable = self.reachable();

        let inherited: Vec<Inherited> = reachable
            .iter()
            .map(|&id| {
                let closure = self.strict_epsilon_closure(id);
                let mut transitions = vec![];
                let mut is_final = self.is_final(id);
                for q in closure {
                    is_final |= self.is_final(q);
                    for (class, targets) in self[q].slots() {
                        if class.is_epsilon() {
                            continue;
                        }
                        transitions.extend(targets.iter().map(|t| (class, *t)));
                    }
                }
                Inherited {
                    id,
                    transitions,
                    is_final,
                }
            })
            .collect();

        for Inherited {
            id,
            transitions,
            is_final,
        } in inherited
        {
            for (class, to) in transitions {
                self.push_connection(id, to, class);
            }
            self.set_final(id, is_final);
            self[id].clear_epsilons();
        }

        self.end = None;
        log::debug!(
            "epsilon removal: {} of {} states still reachable",
            self.reachable().len(),
            self.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::regex::nfa::NFA;

    fn both(pattern: &str) -> (NFA, NFA) {
        let nfa = NFA::regex(pattern).unwrap();
        let mut free = nfa.clone();
        free.remove_epsilons();
        (nfa, free)
    }

    #[test]
    fn no_epsilons_left() {
        let (_, free) = both("(a|b)*abb*");
        assert!(!free.has_epsilons());
        assert!(free.end().is_none());
    }

    #[test]
    fn same_language() {
        let inputs = ["", "a", "b", "ab", "abb", "aabb", "babb", "abbb", "ba", "c"];
        for pattern in &["(a|b)*abb*", "a*abb", "(a+b)*", "a?b?", "", "((a|b)*)|(abb*)"] {
            let (nfa, free) = both(pattern);
            for input in &inputs {
                assert_eq!(
                    nfa.is_match(input),
                    free.is_match(input),
                    "{} on {:?}",
                    pattern,
                    input
                );
            }
        }
    }

    #[test]
    fn start_becomes_final_for_nullable_patterns() {
        let (_, free) = both("a*");
        assert!(free.is_final(free.start()));

        let (_, free) = both("a+");
        assert!(!free.is_final(free.start()));
    }

    #[test]
    fn epsilon_cycle() {
        let (_, free) = both("(a*)*");
        assert!(free.is_match(""));
        assert!(free.is_match("aaa"));
        assert!(!free.is_match("b"));
    }

    #[quickcheck]
    fn agrees_with_epsilon_nfa(case: crate::regex::qc::RegexQtCase) -> bool {
        let mut free = case.nfa.clone();
        free.remove_epsilons();
        case.matches.iter().all(|m| free.is_match(m))
            && case.non_matches.iter().all(|m| !free.is_match(m))
    }
}
