#[cfg(test)]
use crate::regex::{syntax::Regex, NFA};
#[cfg(test)]
use quickcheck::Arbitrary;
#[cfg(test)]
use std::{collections::HashSet, iter, sync::Arc};
#[cfg(test)]
const MAX_LIT_LEN: usize = 2; // How many chars the string literals should be.
#[cfg(test)]
const DEBTH: usize = 4; // How deep the tree should be.
#[cfg(test)]
const ALPHABET: &[char] = &['a', 'b', 'c'];
#[cfg(test)]
const PROBE_LEN: usize = 4; // Longest string checked against the match set.

/*
This file contains code for generating testcases for quickcheck.
*/
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum RegexQt {
    Lit(String),
    Or { a: Box<RegexQt>, b: Box<RegexQt> },
    FollowedBy { a: Box<RegexQt>, b: Box<RegexQt> },
    Optional(Box<RegexQt>),
}

#[cfg(test)]
impl RegexQt {
    fn new(g: &mut quickcheck::Gen, level: usize) -> Self {
        if level == 0 {
            let len = usize::arbitrary(g) % (MAX_LIT_LEN + 1);
            return RegexQt::Lit(
                (0..len)
                    .map(|_| *g.choose(ALPHABET).unwrap())
                    .collect(),
            );
        }

        let choice = g.choose(&[0, 1, 2]).unwrap();
        match choice {
            0 => RegexQt::Or {
                a: Box::new(RegexQt::new(g, level - 1)),
                b: Box::new(RegexQt::new(g, level - 1)),
            },
            1 => RegexQt::FollowedBy {
                a: Box::new(RegexQt::new(g, level - 1)),
                b: Box::new(RegexQt::new(g, level - 1)),
            },
            2 => RegexQt::Optional(Box::new(RegexQt::new(g, level - 1))),
            _ => unreachable!("not a valid choice"),
        }
    }

    fn build_matches(&self) -> HashSet<String> {
        match self {
            RegexQt::Lit(x) => iter::once(x.to_string()).collect(),
            RegexQt::Or { a, b } => {
                let mut res = a.build_matches();
                res.extend(b.build_matches());
                res
            }
            RegexQt::FollowedBy { a, b } => {
                let abm = a.build_matches();
                let bbm = b.build_matches();
                let mut res = HashSet::with_capacity(abm.len() * bbm.len());
                for am in abm.iter() {
                    for bm in bbm.iter() {
                        let mut s = String::with_capacity(am.len() + bm.len());
                        s.push_str(am.as_str());
                        s.push_str(bm.as_str());
                        res.insert(s);
                    }
                }
                res
            }
            RegexQt::Optional(a) => {
                let mut res = a.build_matches();
                res.insert(String::new());
                res
            }
        }
    }

    fn build_regex(&self) -> Regex {
        match self {
            RegexQt::Lit(x) => Regex::literal(x),
            RegexQt::Or { a, b } => Regex::Alternation(vec![a.build_regex(), b.build_regex()]),
            RegexQt::FollowedBy { a, b } => Regex::Concat(vec![a.build_regex(), b.build_regex()]),
            RegexQt::Optional(a) => Regex::Optional(Box::new(a.build_regex())),
        }
    }
}

/// Every string over the alphabet (plus one letter outside it) up to `PROBE_LEN` chars.
#[cfg(test)]
fn near_misses() -> Vec<String> {
    let mut letters = ALPHABET.to_vec();
    letters.push('d');

    let mut all = vec![String::new()];
    let mut last = vec![String::new()];
    for _ in 0..PROBE_LEN {
        last = last
            .iter()
            .flat_map(|s| letters.iter().map(move |c| format!("{}{}", s, c)))
            .collect();
        all.extend(last.iter().cloned());
    }
    all
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RegexQtCase {
    pub kind: RegexQt,
    pub matches: HashSet<String>,
    /// Short strings the regex must reject.
    pub non_matches: Vec<String>,
    pub nfa: NFA,
}

#[cfg(test)]
impl Arbitrary for RegexQtCase {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let limit = DEBTH;
        let mut level = g.size();
        level = if level <= limit { level } else { limit };

        let kind = RegexQt::new(g, level);
        let matches = kind.build_matches();
        let non_matches = near_misses()
            .into_iter()
            .filter(|s| !matches.contains(s))
            .collect();

        let regex = kind.build_regex();
        let table = Arc::new(regex.class_table());
        let nfa = NFA::from_regex(&regex, table).unwrap();

        Self {
            kind,
            matches,
            non_matches,
            nfa,
        }
    }
}
