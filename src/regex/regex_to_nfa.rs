use std::sync::Arc;

use crate::error::BuildError;
use crate::regex::{
    classes::{CharacterRange, ClassTable},
    nfa::NFA,
    stateid::StateId,
    syntax::Regex,
};

impl NFA {
    /// Parses `pattern` and builds an NFA over the classes it mentions.
    pub fn regex(pattern: &str) -> anyhow::Result<NFA> {
        let regex = Regex::parse(pattern)?;
        let table = Arc::new(regex.class_table());
        Ok(NFA::from_regex(&regex, table)?)
    }

    /// Thompson construction. `table` must contain every range of `regex`, which
    /// [`Regex::class_table`] guarantees.
    pub fn from_regex(regex: &Regex, table: Arc<ClassTable>) -> Result<NFA, BuildError> {
        let mut nfa = NFA::new(Arc::clone(&table));
        let (start, end) = nfa.fragment_of(&table, regex)?;
        nfa.start = start;
        nfa.end = Some(end);

        log::debug!(
            "thompson construction: {} states over {} classes",
            nfa.len(),
            table.len()
        );
        Ok(nfa)
    }

    /// Two fresh states, the second one final.
    fn fragment(&mut self) -> (StateId, StateId) {
        let start = self.push_state();
        let end = self.push_state();
        self.set_final(end, true);
        (start, end)
    }

    fn connect_range(
        &mut self,
        table: &ClassTable,
        from: StateId,
        to: StateId,
        range: CharacterRange,
    ) -> Result<(), BuildError> {
        let span = table
            .class_span_of_exact_range(range.from, range.to)
            .ok_or(BuildError::UnknownRange {
                from: range.from,
                to: range.to,
            })?;
        for class in span.iter() {
            self.push_connection(from, to, class);
        }
        Ok(())
    }

    fn fragment_of(
        &mut self,
        table: &ClassTable,
        regex: &Regex,
    ) -> Result<(StateId, StateId), BuildError> {
        match regex {
            Regex::Char(c) => {
                let class = table
                    .class_of_exact_char(*c)
                    .ok_or(BuildError::UnknownChar(*c))?;
                let (start, end) = self.fragment();
                self.push_connection(start, end, class);
                Ok((start, end))
            }
            Regex::Range(range) => {
                let (start, end) = self.fragment();
                self.connect_range(table, start, end, *range)?;
                Ok((start, end))
            }
            Regex::RangeList(ranges) => {
                let (start, end) = self.fragment();
                if ranges.is_empty() {
                    self.push_epsilon(start, end);
                }
                for range in ranges {
                    self.connect_range(table, start, end, *range)?;
                }
                Ok((start, end))
            }
            //           ε           ε           ε
            // >(start) --> [E1] --> ... --> [En] --> ((end))
            Regex::Concat(items) => {
                let (start, end) = self.fragment();
                let mut last = start;
                for item in items {
                    let (item_start, item_end) = self.fragment_of(table, item)?;
                    self.set_final(item_end, false);
                    self.push_epsilon(last, item_start);
                    last = item_end;
                }
                self.push_epsilon(last, end);
                Ok((start, end))
            }
            //    /–ε–> [E1] –ε–\
            // >(start)         ((end))
            //    \–ε–> [En] –ε–/
            Regex::Alternation(items) => {
                let (start, end) = self.fragment();
                if items.is_empty() {
                    self.push_epsilon(start, end);
                }
                for item in items {
                    let (item_start, item_end) = self.fragment_of(table, item)?;
                    self.set_final(item_end, false);
                    self.push_epsilon(start, item_start);
                    self.push_epsilon(item_end, end);
                }
                Ok((start, end))
            }
            Regex::Empty => {
                let (start, end) = self.fragment();
                self.push_epsilon(start, end);
                Ok((start, end))
            }
            Regex::Optional(inner) => {
                let (start, end) = self.fragment_of(table, inner)?;
                self.push_epsilon(start, end);
                Ok((start, end))
            }
            Regex::ZeroOrMore(inner) => {
                let (start, end) = self.fragment_of(table, inner)?;
                self.push_epsilon(start, end);
                self.push_epsilon(end, start);
                Ok((start, end))
            }
            Regex::OneOrMore(inner) => {
                let (start, end) = self.fragment_of(table, inner)?;
                self.push_epsilon(end, start);
                Ok((start, end))
            }
        }
    }
}
