use std::sync::Arc;

use crate::error::OptionsError;
use crate::regex::{ClassTable, Digraph, Regex, DEFAULT_SIZE_LIMIT, DFA, NFA};

/// The kind of automaton [`compile`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Nfa,
    Dfa,
}

impl Default for Target {
    fn default() -> Self {
        Target::Dfa
    }
}

/// Which stages of the pipeline run.
///
/// ```
/// use regex_fa::Options;
///
/// let options = Options::dfa().minimize(true);
/// assert!(options.validate().is_ok());
/// assert!(Options::nfa().minimize(true).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub target: Target,
    /// Only for [`Target::Nfa`].
    pub remove_epsilons: bool,
    /// Only for [`Target::Dfa`].
    pub minimize: bool,
    /// Nodes counted repetitions may expand to, see [`Regex::parse_with_limit`].
    pub size_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            target: Target::default(),
            remove_epsilons: false,
            minimize: false,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl Options {
    pub fn nfa() -> Self {
        Self {
            target: Target::Nfa,
            ..Self::default()
        }
    }

    pub fn dfa() -> Self {
        Self {
            target: Target::Dfa,
            ..Self::default()
        }
    }

    pub fn remove_epsilons(mut self, remove: bool) -> Self {
        self.remove_epsilons = remove;
        self
    }

    pub fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        match self.target {
            Target::Nfa if self.minimize => Err(OptionsError::MinimizeOnNfa),
            Target::Dfa if self.remove_epsilons => Err(OptionsError::EpsilonRemovalOnDfa),
            _ => Ok(()),
        }
    }
}

/// The result of [`compile`].
#[derive(Debug, Clone)]
pub enum Automaton {
    Nfa(NFA),
    Dfa(DFA),
}

impl Automaton {
    /// Whether the whole of `text` is matched.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Automaton::Nfa(nfa) => nfa.is_match(text),
            Automaton::Dfa(dfa) => dfa.is_match(text),
        }
    }

    pub fn table(&self) -> &Arc<ClassTable> {
        match self {
            Automaton::Nfa(nfa) => nfa.table(),
            Automaton::Dfa(dfa) => dfa.table(),
        }
    }

    /// Number of states, reachable or not.
    pub fn len(&self) -> usize {
        match self {
            Automaton::Nfa(nfa) => nfa.len(),
            Automaton::Dfa(dfa) => dfa.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn digraph(&self) -> Digraph {
        match self {
            Automaton::Nfa(nfa) => Digraph::from(nfa),
            Automaton::Dfa(dfa) => Digraph::from(dfa),
        }
    }
}

/// Runs the pipeline on an already lowered expression.
pub fn compile_regex(regex: &Regex, options: &Options) -> anyhow::Result<Automaton> {
    options.validate()?;

    let table = Arc::new(regex.class_table());
    log::debug!("{} classes: {}", table.len(), table);

    let mut nfa = NFA::from_regex(regex, table)?;
    let automaton = match options.target {
        Target::Nfa => {
            if options.remove_epsilons {
                nfa.remove_epsilons();
            }
            Automaton::Nfa(nfa)
        }
        Target::Dfa => {
            let dfa = DFA::from(nfa);
            Automaton::Dfa(if options.minimize { dfa.minimize() } else { dfa })
        }
    };
    Ok(automaton)
}

/// Parses `pattern` and runs the pipeline `options` describe.
///
/// ```
/// use regex_fa::{compile, Options};
///
/// let dfa = compile("colou?r", &Options::dfa().minimize(true)).unwrap();
/// assert!(dfa.is_match("color"));
/// assert!(!dfa.is_match("colouur"));
/// ```
pub fn compile(pattern: &str, options: &Options) -> anyhow::Result<Automaton> {
    let regex = Regex::parse_with_limit(pattern, options.size_limit)?;
    log::debug!("compiling {:?} with {:?}", pattern, options);
    compile_regex(&regex, options)
}
