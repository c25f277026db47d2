use std::fmt;

/// Index of a state inside the arena of an [`NFA`](super::NFA) or [`DFA`](super::DFA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u32);

impl StateId {
    pub fn of(id: usize) -> Self {
        assert!(id < u32::MAX as usize);
        Self(id as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}
