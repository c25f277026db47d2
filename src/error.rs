/// Thompson construction met a character or range the class table cannot express.
///
/// The table is built from the same tree the NFA is built from, so this only happens
/// when the two were paired up by mistake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("character {0:?} is not a class of its own in the class table")]
    UnknownChar(char),
    #[error("range {from:#x}-{to:#x} does not line up with the class table")]
    UnknownRange { from: u32, to: u32 },
}

/// A combination of [`Options`](crate::Options) that does not describe a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("epsilon removal only applies to the NFA target")]
    EpsilonRemovalOnDfa,
    #[error("minimization only applies to the DFA target")]
    MinimizeOnNfa,
}
