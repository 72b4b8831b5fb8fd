use thiserror::Error;

/// Why a block sequence does not form a valid enemy rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule is empty")]
    Empty,

    #[error("invalid atomic condition '{}'", run.join(" "))]
    InvalidAtomic { run: Vec<String> },

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("unexpected {found} after {after}")]
    UnexpectedToken { after: String, found: String },

    #[error("rule cannot end with {last}")]
    IncompleteRule { last: String },

    #[error(transparent)]
    Parse(#[from] crate::parse::ParseError),
}

/// Why a fleet list refused a drop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("unknown list {0}")]
    UnknownList(usize),

    #[error("nothing to drop")]
    EmptyPayload,

    #[error("'{name}' is already in the target list")]
    AlreadyPresent { name: String },

    #[error("'{name}' is already in a sibling list")]
    InSibling { name: String },

    #[error("list holds at most {max} entries")]
    OverCapacity { max: usize },

    #[error("internal moves are not allowed in this list")]
    InternalMoveDisabled,

    #[error("lists of different kinds cannot exchange entries")]
    KindMismatch,

    #[error("this list does not exchange entries with its siblings")]
    ExchangeDisabled,

    #[error("'{name}' is not in the source list")]
    NotInSource { name: String },

    #[error("index {index} out of range for list of {len}")]
    OutOfRange { index: usize, len: usize },
}
