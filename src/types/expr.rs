use std::fmt;

/// Comparison operators supported in atomic conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Parse an internal symbol value.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<CompareOp> {
        match symbol {
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Neq),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Gte),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            _ => None,
        }
    }

    /// Whether `count` satisfies this comparison against `quantity`.
    #[must_use]
    pub fn holds(self, count: u8, quantity: u8) -> bool {
        match self {
            CompareOp::Eq => count == quantity,
            CompareOp::Neq => count != quantity,
            CompareOp::Gt => count > quantity,
            CompareOp::Gte => count >= quantity,
            CompareOp::Lt => count < quantity,
            CompareOp::Lte => count <= quantity,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// One `TYPE (+ TYPE)* SYMBOL QUANTITY` comparison, e.g. `BB + CL > 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicCondition {
    pub ship_types: Vec<String>,
    pub op: CompareOp,
    pub quantity: u8,
}

impl fmt::Display for AtomicCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.ship_types.join(" + "), self.op, self.quantity)
    }
}

/// Token of the compiled rule stream. Every atomic condition collapses to
/// [`LogicalToken::Atomic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalToken {
    Atomic,
    And,
    Or,
    LParen,
    RParen,
}

/// The four-symbol alphabet the rule state machine runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenClass {
    Atomic,
    Logic,
    LParen,
    RParen,
}

impl LogicalToken {
    pub(crate) fn class(self) -> TokenClass {
        match self {
            LogicalToken::Atomic => TokenClass::Atomic,
            LogicalToken::And | LogicalToken::Or => TokenClass::Logic,
            LogicalToken::LParen => TokenClass::LParen,
            LogicalToken::RParen => TokenClass::RParen,
        }
    }

    /// Delimiter token for an internal value: `and`, `or` and the parens.
    /// `+` is not a delimiter.
    #[must_use]
    pub fn delimiter(value: &str) -> Option<LogicalToken> {
        match value {
            "and" => Some(LogicalToken::And),
            "or" => Some(LogicalToken::Or),
            "(" => Some(LogicalToken::LParen),
            ")" => Some(LogicalToken::RParen),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalToken::Atomic => write!(f, "ATOMIC"),
            LogicalToken::And => write!(f, "and"),
            LogicalToken::Or => write!(f, "or"),
            LogicalToken::LParen => write!(f, "("),
            LogicalToken::RParen => write!(f, ")"),
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenClass::Atomic => write!(f, "ATOMIC"),
            TokenClass::Logic => write!(f, "LOGIC"),
            TokenClass::LParen => write!(f, "LPAREN"),
            TokenClass::RParen => write!(f, "RPAREN"),
        }
    }
}
