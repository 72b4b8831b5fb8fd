use std::fmt;

/// A stored condition string that could not be split into rule tokens.
///
/// `offset` is the byte position of the first character no token could be
/// read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    offset: usize,
    expected: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, expected: impl Into<String>) -> Self {
        Self {
            offset,
            expected: expected.into(),
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// What the grammar was looking for, empty when it only knows that
    /// input was left over.
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// The unreadable remainder of `input`, starting at the offending token.
    #[must_use]
    pub fn remainder<'i>(&self, input: &'i str) -> &'i str {
        input.get(self.offset..).unwrap_or_default()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unreadable condition at byte {}", self.offset)?;
        if !self.expected.is_empty() {
            write!(f, ": {}", self.expected)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
