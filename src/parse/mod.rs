mod error;
mod grammar;

pub use error::ParseError;

/// Split a stored condition string into its internal tokens.
///
/// Tokens are space separated on disk, but adjacent tokens such as
/// `BB+CL>=2` are split as well. The result feeds straight back into
/// [`compile_rule`](crate::compile_rule).
///
/// # Errors
///
/// Returns [`ParseError`] if the input contains anything that is not a rule
/// token.
pub fn parse_condition(input: &str) -> Result<Vec<String>, ParseError> {
    use winnow::Parser;
    grammar::condition
        .parse(input)
        .map(|tokens| tokens.into_iter().map(str::to_owned).collect())
        .map_err(|e| ParseError::new(e.offset(), e.inner().to_string()))
}
