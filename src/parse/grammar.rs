use winnow::ascii::multispace0;
use winnow::combinator::{alt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

// -- Tokens -----------------------------------------------------------------

fn symbol<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    // Two-character symbols first so `>=` is not read as `>` then `=`.
    alt((">=", "<=", "==", "!=", ">", "<")).parse_next(input)
}

fn punct<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt(("(", ")", "+")).parse_next(input)
}

fn quantity<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)
}

fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic()),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn token<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((symbol, punct, quantity, word))
        .context(StrContext::Expected(StrContextValue::Description(
            "rule token",
        )))
        .parse_next(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn condition<'i>(input: &mut &'i str) -> ModalResult<Vec<&'i str>> {
    let tokens: Vec<&str> = repeat(0.., preceded(ws, token)).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(tokens)
}
