use crate::types::block::{classify, to_internal, BlockKind};
use crate::types::TokenClass;
use crate::{AtomicCondition, CompareOp, CompiledRule, LogicalToken, RuleError};

/// Compile a block sequence into a validated rule.
///
/// Display blocks are mapped to internal values, split on `and`, `or` and
/// parentheses, and every run between delimiters must be a valid atomic
/// condition. The resulting token stream is then checked for balanced
/// parentheses and a legal token order.
///
/// # Errors
///
/// Returns the first [`RuleError`] found. A failing atomic run fails the
/// whole rule.
pub fn compile_rule<S: AsRef<str>>(blocks: &[S]) -> Result<CompiledRule, RuleError> {
    if blocks.is_empty() {
        return Err(RuleError::Empty);
    }
    let values: Vec<&str> = blocks.iter().map(|b| to_internal(b.as_ref())).collect();

    let (tokens, atoms) = tokenize(&values)?;
    check_balance(&tokens)?;
    check_sequence(&tokens)?;

    Ok(CompiledRule {
        tokens,
        atoms,
        condition: values.join(" "),
    })
}

/// Whether `blocks` compile. Rejections are logged at debug level.
#[must_use]
pub fn validate_rule<S: AsRef<str>>(blocks: &[S]) -> bool {
    match compile_rule(blocks) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(%err, "rule rejected");
            false
        }
    }
}

/// Whether a run of internal values is a single `TYPE (+ TYPE)* SYMBOL QUANTITY`
/// comparison.
#[must_use]
pub fn is_valid_atomic<S: AsRef<str>>(run: &[S]) -> bool {
    parse_atomic(run).is_some()
}

/// Render a stored condition string as display blocks.
///
/// # Errors
///
/// Returns [`ParseError`](crate::ParseError) if the condition cannot be split
/// into tokens.
pub fn display_blocks(condition: &str) -> Result<Vec<String>, crate::ParseError> {
    let tokens = crate::parse::parse_condition(condition)?;
    Ok(tokens
        .iter()
        .map(|t| crate::types::block::display_of(t).to_owned())
        .collect())
}

fn tokenize(values: &[&str]) -> Result<(Vec<LogicalToken>, Vec<AtomicCondition>), RuleError> {
    let mut tokens = Vec::new();
    let mut atoms = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for &value in values {
        match LogicalToken::delimiter(value) {
            Some(delimiter) => {
                flush_run(&mut run, &mut tokens, &mut atoms)?;
                tokens.push(delimiter);
            }
            None => run.push(value),
        }
    }
    flush_run(&mut run, &mut tokens, &mut atoms)?;

    Ok((tokens, atoms))
}

fn flush_run(
    run: &mut Vec<&str>,
    tokens: &mut Vec<LogicalToken>,
    atoms: &mut Vec<AtomicCondition>,
) -> Result<(), RuleError> {
    if run.is_empty() {
        return Ok(());
    }
    let atom = parse_atomic(run).ok_or_else(|| RuleError::InvalidAtomic {
        run: run.iter().map(|v| (*v).to_owned()).collect(),
    })?;
    atoms.push(atom);
    tokens.push(LogicalToken::Atomic);
    run.clear();
    Ok(())
}

fn parse_atomic<S: AsRef<str>>(run: &[S]) -> Option<AtomicCondition> {
    let mut symbols = run
        .iter()
        .enumerate()
        .filter(|(_, v)| classify(v.as_ref()) == Some(BlockKind::Symbol));
    let (pos, symbol) = symbols.next()?;
    if symbols.next().is_some() {
        return None;
    }

    let (lhs, rhs) = (&run[..pos], &run[pos + 1..]);
    let [quantity] = rhs else {
        return None;
    };
    if classify(quantity.as_ref()) != Some(BlockKind::Quantity) {
        return None;
    }

    // Even positions are ship types, odd positions joiners; an even length
    // means the left side ends on a joiner.
    if lhs.is_empty() || lhs.len() % 2 == 0 {
        return None;
    }
    for (i, value) in lhs.iter().enumerate() {
        let expected = if i % 2 == 0 {
            BlockKind::Type
        } else {
            BlockKind::Logic
        };
        if classify(value.as_ref()) != Some(expected) {
            return None;
        }
    }

    Some(AtomicCondition {
        ship_types: lhs
            .iter()
            .step_by(2)
            .map(|v| v.as_ref().to_owned())
            .collect(),
        op: CompareOp::from_symbol(symbol.as_ref())?,
        quantity: quantity.as_ref().parse().ok()?,
    })
}

fn check_balance(tokens: &[LogicalToken]) -> Result<(), RuleError> {
    let mut depth: usize = 0;
    for token in tokens {
        match token {
            LogicalToken::LParen => depth += 1,
            LogicalToken::RParen => {
                depth = depth.checked_sub(1).ok_or(RuleError::UnbalancedParens)?;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(RuleError::UnbalancedParens)
    }
}

fn check_sequence(tokens: &[LogicalToken]) -> Result<(), RuleError> {
    let mut prev: Option<TokenClass> = None;
    for token in tokens {
        let class = token.class();
        let allowed = match prev {
            None | Some(TokenClass::Logic | TokenClass::LParen) => {
                matches!(class, TokenClass::Atomic | TokenClass::LParen)
            }
            Some(TokenClass::Atomic | TokenClass::RParen) => {
                matches!(class, TokenClass::Logic | TokenClass::RParen)
            }
        };
        if !allowed {
            return Err(RuleError::UnexpectedToken {
                after: prev.map_or_else(|| "START".to_owned(), |c| c.to_string()),
                found: class.to_string(),
            });
        }
        prev = Some(class);
    }

    match prev {
        Some(TokenClass::Atomic | TokenClass::RParen) => Ok(()),
        Some(last) => Err(RuleError::IncompleteRule {
            last: last.to_string(),
        }),
        None => Err(RuleError::Empty),
    }
}
