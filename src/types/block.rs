use std::fmt;

/// Grammar class of a single rule block, resolved from its internal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// An enemy ship type code such as `BB` or `CL`.
    Type,
    /// A comparison symbol (`>=`, `<=`, `>`, `<`, `==`, `!=`).
    Symbol,
    /// A ship count, `"0"` through `"6"`.
    Quantity,
    /// `and`, `or`, or the in-atom joiner `+`.
    Logic,
    LParen,
    RParen,
}

/// Block palette categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCategory {
    All,
    ShipType,
    Comparison,
    Quantity,
    Logic,
}

/// Enemy ship types as `(internal, display)` pairs.
pub const ENEMY_SHIP_TYPES: &[(&str, &str)] = &[
    ("AADG", "防驱"),
    ("ASDG", "导驱"),
    ("AV", "装母"),
    ("BB", "战列"),
    ("BBV", "航战"),
    ("BC", "战巡"),
    ("BG", "导战"),
    ("BM", "重炮"),
    ("CA", "重巡"),
    ("CAV", "航巡"),
    ("CB", "大巡"),
    ("CG", "防巡"),
    ("CL", "轻巡"),
    ("CLT", "雷巡"),
    ("CV", "航母"),
    ("CVL", "轻母"),
    ("DD", "驱逐"),
    ("KP", "导巡"),
    ("NAP", "补给"),
    ("SC", "炮潜"),
    ("SS", "潜艇"),
    ("SSG", "导潜"),
];

/// Comparison symbols as `(internal, display)` pairs.
pub const SYMBOLS: &[(&str, &str)] = &[
    (">=", "≥"),
    ("<=", "≤"),
    (">", ">"),
    ("<", "<"),
    ("==", "="),
    ("!=", "≠"),
];

/// Logic operators as `(internal, display)` pairs. `+` only joins ship types
/// inside an atomic condition.
pub const LOGIC_OPS: &[(&str, &str)] = &[("and", "并且"), ("or", "或者"), ("+", "+")];

pub const QUANTITIES: &[&str] = &["0", "1", "2", "3", "4", "5", "6"];

pub const PARENS: &[&str] = &["(", ")"];

fn internal_from_display<'a>(table: &'a [(&'a str, &'a str)], text: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(_, display)| *display == text)
        .map(|(internal, _)| *internal)
}

fn display_from_internal<'a>(table: &'a [(&'a str, &'a str)], value: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(internal, _)| *internal == value)
        .map(|(_, display)| *display)
}

fn contains_internal(table: &[(&str, &str)], value: &str) -> bool {
    table.iter().any(|(internal, _)| *internal == value)
}

/// Map a display block to its internal value. Ship types, symbols and logic
/// operators are looked up by display text; anything else is returned as-is.
#[must_use]
pub fn to_internal(block: &str) -> &str {
    internal_from_display(ENEMY_SHIP_TYPES, block)
        .or_else(|| internal_from_display(SYMBOLS, block))
        .or_else(|| internal_from_display(LOGIC_OPS, block))
        .unwrap_or(block)
}

/// Map an internal value back to the text shown on its block.
#[must_use]
pub fn display_of(value: &str) -> &str {
    display_from_internal(ENEMY_SHIP_TYPES, value)
        .or_else(|| display_from_internal(SYMBOLS, value))
        .or_else(|| display_from_internal(LOGIC_OPS, value))
        .unwrap_or(value)
}

/// Classify an internal value. Returns `None` for anything outside the
/// five block tables.
#[must_use]
pub fn classify(value: &str) -> Option<BlockKind> {
    if contains_internal(SYMBOLS, value) {
        Some(BlockKind::Symbol)
    } else if contains_internal(LOGIC_OPS, value) {
        Some(BlockKind::Logic)
    } else if value == "(" {
        Some(BlockKind::LParen)
    } else if value == ")" {
        Some(BlockKind::RParen)
    } else if QUANTITIES.contains(&value) {
        Some(BlockKind::Quantity)
    } else if contains_internal(ENEMY_SHIP_TYPES, value) {
        Some(BlockKind::Type)
    } else {
        None
    }
}

/// Display blocks offered by the palette for a category.
#[must_use]
pub fn palette(category: BlockCategory) -> Vec<&'static str> {
    let ship_types = ENEMY_SHIP_TYPES.iter().map(|(_, display)| *display);
    let symbols = SYMBOLS.iter().map(|(_, display)| *display);
    let quantities = QUANTITIES.iter().copied();
    let logic = LOGIC_OPS
        .iter()
        .map(|(_, display)| *display)
        .chain(PARENS.iter().copied());
    match category {
        BlockCategory::ShipType => ship_types.collect(),
        BlockCategory::Comparison => symbols.collect(),
        BlockCategory::Quantity => quantities.collect(),
        BlockCategory::Logic => logic.collect(),
        BlockCategory::All => ship_types
            .chain(symbols)
            .chain(quantities)
            .chain(logic)
            .collect(),
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Type => write!(f, "TYPE"),
            BlockKind::Symbol => write!(f, "SYMBOL"),
            BlockKind::Quantity => write!(f, "QUANTITY"),
            BlockKind::Logic => write!(f, "LOGIC"),
            BlockKind::LParen => write!(f, "LPAREN"),
            BlockKind::RParen => write!(f, "RPAREN"),
        }
    }
}
