pub mod block;
mod error;
mod expr;
mod map;
mod rule;
mod sequence;

pub use block::{BlockCategory, BlockKind};
pub use error::{ExchangeError, RuleError};
pub use expr::{AtomicCondition, CompareOp, LogicalToken};
pub(crate) use expr::TokenClass;
pub use map::{MapGraph, MapNode};
pub use rule::{
    Action, CompiledRule, EnemyRule, FormationRule, RuleList, ACTION_ITEMS, FORMATION_ITEMS,
};
pub use sequence::BlockSequence;
