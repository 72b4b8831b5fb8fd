mod compile;
mod decisive;
mod error;
mod fleet;
mod map_config;
mod plan;
mod reachability;
mod settings;
mod types;

pub mod logging;
pub mod ordering;
pub mod params;
pub mod parse;

pub use compile::{compile_rule, display_blocks, is_valid_atomic, validate_rule};
pub use decisive::{required_fleet_size, DecisiveBattle, DEFAULT_FLEET_SIZE, FLEET_SIZE_REQUIREMENTS};
pub use error::PlanError;
pub use fleet::{DropSource, Exchange, FleetBoard, ListConfig, ListId, ListKind};
pub use map_config::{MapConfigs, MapLookup};
pub use ordering::{key_order, reorder_keys};
pub use params::{EditTarget, NodeParams, NodeSettings, ParamKey, ProceedStop};
pub use parse::{parse_condition, ParseError};
pub use plan::{Plan, PlanType, RuleIssue, FLEET_SLOTS};
pub use reachability::{recompute_reachability, NodeSelector, Reachability};
pub use settings::{Settings, SETTINGS_FILE};
pub use types::{
    block, Action, AtomicCondition, BlockCategory, BlockKind, BlockSequence, CompareOp,
    CompiledRule, EnemyRule, ExchangeError, FormationRule, LogicalToken, MapGraph, MapNode,
    RuleError, RuleList, ACTION_ITEMS, FORMATION_ITEMS,
};
