use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RuleError;
use super::expr::{AtomicCondition, LogicalToken};

/// A validated enemy-fleet condition.
///
/// Produced by [`compile_rule`](crate::compile_rule). `tokens` is the logical
/// stream the grammar was checked against, `atoms` holds each atomic condition
/// in source order and `condition` is the canonical space-joined rendering
/// of the internal values, which is what plan files store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub tokens: Vec<LogicalToken>,
    pub atoms: Vec<AtomicCondition>,
    pub condition: String,
}

/// What the automation does when a rule matches.
///
/// On disk this is either a formation number or an action name, so the enum
/// is untagged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    Formation(u8),
    Named(String),
}

/// Actions offered by the rule editors as `(internal, display)` pairs.
pub const ACTION_ITEMS: &[(&str, &str)] = &[
    ("retreat", "撤退"),
    ("detour", "迂回"),
    ("1", "单纵阵"),
    ("2", "复纵阵"),
    ("3", "轮型阵"),
    ("4", "梯形阵"),
    ("5", "单横阵"),
];

/// Enemy formations for formation rules as `(internal, display)` pairs.
pub const FORMATION_ITEMS: &[(&str, &str)] = &[
    ("单纵阵", "单纵阵"),
    ("复纵阵", "复纵阵"),
    ("轮型阵", "轮型阵"),
    ("梯形阵", "梯形阵"),
    ("单横阵", "单横阵"),
];

impl Action {
    /// Build an action from an editor item value: numeric values become
    /// formations, everything else stays a name.
    #[must_use]
    pub fn from_item(value: &str) -> Action {
        match value.parse::<u8>() {
            Ok(n) => Action::Formation(n),
            Err(_) => Action::Named(value.to_owned()),
        }
    }

    #[must_use]
    pub fn display_text(&self) -> String {
        let key = self.to_string();
        ACTION_ITEMS
            .iter()
            .find(|(internal, _)| *internal == key)
            .map_or(key.clone(), |(_, display)| (*display).to_owned())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Formation(n) => write!(f, "{n}"),
            Action::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A `[condition, action]` entry of `enemy_rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, Action)", into = "(String, Action)")]
pub struct EnemyRule {
    pub condition: String,
    pub action: Action,
}

impl EnemyRule {
    /// Compile `blocks` and pair the canonical condition with `action`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the blocks do not form a valid rule; no
    /// rule is produced in that case.
    pub fn from_blocks<S: AsRef<str>>(blocks: &[S], action: Action) -> Result<Self, RuleError> {
        let compiled = crate::compile::compile_rule(blocks)?;
        Ok(Self {
            condition: compiled.condition,
            action,
        })
    }

    /// Re-validate the stored condition string.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the stored condition no longer parses or
    /// compiles.
    pub fn compile(&self) -> Result<CompiledRule, RuleError> {
        let tokens = crate::parse::parse_condition(&self.condition)?;
        crate::compile::compile_rule(tokens.as_slice())
    }
}

impl From<(String, Action)> for EnemyRule {
    fn from((condition, action): (String, Action)) -> Self {
        Self { condition, action }
    }
}

impl From<EnemyRule> for (String, Action) {
    fn from(rule: EnemyRule) -> Self {
        (rule.condition, rule.action)
    }
}

impl fmt::Display for EnemyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.condition, self.action)
    }
}

/// A `[formation, action]` entry of `enemy_formation_rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, Action)", into = "(String, Action)")]
pub struct FormationRule {
    pub formation: String,
    pub action: Action,
}

impl FormationRule {
    /// Returns `None` when no formation is chosen.
    #[must_use]
    pub fn new(formation: &str, action: Action) -> Option<Self> {
        if formation.is_empty() {
            return None;
        }
        Some(Self {
            formation: formation.to_owned(),
            action,
        })
    }
}

impl From<(String, Action)> for FormationRule {
    fn from((formation, action): (String, Action)) -> Self {
        Self { formation, action }
    }
}

impl From<FormationRule> for (String, Action) {
    fn from(rule: FormationRule) -> Self {
        (rule.formation, rule.action)
    }
}

impl fmt::Display for FormationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.formation, self.action)
    }
}

/// An ordered rule table, evaluated top to bottom. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleList<R> {
    rules: Vec<R>,
}

impl<R> Default for RuleList<R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<R> RuleList<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: R) {
        self.rules.push(rule);
    }

    /// Remove and return the rule at `row`.
    pub fn remove(&mut self, row: usize) -> Option<R> {
        (row < self.rules.len()).then(|| self.rules.remove(row))
    }

    /// Swap the rule at `row` with its upper neighbour. Returns the new row.
    pub fn move_up(&mut self, row: usize) -> Option<usize> {
        if row == 0 || row >= self.rules.len() {
            return None;
        }
        self.rules.swap(row, row - 1);
        Some(row - 1)
    }

    /// Swap the rule at `row` with its lower neighbour. Returns the new row.
    pub fn move_down(&mut self, row: usize) -> Option<usize> {
        if row + 1 >= self.rules.len() {
            return None;
        }
        self.rules.swap(row, row + 1);
        Some(row + 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&R> {
        self.rules.get(row)
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rules.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[R] {
        &self.rules
    }
}

impl RuleList<EnemyRule> {
    /// Compile `blocks` and append the rule. Nothing is added on failure.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the blocks are invalid.
    pub fn push_blocks<S: AsRef<str>>(
        &mut self,
        blocks: &[S],
        action: Action,
    ) -> Result<(), RuleError> {
        let rule = EnemyRule::from_blocks(blocks, action)?;
        self.rules.push(rule);
        Ok(())
    }
}

impl<R> From<Vec<R>> for RuleList<R> {
    fn from(rules: Vec<R>) -> Self {
        Self { rules }
    }
}

impl<R> FromIterator<R> for RuleList<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
