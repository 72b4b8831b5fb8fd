mod session;
mod values;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub use session::{EditTarget, NodeSettings};
pub use values::{NodeParams, ProceedStop};

use crate::PlanType;

/// Every parameter the node editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    LongMissileSupport,
    Detour,
    EnemyRules,
    EnemyFormationRules,
    SlWhenSpotEnemyFails,
    SlWhenDetourFails,
    SlWhenEnterFight,
    Formation,
    FormationWhenSpotEnemyFails,
    Night,
    Proceed,
    ProceedStop,
}

impl ParamKey {
    /// All keys in editor order.
    pub const ALL: [ParamKey; 12] = [
        ParamKey::LongMissileSupport,
        ParamKey::Detour,
        ParamKey::EnemyRules,
        ParamKey::EnemyFormationRules,
        ParamKey::SlWhenSpotEnemyFails,
        ParamKey::SlWhenDetourFails,
        ParamKey::SlWhenEnterFight,
        ParamKey::Formation,
        ParamKey::FormationWhenSpotEnemyFails,
        ParamKey::Night,
        ParamKey::Proceed,
        ParamKey::ProceedStop,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKey::LongMissileSupport => "long_missile_support",
            ParamKey::Detour => "detour",
            ParamKey::EnemyRules => "enemy_rules",
            ParamKey::EnemyFormationRules => "enemy_formation_rules",
            ParamKey::SlWhenSpotEnemyFails => "SL_when_spot_enemy_fails",
            ParamKey::SlWhenDetourFails => "SL_when_detour_fails",
            ParamKey::SlWhenEnterFight => "SL_when_enter_fight",
            ParamKey::Formation => "formation",
            ParamKey::FormationWhenSpotEnemyFails => "formation_when_spot_enemy_fails",
            ParamKey::Night => "night",
            ParamKey::Proceed => "proceed",
            ParamKey::ProceedStop => "proceed_stop",
        }
    }

    /// Rule lists have no global default and skip the default diff.
    #[must_use]
    pub fn is_rule_list(self) -> bool {
        matches!(self, ParamKey::EnemyRules | ParamKey::EnemyFormationRules)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamKey::ALL.into_iter().find(|k| k.as_str() == s).ok_or(())
    }
}

/// Formation combo entries; `formation` stores the 1-based position.
pub const FORMATION_NAMES: &[&str] = &["单纵阵", "复纵阵", "轮型阵", "梯形阵", "单横阵"];

/// Spot-failure formation combo entries; index 0 means unset.
pub const SPOT_FAILS_FORMATION_ITEMS: &[&str] =
    &["不设置", "单纵阵", "复纵阵", "轮型阵", "梯形阵", "单横阵"];

/// `proceed_stop` modes by combo index. Index 0 selects per-slot values.
pub const PROCEED_ITEMS: &[&str] = &["逐位自定义", "中破停止", "大破停止"];

const MAP_PLAN_PARAMS: &[ParamKey] = &ParamKey::ALL;

const BATTLE_PARAMS: &[ParamKey] = &[ParamKey::Formation, ParamKey::Night];

/// Parameters a plan type offers before per-node capability filtering.
#[must_use]
pub fn base_visible_params(plan_type: PlanType) -> BTreeSet<ParamKey> {
    let keys = match plan_type {
        PlanType::NormalFight | PlanType::Week | PlanType::SpecialApTask | PlanType::Event => {
            MAP_PLAN_PARAMS
        }
        PlanType::Battle | PlanType::Exercise => BATTLE_PARAMS,
    };
    keys.iter().copied().collect()
}
