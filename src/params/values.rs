use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use super::ParamKey;
use crate::{EnemyRule, FormationRule, RuleList};

/// When to stop advancing, by ship damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceedStop {
    /// One flag per fleet slot; `true` stops on heavy damage, `false` on
    /// moderate damage. Stored as six `2`/`1` values.
    PerSlot([bool; 6]),
    /// `1` stops on moderate damage, `2` on heavy damage.
    Mode(u8),
}

impl ProceedStop {
    /// Decode a stored value. A six-element list is per-slot; otherwise a `1`
    /// or `2` selects a mode, and anything else falls back to mode `2`.
    #[must_use]
    pub fn from_value(value: &Value) -> ProceedStop {
        if let Some(seq) = value.as_sequence() {
            if seq.len() == 6 {
                let mut slots = [false; 6];
                for (slot, v) in slots.iter_mut().zip(seq) {
                    *slot = v.as_u64() == Some(2);
                }
                return ProceedStop::PerSlot(slots);
            }
        }
        let mode = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        match mode {
            Some(m @ (1 | 2)) => ProceedStop::Mode(m as u8),
            _ => ProceedStop::Mode(2),
        }
    }

    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            ProceedStop::PerSlot(slots) => Value::Sequence(
                slots
                    .iter()
                    .map(|&heavy| Value::from(if heavy { 2 } else { 1 }))
                    .collect(),
            ),
            ProceedStop::Mode(m) => Value::from(m),
        }
    }

    #[must_use]
    pub fn is_per_slot(self) -> bool {
        matches!(self, ProceedStop::PerSlot(_))
    }

    /// Index into [`PROCEED_ITEMS`](super::PROCEED_ITEMS).
    #[must_use]
    pub fn combo_index(self) -> usize {
        match self {
            ProceedStop::PerSlot(_) => 0,
            ProceedStop::Mode(m) => usize::from(m),
        }
    }

    /// Build from a combo index and the slot toggles. Out-of-range indices
    /// select mode `2`.
    #[must_use]
    pub fn from_combo(index: usize, slots: [bool; 6]) -> ProceedStop {
        match index {
            0 => ProceedStop::PerSlot(slots),
            1 => ProceedStop::Mode(1),
            _ => ProceedStop::Mode(2),
        }
    }
}

/// The complete parameter set of one edit target.
///
/// Values are owned copies; loading and saving never hand out references
/// into shared defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeParams {
    pub long_missile_support: bool,
    pub detour: bool,
    pub enemy_rules: RuleList<EnemyRule>,
    pub enemy_formation_rules: RuleList<FormationRule>,
    pub sl_when_spot_enemy_fails: bool,
    pub sl_when_detour_fails: bool,
    pub sl_when_enter_fight: bool,
    /// 1-based position in [`FORMATION_NAMES`](super::FORMATION_NAMES).
    pub formation: u8,
    /// 0 leaves it unset, otherwise 1-based like `formation`.
    pub formation_when_spot_enemy_fails: u8,
    pub night: bool,
    pub proceed: bool,
    pub proceed_stop: ProceedStop,
    /// Stored rule lists that failed to decode, kept as read so a save of
    /// unrelated fields writes them back untouched.
    undecoded: BTreeMap<ParamKey, Value>,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self::global()
    }
}

impl NodeParams {
    /// The global defaults every tier ultimately falls back to.
    #[must_use]
    pub fn global() -> Self {
        Self {
            long_missile_support: false,
            detour: false,
            enemy_rules: RuleList::new(),
            enemy_formation_rules: RuleList::new(),
            sl_when_spot_enemy_fails: false,
            sl_when_detour_fails: true,
            sl_when_enter_fight: false,
            formation: 2,
            formation_when_spot_enemy_fails: 0,
            night: false,
            proceed: true,
            proceed_stop: ProceedStop::Mode(2),
            undecoded: BTreeMap::new(),
        }
    }

    /// Stored encoding of `key`. Rule lists encode as sequences, empty or not.
    #[must_use]
    pub fn value(&self, key: ParamKey) -> Value {
        match key {
            ParamKey::LongMissileSupport => self.long_missile_support.into(),
            ParamKey::Detour => self.detour.into(),
            ParamKey::EnemyRules => to_sequence(&self.enemy_rules),
            ParamKey::EnemyFormationRules => to_sequence(&self.enemy_formation_rules),
            ParamKey::SlWhenSpotEnemyFails => self.sl_when_spot_enemy_fails.into(),
            ParamKey::SlWhenDetourFails => self.sl_when_detour_fails.into(),
            ParamKey::SlWhenEnterFight => self.sl_when_enter_fight.into(),
            ParamKey::Formation => self.formation.into(),
            ParamKey::FormationWhenSpotEnemyFails => self.formation_when_spot_enemy_fails.into(),
            ParamKey::Night => self.night.into(),
            ParamKey::Proceed => self.proceed.into(),
            ParamKey::ProceedStop => self.proceed_stop.to_value(),
        }
    }

    /// Whether the rule list under `key` holds no rules. Always `false` for
    /// scalar keys.
    #[must_use]
    pub fn is_empty_list(&self, key: ParamKey) -> bool {
        match key {
            ParamKey::EnemyRules => self.enemy_rules.is_empty(),
            ParamKey::EnemyFormationRules => self.enemy_formation_rules.is_empty(),
            _ => false,
        }
    }

    /// The stored form of a rule list that could not be decoded, if any.
    #[must_use]
    pub fn undecoded_list(&self, key: ParamKey) -> Option<&Value> {
        self.undecoded.get(&key)
    }

    /// Forget an undecodable rule list so the next save deletes it.
    pub fn discard_undecoded(&mut self, key: ParamKey) -> Option<Value> {
        self.undecoded.remove(&key)
    }

    /// What a save persists for the rule list under `key`: the typed rules
    /// when there are any, otherwise the undecodable list as it was read.
    /// `None` means the key is deleted.
    #[must_use]
    pub fn stored_list(&self, key: ParamKey) -> Option<Value> {
        if !key.is_rule_list() {
            return None;
        }
        if !self.is_empty_list(key) {
            return Some(self.value(key));
        }
        self.undecoded.get(&key).cloned()
    }

    /// Decode one stored value into `key`. Mistyped or out-of-range values
    /// are logged and leave the field unchanged. A rule list that fails to
    /// decode reads as empty and is kept in its stored form.
    pub fn set_value(&mut self, key: ParamKey, value: &Value) {
        if key.is_rule_list() {
            self.set_rule_list(key, value);
            return;
        }
        let ok = match key {
            ParamKey::LongMissileSupport => set_bool(&mut self.long_missile_support, value),
            ParamKey::Detour => set_bool(&mut self.detour, value),
            ParamKey::SlWhenSpotEnemyFails => set_bool(&mut self.sl_when_spot_enemy_fails, value),
            ParamKey::SlWhenDetourFails => set_bool(&mut self.sl_when_detour_fails, value),
            ParamKey::SlWhenEnterFight => set_bool(&mut self.sl_when_enter_fight, value),
            ParamKey::Night => set_bool(&mut self.night, value),
            ParamKey::Proceed => set_bool(&mut self.proceed, value),
            ParamKey::Formation => set_index(&mut self.formation, value, 1..=5),
            ParamKey::FormationWhenSpotEnemyFails => {
                set_index(&mut self.formation_when_spot_enemy_fails, value, 0..=5)
            }
            ParamKey::ProceedStop => {
                self.proceed_stop = ProceedStop::from_value(value);
                true
            }
            ParamKey::EnemyRules | ParamKey::EnemyFormationRules => true,
        };
        if !ok {
            tracing::warn!(%key, ?value, "ignoring mistyped parameter value");
        }
    }

    fn set_rule_list(&mut self, key: ParamKey, value: &Value) {
        let decoded = match key {
            ParamKey::EnemyFormationRules => set_list(&mut self.enemy_formation_rules, value),
            _ => set_list(&mut self.enemy_rules, value),
        };
        if decoded {
            self.undecoded.remove(&key);
            return;
        }
        tracing::warn!(%key, ?value, "keeping undecodable rule list as stored");
        match key {
            ParamKey::EnemyFormationRules => self.enemy_formation_rules = RuleList::new(),
            _ => self.enemy_rules = RuleList::new(),
        }
        self.undecoded.insert(key, value.clone());
    }

    /// Overlay every recognised scalar key found in `tier`. Rule lists are
    /// not inherited between tiers.
    pub fn overlay_scalars(&mut self, tier: &Mapping) {
        for key in ParamKey::ALL {
            if key.is_rule_list() {
                continue;
            }
            if let Some(value) = tier.get(key.as_str()) {
                self.set_value(key, value);
            }
        }
    }

    /// Replace both rule lists with what `tier` stores, or empty lists.
    pub fn take_rule_lists(&mut self, tier: &Mapping) {
        self.enemy_rules = RuleList::new();
        self.enemy_formation_rules = RuleList::new();
        self.undecoded.clear();
        for key in [ParamKey::EnemyRules, ParamKey::EnemyFormationRules] {
            if let Some(value) = tier.get(key.as_str()) {
                self.set_value(key, value);
            }
        }
    }
}

fn to_sequence<R: serde::Serialize>(rules: &RuleList<R>) -> Value {
    serde_yaml::to_value(rules).unwrap_or_else(|err| {
        tracing::warn!(%err, "failed to encode rule list");
        Value::Sequence(Vec::new())
    })
}

fn set_bool(field: &mut bool, value: &Value) -> bool {
    match value.as_bool() {
        Some(b) => {
            *field = b;
            true
        }
        None => false,
    }
}

fn set_index(field: &mut u8, value: &Value, range: std::ops::RangeInclusive<u8>) -> bool {
    let parsed = value.as_u64().and_then(|n| u8::try_from(n).ok());
    match parsed {
        Some(n) if range.contains(&n) => {
            *field = n;
            true
        }
        _ => false,
    }
}

fn set_list<R: serde::de::DeserializeOwned>(field: &mut RuleList<R>, value: &Value) -> bool {
    if value.is_null() {
        *field = RuleList::new();
        return true;
    }
    match serde_yaml::from_value(value.clone()) {
        Ok(rules) => {
            *field = rules;
            true
        }
        Err(_) => false,
    }
}
