use serde_yaml::{Mapping, Value};

use crate::PlanType;

const MAP_PLAN_ORDER: &[&str] = &[
    "chapter",
    "map",
    "selected_nodes",
    "repair_mode",
    "fight_condition",
    "fleet_id",
    "fleet",
    "node_defaults",
    "node_args",
];

const BATTLE_ORDER: &[&str] = &["map", "repair_mode", "node_defaults", "node_args"];

const EVENT_ORDER: &[&str] = &[
    "chapter",
    "map",
    "selected_nodes",
    "repair_mode",
    "fleet_id",
    "from_alpha",
    "fleet",
    "node_defaults",
    "node_args",
];

const EXERCISE_ORDER: &[&str] = &[
    "exercise_times",
    "robot",
    "fleet_id",
    "max_refresh_times",
    "node_defaults",
    "node_args",
];

/// Canonical top-level key order for a plan type.
#[must_use]
pub fn key_order(plan_type: PlanType) -> &'static [&'static str] {
    match plan_type {
        PlanType::NormalFight | PlanType::Week | PlanType::SpecialApTask => MAP_PLAN_ORDER,
        PlanType::Battle => BATTLE_ORDER,
        PlanType::Event => EVENT_ORDER,
        PlanType::Exercise => EXERCISE_ORDER,
    }
}

/// Return `map` with the keys listed in `order` first, in that order, then
/// every other key in its original relative order.
#[must_use]
pub fn reorder_keys(map: &Mapping, order: &[&str]) -> Mapping {
    let mut ordered = Mapping::with_capacity(map.len());
    for key in order {
        if let Some(value) = map.get(*key) {
            ordered.insert(Value::String((*key).to_owned()), value.clone());
        }
    }
    for (key, value) in map {
        let canonical = key.as_str().is_some_and(|k| order.contains(&k));
        if !canonical {
            ordered.insert(key.clone(), value.clone());
        }
    }
    ordered
}

/// In-place [`reorder_keys`] with the canonical order of `plan_type`.
pub fn reorder_plan(map: &mut Mapping, plan_type: PlanType) {
    *map = reorder_keys(map, key_order(plan_type));
}
