use std::collections::BTreeSet;
use std::fmt;

use serde_yaml::{Mapping, Value};

use super::{base_visible_params, NodeParams, ParamKey};
use crate::plan::prune_node_args;
use crate::{ordering, MapGraph, PlanType};

/// What the node editor is currently editing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditTarget {
    /// The plan-wide `node_defaults` tier.
    Defaults,
    /// One `node_args` entry: a map node, or `player`/`robot` in exercises.
    Node(String),
}

impl EditTarget {
    #[must_use]
    pub fn node(name: &str) -> Self {
        EditTarget::Node(name.to_owned())
    }
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::Defaults => f.write_str("defaults"),
            EditTarget::Node(name) => f.write_str(name),
        }
    }
}

/// Where a target's values live in the plan document.
enum Tier<'a> {
    /// Battle plans keep a single flat `node_args` mapping.
    Flat,
    Defaults,
    Node(&'a str),
}

const NODE_DEFAULTS: &str = "node_defaults";
const NODE_ARGS: &str = "node_args";

fn key(name: &str) -> Value {
    Value::String(name.to_owned())
}

/// Node parameter editing for one plan.
///
/// Holds the plan type, the current node selection and which selected nodes
/// can detour. The plan document itself is passed to each call, so a session
/// never outlives or aliases the data it edits.
#[derive(Debug, Clone)]
pub struct NodeSettings {
    plan_type: PlanType,
    selected: Vec<String>,
    detourable: BTreeSet<String>,
}

impl NodeSettings {
    #[must_use]
    pub fn new(plan_type: PlanType, selected: &[String], graph: Option<&MapGraph>) -> Self {
        let detourable = graph
            .map(|g| {
                g.nodes()
                    .filter(|n| n.detourable)
                    .map(|n| n.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        let mut settings = Self {
            plan_type,
            selected: Vec::new(),
            detourable,
        };
        settings.set_selected(selected);
        settings
    }

    fn set_selected(&mut self, nodes: &[String]) {
        let mut selected = nodes.to_vec();
        selected.sort();
        selected.dedup();
        self.selected = selected;
    }

    #[must_use]
    pub fn plan_type(&self) -> PlanType {
        self.plan_type
    }

    /// Selected nodes, sorted.
    #[must_use]
    pub fn selected_nodes(&self) -> &[String] {
        &self.selected
    }

    /// Entries of the target selector, `Defaults` first.
    #[must_use]
    pub fn edit_targets(&self) -> Vec<EditTarget> {
        let mut targets = vec![EditTarget::Defaults];
        match self.plan_type {
            PlanType::Battle => {}
            PlanType::Exercise => {
                targets.push(EditTarget::node("player"));
                targets.push(EditTarget::node("robot"));
            }
            _ => targets.extend(self.selected.iter().map(|n| EditTarget::Node(n.clone()))),
        }
        targets
    }

    fn can_detour(&self, target: &EditTarget) -> bool {
        match target {
            EditTarget::Defaults => self.selected.iter().any(|n| self.detourable.contains(n)),
            EditTarget::Node(name) => self.detourable.contains(name),
        }
    }

    /// Parameters shown for `target`. `detour` is dropped when the node
    /// cannot detour; for `Defaults` it stays if any selected node can.
    #[must_use]
    pub fn visible_params(&self, target: &EditTarget) -> BTreeSet<ParamKey> {
        let mut params = base_visible_params(self.plan_type);
        if params.contains(&ParamKey::Detour) && !self.can_detour(target) {
            params.remove(&ParamKey::Detour);
        }
        params
    }

    /// Whether the editor has anything to show at all.
    #[must_use]
    pub fn has_visible_params(&self) -> bool {
        !self.visible_params(&EditTarget::Defaults).is_empty()
    }

    fn tier<'a>(&self, target: &'a EditTarget) -> Tier<'a> {
        if self.plan_type == PlanType::Battle {
            return Tier::Flat;
        }
        match target {
            EditTarget::Defaults => Tier::Defaults,
            EditTarget::Node(name) => Tier::Node(name),
        }
    }

    /// The values `target` inherits: global defaults for `Defaults`, global
    /// defaults overridden by `node_defaults` for everything else.
    #[must_use]
    pub fn tier_default(&self, data: &Mapping, target: &EditTarget) -> NodeParams {
        let mut defaults = NodeParams::global();
        if matches!(self.tier(target), Tier::Defaults) {
            return defaults;
        }
        if let Some(plan_defaults) = data.get(NODE_DEFAULTS).and_then(Value::as_mapping) {
            defaults.overlay_scalars(plan_defaults);
        }
        defaults
    }

    /// Effective values for `target`: the stored tier over its inherited
    /// defaults. Rule lists come from the stored tier only. A stored `detour`
    /// is ignored while it is hidden.
    #[must_use]
    pub fn load(&self, data: &Mapping, target: &EditTarget) -> NodeParams {
        let defaults = self.tier_default(data, target);
        let mut params = defaults.clone();
        if let Some(stored) = stored_tier(data, &self.tier(target)) {
            params.overlay_scalars(stored);
            params.take_rule_lists(stored);
        }
        if !self.visible_params(target).contains(&ParamKey::Detour) {
            params.detour = defaults.detour;
        }
        params
    }

    /// Store `params` sparsely into the tier of `target`.
    ///
    /// Visible scalars are written only when they differ from the inherited
    /// value, except a per-slot `proceed_stop`, which is always written.
    /// Non-empty rule lists are written as they are, and a stored list that
    /// did not decode is written back unchanged. Recognised keys that
    /// are hidden or equal to their default are deleted; unknown keys are
    /// kept. An empty tier is removed. Returns whether the document changed.
    pub fn save(&self, data: &mut Mapping, target: &EditTarget, params: &NodeParams) -> bool {
        let snapshot = data.clone();
        let tier = self.tier(target);
        let defaults = self.tier_default(data, target);
        let visible = self.visible_params(target);
        let stored = stored_tier(data, &tier).cloned().unwrap_or_default();

        let mut sparse = Mapping::new();
        for param in ParamKey::ALL {
            if !visible.contains(&param) {
                if stored.contains_key(param.as_str()) {
                    tracing::debug!(key = %param, %target, "dropping hidden parameter");
                }
                continue;
            }
            if param.is_rule_list() {
                if let Some(rules) = params.stored_list(param) {
                    sparse.insert(key(param.as_str()), rules);
                }
                continue;
            }
            let write = (param == ParamKey::ProceedStop && params.proceed_stop.is_per_slot())
                || params.value(param) != defaults.value(param);
            if write {
                sparse.insert(key(param.as_str()), params.value(param));
            }
        }
        for (name, value) in &stored {
            let recognised = name
                .as_str()
                .is_some_and(|n| n.parse::<ParamKey>().is_ok());
            if !recognised {
                sparse.insert(name.clone(), value.clone());
            }
        }

        tracing::debug!(%target, stored = sparse.len(), "saved node parameters");
        write_tier(data, &tier, sparse);
        ordering::reorder_plan(data, self.plan_type);
        *data != snapshot
    }

    /// Follow a change of the map selection.
    ///
    /// Overrides of deselected nodes are deleted. When no selected node can
    /// detour any more, a stored `node_defaults.detour` is deleted too, and
    /// an emptied `node_defaults` removed. Returns whether the document
    /// changed. Plan types without a node map are left alone.
    pub fn update_node_list(&mut self, data: &mut Mapping, nodes: &[String]) -> bool {
        if !self.plan_type.has_node_map() {
            return false;
        }
        self.set_selected(nodes);
        let snapshot = data.clone();

        prune_node_args(data, &self.selected);

        if !self.visible_params(&EditTarget::Defaults).contains(&ParamKey::Detour) {
            let emptied = match data.get_mut(NODE_DEFAULTS).and_then(Value::as_mapping_mut) {
                Some(plan_defaults) => {
                    if plan_defaults.shift_remove(ParamKey::Detour.as_str()).is_some() {
                        tracing::debug!("removed hidden node_defaults.detour");
                    }
                    plan_defaults.is_empty()
                }
                None => false,
            };
            if emptied {
                data.shift_remove(NODE_DEFAULTS);
            }
        }

        *data != snapshot
    }
}

fn stored_tier<'d>(data: &'d Mapping, tier: &Tier<'_>) -> Option<&'d Mapping> {
    match tier {
        Tier::Flat => data.get(NODE_ARGS)?.as_mapping(),
        Tier::Defaults => data.get(NODE_DEFAULTS)?.as_mapping(),
        Tier::Node(name) => data.get(NODE_ARGS)?.get(*name)?.as_mapping(),
    }
}

fn write_tier(data: &mut Mapping, tier: &Tier<'_>, values: Mapping) {
    let name = match tier {
        Tier::Flat => NODE_ARGS,
        Tier::Defaults => NODE_DEFAULTS,
        Tier::Node(node) => return write_node_tier(data, node, values),
    };
    if values.is_empty() {
        data.shift_remove(name);
    } else {
        data.insert(key(name), Value::Mapping(values));
    }
}

fn write_node_tier(data: &mut Mapping, node: &str, values: Mapping) {
    if values.is_empty() {
        let emptied = match data.get_mut(NODE_ARGS).and_then(Value::as_mapping_mut) {
            Some(node_args) => {
                node_args.shift_remove(node);
                node_args.is_empty()
            }
            None => false,
        };
        if emptied {
            data.shift_remove(NODE_ARGS);
        }
        return;
    }
    if !data.get(NODE_ARGS).is_some_and(Value::is_mapping) {
        data.insert(key(NODE_ARGS), Value::Mapping(Mapping::new()));
    }
    if let Some(node_args) = data.get_mut(NODE_ARGS).and_then(Value::as_mapping_mut) {
        node_args.insert(key(node), Value::Mapping(values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ProceedStop;
    use crate::{Action, EnemyRule, MapNode};

    fn graph() -> MapGraph {
        [
            MapNode::new("A").start().connect(&["B", "C"]),
            MapNode::new("B").detourable(),
            MapNode::new("C"),
        ]
        .into_iter()
        .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| (*n).to_owned()).collect()
    }

    fn data(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn settings(selected: &[&str]) -> NodeSettings {
        let g = graph();
        NodeSettings::new(PlanType::NormalFight, &names(selected), Some(&g))
    }

    #[test]
    fn detour_visibility_per_node() {
        let s = settings(&["A", "B"]);
        assert!(s.visible_params(&EditTarget::node("B")).contains(&ParamKey::Detour));
        assert!(!s.visible_params(&EditTarget::node("A")).contains(&ParamKey::Detour));
    }

    #[test]
    fn defaults_detour_is_union_of_selection() {
        assert!(settings(&["A", "B"])
            .visible_params(&EditTarget::Defaults)
            .contains(&ParamKey::Detour));
        assert!(!settings(&["A", "C"])
            .visible_params(&EditTarget::Defaults)
            .contains(&ParamKey::Detour));
        assert!(!settings(&[])
            .visible_params(&EditTarget::Defaults)
            .contains(&ParamKey::Detour));
    }

    #[test]
    fn edit_targets_by_plan_type() {
        let s = settings(&["C", "A"]);
        assert_eq!(
            s.edit_targets(),
            [EditTarget::Defaults, EditTarget::node("A"), EditTarget::node("C")]
        );
        let exercise = NodeSettings::new(PlanType::Exercise, &[], None);
        assert_eq!(exercise.edit_targets().len(), 3);
        let battle = NodeSettings::new(PlanType::Battle, &[], None);
        assert_eq!(battle.edit_targets(), [EditTarget::Defaults]);
        assert!(battle.has_visible_params());
    }

    #[test]
    fn load_defaults_tier_against_global() {
        let d = data("node_defaults: {night: true, formation: 4}\n");
        let p = settings(&["A"]).load(&d, &EditTarget::Defaults);
        assert!(p.night);
        assert_eq!(p.formation, 4);
        assert!(p.proceed);
    }

    #[test]
    fn load_node_inherits_node_defaults() {
        let d = data("node_defaults: {night: true}\nnode_args:\n  A: {formation: 1}\n");
        let p = settings(&["A"]).load(&d, &EditTarget::node("A"));
        assert!(p.night);
        assert_eq!(p.formation, 1);
    }

    #[test]
    fn load_ignores_hidden_detour() {
        let d = data("node_args:\n  A: {detour: true}\n  B: {detour: true}\n");
        let s = settings(&["A", "B"]);
        assert!(!s.load(&d, &EditTarget::node("A")).detour);
        assert!(s.load(&d, &EditTarget::node("B")).detour);
    }

    #[test]
    fn rule_lists_are_not_inherited() {
        let d = data("node_defaults:\n  enemy_rules: [[BB > 1, retreat]]\n");
        let s = settings(&["A"]);
        assert_eq!(s.load(&d, &EditTarget::Defaults).enemy_rules.len(), 1);
        assert!(s.load(&d, &EditTarget::node("A")).enemy_rules.is_empty());
    }

    #[test]
    fn battle_uses_flat_node_args() {
        let mut d = data("map: 2\nnode_defaults: {night: true}\nnode_args: {formation: 3}\n");
        let s = NodeSettings::new(PlanType::Battle, &[], None);
        let mut p = s.load(&d, &EditTarget::Defaults);
        assert!(p.night);
        assert_eq!(p.formation, 3);

        p.formation = 2;
        assert!(s.save(&mut d, &EditTarget::Defaults, &p));
        assert!(d.get("node_args").is_none());
        assert!(d.get("node_defaults").is_some());
    }

    #[test]
    fn save_writes_only_differences() {
        let mut d = data("chapter: 1\nmap: 1\n");
        let s = settings(&["A"]);
        let mut p = s.load(&d, &EditTarget::node("A"));
        p.night = true;
        assert!(s.save(&mut d, &EditTarget::node("A"), &p));
        assert_eq!(d, data("chapter: 1\nmap: 1\nnode_args:\n  A: {night: true}\n"));
    }

    #[test]
    fn save_against_node_defaults_removes_stale_override() {
        let mut d = data("node_defaults: {night: true}\nnode_args:\n  A: {night: false, formation: 3}\n");
        let s = settings(&["A"]);
        let mut p = s.load(&d, &EditTarget::node("A"));
        p.night = true;
        assert!(s.save(&mut d, &EditTarget::node("A"), &p));
        assert_eq!(
            d,
            data("node_defaults: {night: true}\nnode_args:\n  A: {formation: 3}\n")
        );
    }

    #[test]
    fn save_default_values_removes_tiers() {
        let mut d = data("node_args:\n  A: {night: true}\n");
        let s = settings(&["A"]);
        assert!(s.save(&mut d, &EditTarget::node("A"), &NodeParams::global()));
        assert!(d.is_empty());
        assert!(!s.save(&mut d, &EditTarget::node("A"), &NodeParams::global()));
    }

    #[test]
    fn per_slot_proceed_stop_always_written() {
        let mut d = Mapping::new();
        let s = settings(&["A"]);
        let mut p = NodeParams::global();
        p.proceed_stop = ProceedStop::PerSlot([true; 6]);
        s.save(&mut d, &EditTarget::Defaults, &p);
        let stored = d.get("node_defaults").unwrap().get("proceed_stop").unwrap();
        assert_eq!(stored, &data_value("[2, 2, 2, 2, 2, 2]"));
    }

    fn data_value(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn rule_lists_written_verbatim_or_removed() {
        let mut d = Mapping::new();
        let s = settings(&["A"]);
        let mut p = NodeParams::global();
        p.enemy_rules.push(EnemyRule {
            condition: "SS > 0".into(),
            action: Action::Named("retreat".into()),
        });
        s.save(&mut d, &EditTarget::node("A"), &p);
        let rules = d
            .get("node_args")
            .and_then(|args| args.get("A"))
            .and_then(|tier| tier.get("enemy_rules"))
            .unwrap();
        assert_eq!(rules, &data_value("[[SS > 0, retreat]]"));

        p.enemy_rules = Default::default();
        s.save(&mut d, &EditTarget::node("A"), &p);
        assert!(d.get("node_args").is_none());
    }

    #[test]
    fn undecodable_rule_list_survives_unrelated_save() {
        crate::logging::init_test();
        let mut d = data(
            "node_args:\n  A:\n    night: true\n    enemy_rules: [[BB > 1, retreat], [SS > 0, 1.5]]\n",
        );
        let s = settings(&["A"]);
        let a = EditTarget::node("A");
        let mut p = s.load(&d, &a);
        assert!(p.enemy_rules.is_empty());
        p.formation = 4;
        assert!(s.save(&mut d, &a, &p));
        let tier = d
            .get("node_args")
            .and_then(|args| args.get("A"))
            .and_then(Value::as_mapping)
            .unwrap();
        assert_eq!(tier.get("formation"), Some(&data_value("4")));
        assert_eq!(tier.get("night"), Some(&Value::Bool(true)));
        assert_eq!(
            tier.get("enemy_rules"),
            Some(&data_value("[[BB > 1, retreat], [SS > 0, 1.5]]"))
        );
        let p = s.load(&d, &a);
        assert!(!s.save(&mut d, &a, &p));
    }

    #[test]
    fn save_keeps_unknown_keys_and_drops_hidden() {
        let mut d = data("node_args:\n  A: {detour: true, custom_flag: 7}\n");
        let s = settings(&["A"]);
        s.save(&mut d, &EditTarget::node("A"), &NodeParams::global());
        assert_eq!(d, data("node_args:\n  A: {custom_flag: 7}\n"));
    }

    #[test]
    fn save_reorders_plan_keys() {
        let mut d = data("node_args: {}\nmap: 1\nchapter: 1\n");
        let s = settings(&["A"]);
        let mut p = NodeParams::global();
        p.night = true;
        s.save(&mut d, &EditTarget::Defaults, &p);
        let keys: Vec<&str> = d.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["chapter", "map", "node_defaults", "node_args"]);
    }

    #[test]
    fn update_node_list_prunes_and_hides_detour() {
        let mut d = data(
            "node_defaults: {detour: true}\nnode_args:\n  A: {night: true}\n  B: {detour: true}\n",
        );
        let mut s = settings(&["A", "B"]);
        assert!(s.update_node_list(&mut d, &names(&["A"])));
        assert_eq!(d, data("node_args:\n  A: {night: true}\n"));
        assert_eq!(s.selected_nodes(), ["A"]);
        assert!(!s.update_node_list(&mut d, &names(&["A"])));
    }

    #[test]
    fn update_node_list_keeps_detour_while_detourable_selected() {
        let mut d = data("node_defaults: {detour: true, night: true}\n");
        let mut s = settings(&["A", "B"]);
        assert!(!s.update_node_list(&mut d, &names(&["B", "A"])));
        assert_eq!(d, data("node_defaults: {detour: true, night: true}\n"));
    }

    #[test]
    fn exercise_ignores_node_list_changes() {
        let mut d = data("node_args:\n  player: {night: true}\n");
        let mut s = NodeSettings::new(PlanType::Exercise, &[], None);
        assert!(!s.update_node_list(&mut d, &[]));
        assert!(d.get("node_args").is_some());
    }
}
