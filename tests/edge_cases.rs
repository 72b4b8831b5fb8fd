use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};
use sortie_plan::{
    compile_rule, is_valid_atomic, reorder_keys, validate_rule, DropSource, EditTarget,
    FleetBoard, MapGraph, MapNode, NodeSettings, PlanType, RuleError,
};

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| (*n).to_owned()).collect()
}

// =========================================================================
// Atomic validity boundary
// =========================================================================

#[test]
fn joined_types_are_valid() {
    assert!(is_valid_atomic(&["BB", "+", "CL", ">", "1"]));
    assert!(validate_rule(&["BB", "+", "CL", ">", "1"]));
}

#[test]
fn missing_plus_is_invalid() {
    assert!(!is_valid_atomic(&["BB", "CL", ">", "1"]));
    assert!(matches!(
        compile_rule(&["BB", "CL", ">", "1"]),
        Err(RuleError::InvalidAtomic { .. })
    ));
}

#[test]
fn trailing_plus_is_invalid() {
    assert!(!is_valid_atomic(&["BB", "+", ">", "1"]));
}

#[test]
fn empty_lhs_is_invalid() {
    assert!(!is_valid_atomic(&[">", "1"]));
}

#[test]
fn display_blocks_are_accepted() {
    assert!(validate_rule(&["战列", "+", "轻巡", "≥", "2", "并且", "驱逐", "=", "0"]));
}

// =========================================================================
// Grammar balance
// =========================================================================

#[test]
fn grouped_pair_is_valid() {
    let blocks = ["(", "CV", ">", "0", "and", "SS", "<", "2", ")"];
    let rule = compile_rule(&blocks).unwrap();
    assert_eq!(rule.condition, "( CV > 0 and SS < 2 )");
    assert_eq!(rule.atoms.len(), 2);
}

#[test]
fn reversed_parens_are_invalid() {
    assert!(!validate_rule(&[")", "("]));
}

#[test]
fn unclosed_group_is_invalid() {
    assert_eq!(
        compile_rule(&["(", "CV", ">", "0"]),
        Err(RuleError::UnbalancedParens)
    );
}

#[test]
fn empty_rule_is_invalid() {
    let none: [&str; 0] = [];
    assert_eq!(compile_rule(&none), Err(RuleError::Empty));
}

// =========================================================================
// Reachability pruning
// =========================================================================

fn chain() -> MapGraph {
    [
        MapNode::new("A").start().connect(&["B"]),
        MapNode::new("B").connect(&["C"]),
        MapNode::new("C"),
        MapNode::new("D"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn unchecked_link_prunes_downstream() {
    let r = sortie_plan::recompute_reachability(&chain(), &set(&["A", "C", "D"]), &BTreeSet::new());
    assert_eq!(r.valid, set(&["A"]));
    assert_eq!(r.pruned, set(&["C", "D"]));
    assert!(r.changed);
}

#[test]
fn connected_chain_survives() {
    let checked = set(&["A", "B", "C"]);
    let r = sortie_plan::recompute_reachability(&chain(), &checked, &checked);
    assert_eq!(r.valid, checked);
    assert!(r.pruned.is_empty());
    assert!(!r.changed);
}

#[test]
fn enable_set_of_empty_selection_is_starts() {
    let r = sortie_plan::recompute_reachability(&chain(), &BTreeSet::new(), &BTreeSet::new());
    assert_eq!(r.enabled, set(&["A"]));
}

#[test]
fn enable_set_follows_valid_selection() {
    let r = sortie_plan::recompute_reachability(&chain(), &set(&["A", "B"]), &BTreeSet::new());
    assert_eq!(r.enabled, set(&["A", "B", "C"]));
    assert!(!r.enabled.contains("D"));
}

// =========================================================================
// Sparsify round trip
// =========================================================================

fn map_settings() -> NodeSettings {
    let graph: MapGraph = [
        MapNode::new("A").start().connect(&["B"]),
        MapNode::new("B").detourable(),
    ]
    .into_iter()
    .collect();
    NodeSettings::new(
        PlanType::NormalFight,
        &["A".to_owned(), "B".to_owned()],
        Some(&graph),
    )
}

fn yaml(input: &str) -> Mapping {
    serde_yaml::from_str(input).unwrap()
}

#[test]
fn value_equal_to_plan_default_removes_override() {
    let settings = map_settings();
    let mut data = yaml(
        "chapter: 1\nmap: 1\nnode_defaults:\n  night: true\nnode_args:\n  A:\n    night: false\n",
    );
    let target = EditTarget::node("A");
    let mut params = settings.load(&data, &target);
    assert!(!params.night);

    params.night = true;
    assert!(settings.save(&mut data, &target, &params));
    assert!(data.get("node_args").is_none());
    assert_eq!(data.get("node_defaults"), Some(&Value::Mapping(yaml("night: true"))));
}

#[test]
fn differing_value_writes_only_that_key() {
    let settings = map_settings();
    let mut data = yaml("chapter: 1\nmap: 1\nselected_nodes: [A, B]\n");
    let before = data.clone();
    let target = EditTarget::node("B");

    let mut params = settings.load(&data, &target);
    params.formation = 4;
    assert!(settings.save(&mut data, &target, &params));

    let b = data
        .get("node_args")
        .and_then(|args| args.get("B"))
        .and_then(Value::as_mapping)
        .unwrap();
    assert_eq!(b, &yaml("formation: 4"));
    for (k, v) in &before {
        assert_eq!(data.get(k), Some(v));
    }
    assert_eq!(data.len(), before.len() + 1);
}

#[test]
fn saving_unchanged_params_is_a_noop() {
    let settings = map_settings();
    let mut data = yaml("chapter: 1\nmap: 1\nnode_args:\n  A:\n    proceed: false\n");
    let target = EditTarget::node("A");
    let params = settings.load(&data, &target);
    assert!(!settings.save(&mut data, &target, &params));
}

// =========================================================================
// Key ordering determinism
// =========================================================================

#[test]
fn reorder_twice_is_identical() {
    let map = yaml("fleet: [\"\", A]\nzeta: 1\nchapter: 2\nalpha: 2\nmap: 3\n");
    let order = sortie_plan::key_order(PlanType::NormalFight);
    let once = serde_yaml::to_string(&reorder_keys(&map, order)).unwrap();
    let twice = serde_yaml::to_string(&reorder_keys(&reorder_keys(&map, order), order)).unwrap();
    assert_eq!(once, twice);
    let ordered = reorder_keys(&map, order);
    let keys: Vec<&str> = ordered.keys().filter_map(Value::as_str).collect();
    assert_eq!(keys, ["chapter", "map", "fleet", "zeta", "alpha"]);
}

// =========================================================================
// Fleet exclusivity
// =========================================================================

#[test]
fn moving_between_levels_never_duplicates() {
    let mut board = FleetBoard::decisive_battle();
    let l1 = board.find("level1").unwrap();
    let l2 = board.find("level2").unwrap();
    board.set_items(l1, &["Bismarck", "Hood", "Tirpitz"]).unwrap();
    board.set_items(l2, &["Yamato"]).unwrap();

    board
        .exchange_list_contents(l2, &["Bismarck"], DropSource::List(l1))
        .unwrap();

    assert_eq!(board.items(l1).unwrap().len(), 2);
    assert_eq!(board.items(l2).unwrap().len(), 2);
    assert!(!board.items(l1).unwrap().contains(&"Bismarck".to_owned()));
    assert_eq!(
        board
            .items(l2)
            .unwrap()
            .iter()
            .filter(|s| *s == "Bismarck")
            .count(),
        1
    );
}

// =========================================================================
// Smart swap
// =========================================================================

#[test]
fn palette_drop_swaps_with_sibling_slot() {
    let mut board = FleetBoard::fleet_editor();
    let target = board.find("2").unwrap();
    let holder = board.find("5").unwrap();
    board.set_items(target, &["Y"]).unwrap();
    board.set_items(holder, &["X"]).unwrap();
    let occupied_before = (0..6)
        .filter_map(|i| board.find(&(i + 1).to_string()))
        .filter(|id| !board.items(*id).unwrap().is_empty())
        .count();

    board
        .exchange_list_contents(target, &["X"], DropSource::Palette)
        .unwrap();

    assert_eq!(board.items(target).unwrap(), ["X"]);
    assert_eq!(board.items(holder).unwrap(), ["Y"]);
    let occupied_after = (0..6)
        .filter_map(|i| board.find(&(i + 1).to_string()))
        .filter(|id| !board.items(*id).unwrap().is_empty())
        .count();
    assert_eq!(occupied_before, occupied_after);
}
