use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::MapGraph;

/// Outcome of one reachability pass over a node selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    /// Checked nodes reachable from a checked start node through checked
    /// nodes only.
    pub valid: BTreeSet<String>,
    /// Nodes the user may toggle: every start node, every valid node and the
    /// neighbours of valid nodes.
    pub enabled: BTreeSet<String>,
    /// Checked nodes that were dropped from the selection.
    pub pruned: BTreeSet<String>,
    /// Whether `valid` differs from the previously emitted selection.
    pub changed: bool,
}

/// Breadth-first search from the checked start nodes, restricted to checked
/// nodes.
pub fn recompute_reachability(
    graph: &MapGraph,
    checked: &BTreeSet<String>,
    previous: &BTreeSet<String>,
) -> Reachability {
    let mut queue: VecDeque<&str> = graph
        .start_nodes()
        .map(|n| n.name.as_str())
        .filter(|name| checked.contains(*name))
        .collect();
    let mut visited: HashSet<&str> = queue.iter().copied().collect();
    let mut valid = BTreeSet::new();

    while let Some(name) = queue.pop_front() {
        valid.insert(name.to_owned());
        for next in graph.neighbours(name) {
            if checked.contains(next) && graph.contains(next) && visited.insert(next.as_str()) {
                queue.push_back(next.as_str());
            }
        }
    }

    let pruned: BTreeSet<String> = checked.difference(&valid).cloned().collect();
    if !pruned.is_empty() {
        tracing::debug!(?pruned, "pruned orphaned nodes");
    }

    let mut enabled: BTreeSet<String> = graph.start_nodes().map(|n| n.name.clone()).collect();
    for name in &valid {
        enabled.insert(name.clone());
        enabled.extend(
            graph
                .neighbours(name)
                .iter()
                .filter(|n| graph.contains(n))
                .cloned(),
        );
    }

    let changed = valid != *previous;
    Reachability {
        valid,
        enabled,
        pruned,
        changed,
    }
}

/// Node selection state for one map, with change tracking.
///
/// Every edit runs a full [`recompute_reachability`] pass. The returned
/// [`Reachability::changed`] tells the caller whether the selection it last
/// received is stale.
#[derive(Debug, Clone)]
pub struct NodeSelector {
    graph: MapGraph,
    checked: BTreeSet<String>,
    last: Reachability,
}

impl NodeSelector {
    #[must_use]
    pub fn new(graph: MapGraph) -> Self {
        let last = recompute_reachability(&graph, &BTreeSet::new(), &BTreeSet::new());
        Self {
            graph,
            checked: BTreeSet::new(),
            last,
        }
    }

    /// Replace the whole selection, e.g. from a loaded plan.
    pub fn set_checked<I, S>(&mut self, names: I) -> &Reachability
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checked = names.into_iter().map(Into::into).collect();
        self.recompute()
    }

    pub fn check(&mut self, name: &str) -> &Reachability {
        self.checked.insert(name.to_owned());
        self.recompute()
    }

    pub fn uncheck(&mut self, name: &str) -> &Reachability {
        self.checked.remove(name);
        self.recompute()
    }

    pub fn clear(&mut self) -> &Reachability {
        self.checked.clear();
        self.recompute()
    }

    fn recompute(&mut self) -> &Reachability {
        let result = recompute_reachability(&self.graph, &self.checked, &self.last.valid);
        self.checked.clone_from(&result.valid);
        self.last = result;
        &self.last
    }

    /// The current valid selection.
    #[must_use]
    pub fn selection(&self) -> &BTreeSet<String> {
        &self.last.valid
    }

    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.last.enabled.contains(name)
    }

    #[must_use]
    pub fn last(&self) -> &Reachability {
        &self.last
    }

    #[must_use]
    pub fn graph(&self) -> &MapGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapNode;

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

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn gap_in_chain_prunes_downstream() {
        let result = recompute_reachability(&chain(), &set(&["A", "C", "D"]), &BTreeSet::new());
        assert_eq!(result.valid, set(&["A"]));
        assert_eq!(result.pruned, set(&["C", "D"]));
        assert_eq!(result.enabled, set(&["A", "B"]));
        assert!(result.changed);
    }

    #[test]
    fn full_chain_kept() {
        let result = recompute_reachability(&chain(), &set(&["A", "B", "C"]), &BTreeSet::new());
        assert_eq!(result.valid, set(&["A", "B", "C"]));
        assert!(result.pruned.is_empty());
    }

    #[test]
    fn unchecked_start_enables_only_starts() {
        let result = recompute_reachability(&chain(), &set(&["B"]), &BTreeSet::new());
        assert!(result.valid.is_empty());
        assert_eq!(result.enabled, set(&["A"]));
        assert!(!result.changed);
    }

    #[test]
    fn unchanged_selection_not_flagged() {
        let checked = set(&["A", "B"]);
        let result = recompute_reachability(&chain(), &checked, &checked);
        assert!(!result.changed);
    }

    #[test]
    fn unknown_names_pruned_and_never_enabled() {
        let graph: MapGraph = [MapNode::new("A").start().connect(&["Z"])]
            .into_iter()
            .collect();
        let result = recompute_reachability(&graph, &set(&["A", "Z"]), &BTreeSet::new());
        assert_eq!(result.valid, set(&["A"]));
        assert_eq!(result.pruned, set(&["Z"]));
        assert_eq!(result.enabled, set(&["A"]));
    }

    #[test]
    fn positionless_nodes_participate() {
        let graph: MapGraph = [
            MapNode::new("A").start().at(0.1, 0.1).connect(&["B"]),
            MapNode::new("B"),
        ]
        .into_iter()
        .collect();
        let result = recompute_reachability(&graph, &set(&["A", "B"]), &BTreeSet::new());
        assert_eq!(result.valid, set(&["A", "B"]));
    }

    #[test]
    fn cycles_terminate() {
        let graph: MapGraph = [
            MapNode::new("A").start().connect(&["B"]),
            MapNode::new("B").connect(&["C"]),
            MapNode::new("C").connect(&["A", "B"]),
        ]
        .into_iter()
        .collect();
        let result = recompute_reachability(&graph, &set(&["A", "B", "C"]), &BTreeSet::new());
        assert_eq!(result.valid.len(), 3);
    }

    #[test]
    fn selector_uncheck_cascades() {
        let mut selector = NodeSelector::new(chain());
        selector.set_checked(["A", "B", "C"]);
        assert_eq!(selector.selection(), &set(&["A", "B", "C"]));

        let result = selector.uncheck("B");
        assert_eq!(result.valid, set(&["A"]));
        assert_eq!(result.pruned, set(&["C"]));
        assert!(result.changed);

        // C was auto-unchecked, so re-checking B does not bring it back.
        let result = selector.check("B");
        assert_eq!(result.valid, set(&["A", "B"]));
    }

    #[test]
    fn selector_reports_no_change_on_repeat() {
        let mut selector = NodeSelector::new(chain());
        assert!(selector.check("A").changed);
        assert!(!selector.check("A").changed);
        assert!(selector.is_enabled("B"));
        assert!(!selector.is_enabled("C"));
    }

    #[test]
    fn selector_checking_disabled_node_is_pruned() {
        let mut selector = NodeSelector::new(chain());
        let result = selector.check("C");
        assert!(result.valid.is_empty());
        assert_eq!(result.pruned, set(&["C"]));
        assert!(!result.changed);
    }
}
