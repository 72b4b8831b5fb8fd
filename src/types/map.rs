use std::collections::BTreeMap;

use serde::Deserialize;

/// A selectable map location.
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub name: String,
    /// Normalised `(x, y)` in `[0, 1]`. Nodes without a position still take
    /// part in reachability.
    pub position: Option<(f64, f64)>,
    pub is_start: bool,
    pub connections: Vec<String>,
    pub detourable: bool,
}

impl MapNode {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            position: None,
            is_start: false,
            connections: Vec::new(),
            detourable: false,
        }
    }

    #[must_use]
    pub fn start(mut self) -> Self {
        self.is_start = true;
        self
    }

    #[must_use]
    pub fn connect(mut self, neighbours: &[&str]) -> Self {
        self.connections
            .extend(neighbours.iter().map(|n| (*n).to_owned()));
        self
    }

    #[must_use]
    pub fn detourable(mut self) -> Self {
        self.detourable = true;
        self
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    pos: Option<serde_yaml::Value>,
    #[serde(default)]
    is_start: bool,
    #[serde(default)]
    connections: Option<Vec<String>>,
    #[serde(default)]
    detourable: bool,
}

#[derive(Debug, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: BTreeMap<String, RawNode>,
}

fn position_of(pos: Option<&serde_yaml::Value>) -> Option<(f64, f64)> {
    let seq = pos?.as_sequence()?;
    match seq.as_slice() {
        [x, y] => Some((x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

/// Read-only node graph of one map, keyed by node name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawGraph")]
pub struct MapGraph {
    nodes: BTreeMap<String, MapNode>,
}

impl From<RawGraph> for MapGraph {
    fn from(raw: RawGraph) -> Self {
        let nodes = raw
            .nodes
            .into_iter()
            .map(|(name, node)| {
                let position = position_of(node.pos.as_ref());
                if node.pos.is_some() && position.is_none() {
                    tracing::warn!(node = %name, "ignoring malformed node position");
                }
                let node = MapNode {
                    name: name.clone(),
                    position,
                    is_start: node.is_start,
                    connections: node.connections.unwrap_or_default(),
                    detourable: node.detourable,
                };
                (name, node)
            })
            .collect();
        Self { nodes }
    }
}

impl FromIterator<MapNode> for MapGraph {
    fn from_iter<I: IntoIterator<Item = MapNode>>(iter: I) -> Self {
        Self {
            nodes: iter
                .into_iter()
                .map(|node| (node.name.clone(), node))
                .collect(),
        }
    }
}

impl MapGraph {
    /// Build a graph from a map entry value holding a `nodes` mapping.
    ///
    /// # Errors
    ///
    /// Returns a YAML error if the entry does not have the expected shape.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_value(value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MapNode> {
        self.nodes.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Nodes in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &MapNode> {
        self.nodes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn start_nodes(&self) -> impl Iterator<Item = &MapNode> {
        self.nodes.values().filter(|n| n.is_start)
    }

    /// Neighbours of `name`; empty for unknown nodes.
    #[must_use]
    pub fn neighbours(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.connections.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_detourable(&self, name: &str) -> bool {
        self.nodes.get(name).is_some_and(|n| n.detourable)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r"
nodes:
  A:
    pos: [0.1, 0.5]
    is_start: true
    connections: [B]
  B:
    pos: [0.4, 0.5]
    connections: [C]
    detourable: true
  C:
    pos: [0.8]
  D: {}
";

    #[test]
    fn deserialize_entry() {
        let graph: MapGraph = serde_yaml::from_str(ENTRY).unwrap();
        assert_eq!(graph.len(), 4);
        let a = graph.get("A").unwrap();
        assert!(a.is_start);
        assert_eq!(a.position, Some((0.1, 0.5)));
        assert_eq!(graph.neighbours("A"), ["B"]);
        assert!(graph.is_detourable("B"));
        assert!(!graph.is_detourable("A"));
    }

    #[test]
    fn malformed_position_is_absent() {
        let graph: MapGraph = serde_yaml::from_str(ENTRY).unwrap();
        assert_eq!(graph.get("C").unwrap().position, None);
        assert_eq!(graph.get("D").unwrap().position, None);
    }

    #[test]
    fn missing_fields_default() {
        let graph: MapGraph = serde_yaml::from_str(ENTRY).unwrap();
        let d = graph.get("D").unwrap();
        assert!(!d.is_start);
        assert!(d.connections.is_empty());
        assert!(graph.neighbours("missing").is_empty());
    }

    #[test]
    fn start_nodes_and_names() {
        let graph: MapGraph = [
            MapNode::new("B").connect(&["C"]),
            MapNode::new("A").start().connect(&["B"]),
            MapNode::new("C"),
        ]
        .into_iter()
        .collect();
        let names: Vec<&str> = graph.names().collect();
        assert_eq!(names, ["A", "B", "C"]);
        let starts: Vec<&str> = graph.start_nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(starts, ["A"]);
    }

    #[test]
    fn entry_without_nodes_is_empty() {
        let graph: MapGraph = serde_yaml::from_str("image: 1-1.png").unwrap();
        assert!(graph.is_empty());
    }
}
