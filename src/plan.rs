use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::{ordering, EnemyRule, PlanError, RuleError, RuleList};

/// Plan directory kinds. Each has its own key schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    NormalFight,
    Week,
    SpecialApTask,
    Battle,
    Event,
    Exercise,
}

impl PlanType {
    pub const ALL: [PlanType; 6] = [
        PlanType::NormalFight,
        PlanType::Week,
        PlanType::SpecialApTask,
        PlanType::Battle,
        PlanType::Event,
        PlanType::Exercise,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::NormalFight => "normal_fight",
            PlanType::Week => "week",
            PlanType::SpecialApTask => "special_ap_task",
            PlanType::Battle => "battle",
            PlanType::Event => "event",
            PlanType::Exercise => "exercise",
        }
    }

    /// Plan types that select nodes on a map.
    #[must_use]
    pub fn has_node_map(self) -> bool {
        matches!(
            self,
            PlanType::NormalFight | PlanType::Week | PlanType::SpecialApTask | PlanType::Event
        )
    }

    /// Infer the plan type from the directory a plan file lives in. Event
    /// plans sit one level deeper, under a per-event folder.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<PlanType> {
        path.ancestors()
            .skip(1)
            .take(2)
            .filter_map(|dir| dir.file_name()?.to_str())
            .find_map(|name| name.parse().ok())
    }
}

impl FromStr for PlanType {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        PlanType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| PlanError::UnknownPlanType(s.to_owned()))
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored enemy rule that no longer compiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    /// `node_defaults`, `node_args` or `node_args.<node>`.
    pub location: String,
    pub condition: String,
    pub error: RuleError,
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}': {}", self.location, self.condition, self.error)
    }
}

/// One plan document.
///
/// The data is kept as an order-preserving YAML mapping so keys this crate
/// does not know about survive a load/save cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    plan_type: PlanType,
    data: Mapping,
}

pub const FLEET_SLOTS: usize = 6;

fn key(name: &str) -> Value {
    Value::String(name.to_owned())
}

/// Render a scalar the way it appears in a map key, e.g. `chapter: 1` -> `1`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Plan {
    #[must_use]
    pub fn new(plan_type: PlanType, data: Mapping) -> Self {
        Self { plan_type, data }
    }

    /// The skeleton written for a newly created plan.
    #[must_use]
    pub fn new_default(plan_type: PlanType) -> Self {
        let mut data = Mapping::new();
        let mut set = |name: &str, value: Value| {
            data.insert(key(name), value);
        };
        match plan_type {
            PlanType::NormalFight | PlanType::Week | PlanType::SpecialApTask => {
                set("chapter", 1.into());
                set("map", 1.into());
                set("repair_mode", 2.into());
                set("fleet_id", 1.into());
            }
            PlanType::Battle => {
                set("map", 1.into());
                set("repair_mode", 2.into());
            }
            PlanType::Event => {
                set("chapter", "H".into());
                set("map", 1.into());
                set("repair_mode", 2.into());
                set("fleet_id", 0.into());
                set("from_alpha", true.into());
            }
            PlanType::Exercise => {
                set("exercise_times", 4.into());
                set("robot", true.into());
                set("fleet_id", 2.into());
                set("max_refresh_times", 2.into());
            }
        }
        Self { plan_type, data }
    }

    /// Parse a plan document. An empty document is an empty plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Yaml`] for malformed YAML and
    /// [`PlanError::NotAMapping`] if the document is not a mapping.
    pub fn from_yaml_str(plan_type: PlanType, input: &str) -> Result<Self, PlanError> {
        let value: Value = serde_yaml::from_str(input)?;
        let data = match value {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => return Err(PlanError::NotAMapping),
        };
        Ok(Self { plan_type, data })
    }

    /// Read a plan file. Without an explicit `plan_type` it is inferred
    /// from the containing directory.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] if the file cannot be read or parsed, or the plan
    /// type cannot be inferred.
    pub fn load(path: impl AsRef<Path>, plan_type: Option<PlanType>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let plan_type = match plan_type {
            Some(t) => t,
            None => PlanType::from_path(path)
                .ok_or_else(|| PlanError::UnknownPlanType(path.display().to_string()))?,
        };
        let input = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), %plan_type, "loaded plan");
        Self::from_yaml_str(plan_type, &input)
    }

    /// Serialize with the canonical key order applied.
    ///
    /// Sequences come out in block style, one entry per line, including
    /// `selected_nodes`, `fleet` and each `[condition, action]` rule that
    /// hand-written plans keep in flow style. They read back as the same
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Yaml`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, PlanError> {
        let ordered = ordering::reorder_keys(&self.data, ordering::key_order(self.plan_type));
        Ok(serde_yaml::to_string(&ordered)?)
    }

    /// Write [`to_yaml_string`](Self::to_yaml_string) to `path`. Block-style
    /// sequences replace any flow style the file had.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PlanError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml_string()?)?;
        tracing::debug!(path = %path.display(), "saved plan");
        Ok(())
    }

    #[must_use]
    pub fn plan_type(&self) -> PlanType {
        self.plan_type
    }

    #[must_use]
    pub fn data(&self) -> &Mapping {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Mapping {
        &mut self.data
    }

    #[must_use]
    pub fn into_data(self) -> Mapping {
        self.data
    }

    /// Apply the canonical key order in place.
    pub fn reorder(&mut self) {
        ordering::reorder_plan(&mut self.data, self.plan_type);
    }

    #[must_use]
    pub fn chapter(&self) -> Option<String> {
        self.data.get("chapter").and_then(scalar_text)
    }

    #[must_use]
    pub fn map(&self) -> Option<String> {
        self.data.get("map").and_then(scalar_text)
    }

    /// Selected node names in stored order. Non-string entries are skipped.
    #[must_use]
    pub fn selected_nodes(&self) -> Vec<String> {
        self.data
            .get("selected_nodes")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(scalar_text).collect())
            .unwrap_or_default()
    }

    /// Store a new node selection. For map plans, `node_args` entries of
    /// nodes that are no longer selected are deleted, and an emptied
    /// `node_args` is removed. Returns whether any overrides were deleted.
    pub fn set_selected_nodes(&mut self, nodes: &[String]) -> bool {
        let seq: Vec<Value> = nodes.iter().map(|n| key(n)).collect();
        self.data.insert(key("selected_nodes"), Value::Sequence(seq));
        if !self.plan_type.has_node_map() {
            return false;
        }
        prune_node_args(&mut self.data, nodes)
    }

    /// The six fleet slots, skipping the leading sentinel entry. Empty
    /// strings read as empty slots.
    #[must_use]
    pub fn fleet(&self) -> [Option<String>; FLEET_SLOTS] {
        let mut slots: [Option<String>; FLEET_SLOTS] = Default::default();
        let Some(seq) = self.data.get("fleet").and_then(Value::as_sequence) else {
            return slots;
        };
        for (slot, value) in slots.iter_mut().zip(seq.iter().skip(1)) {
            *slot = value.as_str().filter(|s| !s.is_empty()).map(str::to_owned);
        }
        slots
    }

    /// Write the fleet with its leading `""` sentinel, or remove the key when
    /// every slot is empty.
    pub fn set_fleet(&mut self, slots: &[Option<String>; FLEET_SLOTS]) {
        if slots.iter().all(Option::is_none) {
            self.data.shift_remove("fleet");
            return;
        }
        let seq: Vec<Value> = std::iter::once(key(""))
            .chain(slots.iter().map(|s| key(s.as_deref().unwrap_or(""))))
            .collect();
        self.data.insert(key("fleet"), Value::Sequence(seq));
    }

    /// Check every stored enemy rule in `node_defaults` and `node_args`.
    #[must_use]
    pub fn rule_issues(&self) -> Vec<RuleIssue> {
        let mut issues = Vec::new();
        if let Some(tier) = self.data.get("node_defaults") {
            collect_rule_issues("node_defaults", tier, &mut issues);
        }
        let Some(node_args) = self.data.get("node_args") else {
            return issues;
        };
        if self.plan_type == PlanType::Battle {
            collect_rule_issues("node_args", node_args, &mut issues);
        } else if let Some(node_args) = node_args.as_mapping() {
            for (node, tier) in node_args {
                let location = format!(
                    "node_args.{}",
                    scalar_text(node).unwrap_or_else(|| "?".to_owned())
                );
                collect_rule_issues(&location, tier, &mut issues);
            }
        }
        issues
    }

    /// `node_args` entries for nodes that are not selected.
    #[must_use]
    pub fn stale_node_args(&self) -> Vec<String> {
        if !self.plan_type.has_node_map() {
            return Vec::new();
        }
        let selected = self.selected_nodes();
        self.data
            .get("node_args")
            .and_then(Value::as_mapping)
            .map(|args| {
                args.keys()
                    .filter_map(scalar_text)
                    .filter(|n| !selected.contains(n))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub(crate) fn prune_node_args(data: &mut Mapping, keep: &[String]) -> bool {
    let Some(node_args) = data.get_mut("node_args").and_then(Value::as_mapping_mut) else {
        return false;
    };
    let before = node_args.len();
    node_args.retain(|node, _| scalar_text(node).is_some_and(|n| keep.contains(&n)));
    let pruned = node_args.len() != before;
    if pruned {
        tracing::debug!(removed = before - node_args.len(), "pruned node_args of deselected nodes");
    }
    if node_args.is_empty() {
        data.shift_remove("node_args");
    }
    pruned
}

fn collect_rule_issues(location: &str, tier: &Value, issues: &mut Vec<RuleIssue>) {
    let Some(rules) = tier.get("enemy_rules") else {
        return;
    };
    let rules: RuleList<EnemyRule> = match serde_yaml::from_value(rules.clone()) {
        Ok(rules) => rules,
        Err(err) => {
            tracing::warn!(location, %err, "enemy_rules is not a list of [condition, action] pairs");
            return;
        }
    };
    for rule in rules.iter() {
        if let Err(error) = rule.compile() {
            issues.push(RuleIssue {
                location: location.to_owned(),
                condition: rule.condition.clone(),
                error,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
chapter: 2
map: 4
selected_nodes: [A, B, D]
fleet_id: 1
fleet: ['', Bismarck, '', Yamato]
node_args:
  B:
    night: true
  D:
    enemy_rules:
    - [BB > 1, retreat]
    - [BB CL > 1, 2]
";

    fn plan() -> Plan {
        Plan::from_yaml_str(PlanType::NormalFight, PLAN).unwrap()
    }

    #[test]
    fn plan_type_parses_case_insensitively() {
        assert_eq!("Normal_Fight".parse::<PlanType>().unwrap(), PlanType::NormalFight);
        assert_eq!("EVENT".parse::<PlanType>().unwrap(), PlanType::Event);
        assert!("raid".parse::<PlanType>().is_err());
    }

    #[test]
    fn plan_type_from_path() {
        let path = Path::new("/plans/normal_fight/7-4.yaml");
        assert_eq!(PlanType::from_path(path), Some(PlanType::NormalFight));
        let path = Path::new("/plans/event/20251001/E-3.yaml");
        assert_eq!(PlanType::from_path(path), Some(PlanType::Event));
        assert_eq!(PlanType::from_path(Path::new("/tmp/x.yaml")), None);
    }

    #[test]
    fn chapter_and_map_as_text() {
        let plan = plan();
        assert_eq!(plan.chapter().as_deref(), Some("2"));
        assert_eq!(plan.map().as_deref(), Some("4"));
    }

    #[test]
    fn selected_nodes_read() {
        assert_eq!(plan().selected_nodes(), ["A", "B", "D"]);
    }

    #[test]
    fn deselecting_prunes_node_args() {
        let mut plan = plan();
        assert!(plan.set_selected_nodes(&["A".to_owned(), "B".to_owned()]));
        let args = plan.data().get("node_args").unwrap().as_mapping().unwrap();
        assert!(args.contains_key("B"));
        assert!(!args.contains_key("D"));

        assert!(plan.set_selected_nodes(&["A".to_owned()]));
        assert!(plan.data().get("node_args").is_none());
    }

    #[test]
    fn exercise_selection_keeps_node_args() {
        let mut plan =
            Plan::from_yaml_str(PlanType::Exercise, "node_args:\n  player: {night: true}\n").unwrap();
        assert!(!plan.set_selected_nodes(&[]));
        assert!(plan.data().get("node_args").is_some());
    }

    #[test]
    fn fleet_skips_sentinel() {
        let fleet = plan().fleet();
        assert_eq!(fleet[0].as_deref(), Some("Bismarck"));
        assert_eq!(fleet[1], None);
        assert_eq!(fleet[2].as_deref(), Some("Yamato"));
        assert_eq!(fleet[5], None);
    }

    #[test]
    fn set_fleet_writes_sentinel() {
        let mut plan = plan();
        let mut slots: [Option<String>; FLEET_SLOTS] = Default::default();
        slots[3] = Some("Hood".into());
        plan.set_fleet(&slots);
        let seq = plan.data().get("fleet").unwrap().as_sequence().unwrap();
        assert_eq!(seq.len(), 7);
        assert_eq!(seq[0].as_str(), Some(""));
        assert_eq!(seq[4].as_str(), Some("Hood"));
        assert_eq!(plan.fleet(), slots);
    }

    #[test]
    fn empty_fleet_removes_key() {
        let mut plan = plan();
        plan.set_fleet(&Default::default());
        assert!(plan.data().get("fleet").is_none());
    }

    #[test]
    fn default_skeletons() {
        let event = Plan::new_default(PlanType::Event);
        assert_eq!(event.chapter().as_deref(), Some("H"));
        assert_eq!(event.data().get("from_alpha"), Some(&Value::Bool(true)));
        let battle = Plan::new_default(PlanType::Battle);
        assert_eq!(battle.data().len(), 2);
        let exercise = Plan::new_default(PlanType::Exercise);
        assert_eq!(exercise.data().get("fleet_id"), Some(&Value::from(2)));
    }

    #[test]
    fn to_yaml_applies_key_order() {
        let plan = Plan::from_yaml_str(PlanType::Battle, "node_args: {night: true}\nmap: 3\n").unwrap();
        let yaml = plan.to_yaml_string().unwrap();
        assert!(yaml.starts_with("map: 3\n"));
    }

    #[test]
    fn non_mapping_rejected() {
        assert!(matches!(
            Plan::from_yaml_str(PlanType::Week, "- a\n- b\n"),
            Err(PlanError::NotAMapping)
        ));
        assert!(Plan::from_yaml_str(PlanType::Week, "").unwrap().data().is_empty());
    }

    #[test]
    fn rule_issues_reports_broken_rules() {
        let issues = plan().rule_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "node_args.D");
        assert_eq!(issues[0].condition, "BB CL > 1");
        assert!(matches!(issues[0].error, RuleError::InvalidAtomic { .. }));
    }

    #[test]
    fn rule_issue_locates_unreadable_character() {
        let plan = Plan::from_yaml_str(
            PlanType::NormalFight,
            "node_defaults:\n  enemy_rules: [['BB + CL ? 1', retreat]]\n",
        )
        .unwrap();
        let issues = plan.rule_issues();
        assert_eq!(issues.len(), 1);
        let RuleError::Parse(err) = &issues[0].error else {
            panic!("expected a parse error, got {:?}", issues[0].error);
        };
        assert_eq!(err.remainder(&issues[0].condition), "? 1");
        assert_eq!(
            issues[0].to_string(),
            "node_defaults: 'BB + CL ? 1': unreadable condition at byte 8"
        );
    }

    #[test]
    fn block_style_sequences_read_back_unchanged() {
        let plan = plan();
        let yaml = plan.to_yaml_string().unwrap();
        assert!(yaml.contains("selected_nodes:\n- A\n"));
        let reloaded = Plan::from_yaml_str(PlanType::NormalFight, &yaml).unwrap();
        assert_eq!(reloaded.data(), plan.data());
    }

    #[test]
    fn stale_node_args_listed() {
        let plan = Plan::from_yaml_str(
            PlanType::Week,
            "selected_nodes: [A]\nnode_args:\n  A: {night: true}\n  Z: {night: true}\n",
        )
        .unwrap();
        assert_eq!(plan.stale_node_args(), ["Z"]);
    }
}
