use std::fmt;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::{MapGraph, Plan, PlanError, PlanType};

/// Result of resolving the node graph for a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum MapLookup {
    Found(MapGraph),
    /// Exercise and battle plans have no node map.
    NoMap,
    /// The plan lacks `chapter` or `map`.
    MissingKeys,
    /// Event plans need the event folder to pick a config.
    NoEventFolder,
    /// No config entry with nodes exists under this key.
    NotFound { key: String },
    Unsupported { plan_type: String },
}

impl MapLookup {
    /// The graph, if one was found.
    #[must_use]
    pub fn graph(&self) -> Option<&MapGraph> {
        match self {
            MapLookup::Found(graph) => Some(graph),
            _ => None,
        }
    }

    /// Message shown in place of the map. `None` when a graph was found.
    #[must_use]
    pub fn placeholder(&self) -> Option<String> {
        match self {
            MapLookup::Found(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for MapLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapLookup::Found(graph) => write!(f, "{} nodes", graph.len()),
            MapLookup::NoMap => f.write_str("演习/战役无地图"),
            MapLookup::MissingKeys => f.write_str("计划文件中缺少\n'chapter' 或 'map' 键"),
            MapLookup::NoEventFolder => f.write_str("请先选择一个具体活动"),
            MapLookup::NotFound { key } => write!(f, "地图配置未找到:\n{key}"),
            MapLookup::Unsupported { plan_type } => write!(f, "不支持的计划类型 '{plan_type}'"),
        }
    }
}

/// Node configurations for normal and event maps.
///
/// Normal configs are keyed `chapter{N}` then `{N}-{M}`; event configs are
/// keyed by event folder then `{chapter}-{M}`. Each entry holds a `nodes`
/// mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapConfigs {
    normal: Mapping,
    event: Mapping,
}

fn read_config(path: &Path) -> Mapping {
    let parsed = std::fs::read_to_string(path)
        .map_err(PlanError::from)
        .and_then(|input| parse_config(&input));
    match parsed {
        Ok(map) => map,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "map config unavailable, using empty config");
            Mapping::new()
        }
    }
}

fn parse_config(input: &str) -> Result<Mapping, PlanError> {
    match serde_yaml::from_str(input)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(PlanError::NotAMapping),
    }
}

impl MapConfigs {
    /// Read both config files. A missing or unreadable file yields an empty
    /// config and a warning.
    #[must_use]
    pub fn load(normal: impl AsRef<Path>, event: impl AsRef<Path>) -> Self {
        Self {
            normal: read_config(normal.as_ref()),
            event: read_config(event.as_ref()),
        }
    }

    /// # Errors
    ///
    /// Returns [`PlanError`] if either document is malformed.
    pub fn from_yaml_strs(normal: &str, event: &str) -> Result<Self, PlanError> {
        Ok(Self {
            normal: parse_config(normal)?,
            event: parse_config(event)?,
        })
    }

    /// Resolve the graph for a plan type given its `chapter`, `map` and, for
    /// events, the event folder.
    #[must_use]
    pub fn lookup(
        &self,
        plan_type: PlanType,
        chapter: Option<&str>,
        map: Option<&str>,
        event_folder: Option<&str>,
    ) -> MapLookup {
        if !plan_type.has_node_map() {
            return MapLookup::NoMap;
        }
        let (Some(chapter), Some(map)) = (chapter, map) else {
            return MapLookup::MissingKeys;
        };
        let map_key = format!("{chapter}-{map}");

        let (group, key) = if plan_type == PlanType::Event {
            let Some(folder) = event_folder.filter(|f| !f.is_empty()) else {
                return MapLookup::NoEventFolder;
            };
            (self.event.get(folder), format!("{folder}/{map_key}"))
        } else {
            let chapter_key = format!("chapter{chapter}");
            (self.normal.get(chapter_key.as_str()), format!("{chapter_key}/{map_key}"))
        };

        let Some(entry) = group.and_then(|g| g.get(map_key.as_str())) else {
            return MapLookup::NotFound { key };
        };
        if entry.get("nodes").is_none() {
            return MapLookup::NotFound { key };
        }
        match MapGraph::from_value(entry.clone()) {
            Ok(graph) => MapLookup::Found(graph),
            Err(err) => {
                tracing::warn!(%key, %err, "malformed map config entry");
                MapLookup::NotFound { key }
            }
        }
    }

    /// [`lookup`](Self::lookup) with the plan type given by its directory
    /// name, which may not name a known plan type.
    #[must_use]
    pub fn lookup_named(
        &self,
        plan_type: &str,
        chapter: Option<&str>,
        map: Option<&str>,
        event_folder: Option<&str>,
    ) -> MapLookup {
        match plan_type.parse::<PlanType>() {
            Ok(t) => self.lookup(t, chapter, map, event_folder),
            Err(_) => MapLookup::Unsupported {
                plan_type: plan_type.to_ascii_lowercase(),
            },
        }
    }

    /// [`lookup`](Self::lookup) using the plan's own keys.
    #[must_use]
    pub fn lookup_plan(&self, plan: &Plan, event_folder: Option<&str>) -> MapLookup {
        let chapter = plan.chapter();
        let map = plan.map();
        self.lookup(
            plan.plan_type(),
            chapter.as_deref(),
            map.as_deref(),
            event_folder,
        )
    }
}
