use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::{DecisiveBattle, MapConfigs, PlanError, PlanType};

/// File name of the user settings document.
pub const SETTINGS_FILE: &str = "user_settings.yaml";

fn default_normal_map_config() -> PathBuf {
    PathBuf::from("resources/map_nodes/normal.yaml")
}

fn default_event_map_config() -> PathBuf {
    PathBuf::from("resources/map_nodes/event.yaml")
}

/// User settings relevant to plan editing.
///
/// Keys this crate does not interpret are kept in `other` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_root: Option<PathBuf>,
    #[serde(default = "default_normal_map_config")]
    pub normal_map_config: PathBuf,
    #[serde(default = "default_event_map_config")]
    pub event_map_config: PathBuf,
    #[serde(default)]
    pub decisive_battle: DecisiveBattle,
    #[serde(flatten)]
    pub other: Mapping,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plan_root: None,
            normal_map_config: default_normal_map_config(),
            event_map_config: default_event_map_config(),
            decisive_battle: DecisiveBattle::default(),
            other: Mapping::new(),
        }
    }
}

fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, PlanError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if path.is_file() && is_yaml {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl Settings {
    /// Read settings from `path`. A missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// # Errors
    ///
    /// Returns [`PlanError::Yaml`] for malformed input.
    pub fn from_yaml_str(input: &str) -> Result<Self, PlanError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }

    /// # Errors
    ///
    /// Returns [`PlanError`] on serialization or I/O failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PlanError> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Directory holding plans of one type, if a plan root is set.
    #[must_use]
    pub fn plan_dir(&self, plan_type: PlanType) -> Option<PathBuf> {
        self.plan_root.as_ref().map(|root| root.join(plan_type.as_str()))
    }

    /// Event folder names under `<plan_root>/event`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Io`] if the directory cannot be read.
    pub fn event_folders(&self) -> Result<Vec<String>, PlanError> {
        let Some(dir) = self.plan_dir(PlanType::Event) else {
            return Ok(Vec::new());
        };
        let mut folders = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    folders.push(name.to_owned());
                }
            }
        }
        folders.sort();
        Ok(folders)
    }

    /// Plan files of one type, sorted by path. Event plans come from the
    /// given event folder.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Io`] if the plan directory cannot be read.
    pub fn plan_files(&self, plan_type: PlanType, event_folder: Option<&str>) -> Result<Vec<PathBuf>, PlanError> {
        let Some(mut dir) = self.plan_dir(plan_type) else {
            return Ok(Vec::new());
        };
        if plan_type == PlanType::Event {
            match event_folder {
                Some(folder) => dir.push(folder),
                None => return Ok(Vec::new()),
            }
        }
        yaml_files(&dir)
    }

    /// Load the map configs named by these settings.
    #[must_use]
    pub fn map_configs(&self) -> MapConfigs {
        MapConfigs::load(&self.normal_map_config, &self.event_map_config)
    }
}
