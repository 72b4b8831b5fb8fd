use serde::{Deserialize, Serialize};

use crate::{ExchangeError, FleetBoard};

/// Ships required across both main fleets, per decisive battle chapter.
pub const FLEET_SIZE_REQUIREMENTS: &[(u8, usize)] = &[(4, 8), (5, 10), (6, 10)];

/// Requirement for chapters absent from [`FLEET_SIZE_REQUIREMENTS`].
pub const DEFAULT_FLEET_SIZE: usize = 10;

#[must_use]
pub fn required_fleet_size(chapter: u8) -> usize {
    FLEET_SIZE_REQUIREMENTS
        .iter()
        .find(|(c, _)| *c == chapter)
        .map_or(DEFAULT_FLEET_SIZE, |(_, n)| *n)
}

/// The `decisive_battle` section of the user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisiveBattle {
    pub chapter: u8,
    pub repair_level: u8,
    pub full_destroy: bool,
    pub level1: Vec<String>,
    pub level2: Vec<String>,
    pub flagship_priority: Vec<String>,
    useful_skill: bool,
    useful_skill_strict: bool,
}

impl Default for DecisiveBattle {
    fn default() -> Self {
        Self {
            chapter: 6,
            repair_level: 2,
            full_destroy: false,
            level1: Vec::new(),
            level2: Vec::new(),
            flagship_priority: Vec::new(),
            useful_skill: false,
            useful_skill_strict: false,
        }
    }
}

impl DecisiveBattle {
    #[must_use]
    pub fn useful_skill(&self) -> bool {
        self.useful_skill
    }

    /// Strict mode only counts while `useful_skill` is on.
    #[must_use]
    pub fn useful_skill_strict(&self) -> bool {
        self.useful_skill && self.useful_skill_strict
    }

    /// Turning the skill off also clears strict mode.
    pub fn set_useful_skill(&mut self, on: bool) {
        self.useful_skill = on;
        if !on {
            self.useful_skill_strict = false;
        }
    }

    /// Ignored unless `useful_skill` is on. Returns whether the flag was set.
    pub fn set_useful_skill_strict(&mut self, on: bool) -> bool {
        if on && !self.useful_skill {
            return false;
        }
        self.useful_skill_strict = on;
        true
    }

    #[must_use]
    pub fn required_fleet_size(&self) -> usize {
        required_fleet_size(self.chapter)
    }

    /// Whether the two main fleets hold enough ships for the chapter.
    #[must_use]
    pub fn is_fleet_size_valid(&self) -> bool {
        let total = self.level1.len() + self.level2.len();
        let valid = total >= self.required_fleet_size();
        if !valid {
            tracing::debug!(
                chapter = self.chapter,
                total,
                required = self.required_fleet_size(),
                "decisive battle fleet too small"
            );
        }
        valid
    }

    /// A [`FleetBoard::decisive_battle`] board holding these lists.
    ///
    /// # Errors
    ///
    /// Propagates [`ExchangeError`] from the board; the preset always has the
    /// three lists, so this only fails if the preset changes.
    pub fn board(&self) -> Result<FleetBoard, ExchangeError> {
        let mut board = FleetBoard::decisive_battle();
        for (label, items) in [
            ("level1", &self.level1),
            ("level2", &self.level2),
            ("flagship_priority", &self.flagship_priority),
        ] {
            let id = board
                .find(label)
                .ok_or(ExchangeError::UnknownList(board.len()))?;
            board.set_items(id, items)?;
        }
        Ok(board)
    }

    /// Copy the lists back from a board built by [`board`](Self::board).
    ///
    /// # Errors
    ///
    /// Fails if the board is missing one of the three lists.
    pub fn update_from_board(&mut self, board: &FleetBoard) -> Result<(), ExchangeError> {
        let read = |label: &str| -> Result<Vec<String>, ExchangeError> {
            let id = board
                .find(label)
                .ok_or(ExchangeError::UnknownList(board.len()))?;
            Ok(board.items(id)?.to_vec())
        };
        self.level1 = read("level1")?;
        self.level2 = read("level2")?;
        self.flagship_priority = read("flagship_priority")?;
        Ok(())
    }
}
