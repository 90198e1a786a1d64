//! Per-game progress table.
//!
//! Every (difficulty, level) pair in range is populated at construction.
//! Writes go through [`GameProgress::entry_mut`], which materializes missing
//! entries on demand, so recording never fails even for keys that were not
//! pre-populated (e.g. a table decoded from an older save).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::progress::types::{Difficulty, LevelProgress};

/// Level number -> progress, per difficulty.
pub type LevelTable = BTreeMap<Difficulty, BTreeMap<u32, LevelProgress>>;

/// Completed calm levels needed to open the focused tier.
pub const FOCUSED_UNLOCK_CALM_COMPLETIONS: usize = 3;
/// Completed focused levels needed to open the intense tier.
pub const INTENSE_UNLOCK_FOCUSED_COMPLETIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GameProgress {
    levels: LevelTable,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Deserialize<'de> for GameProgress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let levels = LevelTable::deserialize(deserializer)?;
        Ok(Self::from_levels(levels))
    }
}

impl GameProgress {
    pub fn new() -> Self {
        Self::from_levels(LevelTable::new())
    }

    /// Build from a possibly sparse table, filling any in-range holes with defaults.
    pub fn from_levels(mut levels: LevelTable) -> Self {
        for difficulty in Difficulty::ALL {
            let tier = levels.entry(difficulty).or_default();
            for level in 1..=difficulty.level_count() {
                tier.entry(level).or_default();
            }
        }
        Self { levels }
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    /// Get-or-create accessor for a single level entry.
    pub fn entry_mut(&mut self, difficulty: Difficulty, level: u32) -> &mut LevelProgress {
        self.levels
            .entry(difficulty)
            .or_default()
            .entry(level)
            .or_default()
    }

    pub fn level(&self, difficulty: Difficulty, level: u32) -> Option<&LevelProgress> {
        self.levels.get(&difficulty)?.get(&level)
    }

    pub fn best_score(&self, difficulty: Difficulty, level: u32) -> u32 {
        self.level(difficulty, level).map(|lp| lp.best_score).unwrap_or(0)
    }

    pub fn complete_level(&mut self, difficulty: Difficulty, level: u32, score: u32) {
        self.entry_mut(difficulty, level).record_completion(score);
    }

    pub fn add_attempt(&mut self, difficulty: Difficulty, level: u32) {
        self.entry_mut(difficulty, level).record_attempt();
    }

    pub fn completed_levels(&self, difficulty: Difficulty) -> usize {
        self.levels
            .get(&difficulty)
            .map(|tier| tier.values().filter(|lp| lp.completed).count())
            .unwrap_or(0)
    }

    pub fn total_completed_levels(&self) -> usize {
        Difficulty::ALL
            .iter()
            .map(|d| self.completed_levels(*d))
            .sum()
    }

    pub fn is_level_unlocked(&self, difficulty: Difficulty, level: u32) -> bool {
        if level == 1 {
            return match difficulty {
                Difficulty::Calm => true,
                Difficulty::Focused => {
                    self.completed_levels(Difficulty::Calm) >= FOCUSED_UNLOCK_CALM_COMPLETIONS
                }
                Difficulty::Intense => {
                    self.completed_levels(Difficulty::Focused)
                        >= INTENSE_UNLOCK_FOCUSED_COMPLETIONS
                }
            };
        }
        let Some(previous) = level.checked_sub(1) else {
            return false;
        };
        self.level(difficulty, previous)
            .map(|lp| lp.completed)
            .unwrap_or(false)
    }

    /// Levels this game offers across all tiers.
    pub fn total_levels(&self) -> u32 {
        Difficulty::total_levels()
    }

    /// Fraction of in-range levels completed, in `[0, 1]`.
    pub fn completion_ratio(&self) -> f64 {
        let total = self.total_levels();
        if total == 0 {
            return 0.0;
        }
        (self.total_completed_levels() as f64 / total as f64).min(1.0)
    }

    /// Sum of attempts over in-range levels.
    pub fn total_attempts(&self) -> u64 {
        Difficulty::ALL
            .iter()
            .flat_map(|d| (1..=d.level_count()).map(move |level| (*d, level)))
            .filter_map(|(d, level)| self.level(d, level))
            .map(|lp| lp.attempts as u64)
            .sum()
    }
}
