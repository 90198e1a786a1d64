use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::achievement::AchievementDef;
use crate::progress::errors::ProgressError;

/// Difficulty tier. Each tier has a fixed number of levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Calm")]
    Calm,
    #[serde(rename = "Focused")]
    Focused,
    #[serde(rename = "Intense")]
    Intense,
}

impl Difficulty {
    /// All tiers in unlock order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Calm, Difficulty::Focused, Difficulty::Intense];

    pub fn level_count(self) -> u32 {
        match self {
            Difficulty::Calm => 5,
            Difficulty::Focused => 7,
            Difficulty::Intense => 10,
        }
    }

    /// Sum of level counts across every tier (22).
    pub fn total_levels() -> u32 {
        Self::ALL.iter().map(|d| d.level_count()).sum()
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Calm => "Calm",
            Difficulty::Focused => "Focused",
            Difficulty::Intense => "Intense",
        }
    }

    /// Validate a level number against this tier's range.
    pub fn check_level(self, level: u32) -> Result<u32, ProgressError> {
        if (1..=self.level_count()).contains(&level) {
            Ok(level)
        } else {
            Err(ProgressError::LevelOutOfRange {
                difficulty: self.name(),
                level,
                max: self.level_count(),
            })
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "calm" => Ok(Difficulty::Calm),
            "focused" => Ok(Difficulty::Focused),
            "intense" => Ok(Difficulty::Intense),
            _ => Err(ProgressError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// The three mini-games. Each keeps an independent progress table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "Precision Path")]
    PrecisionPath,
    #[serde(rename = "Pattern Flow")]
    PatternFlow,
    #[serde(rename = "Balance Trial")]
    BalanceTrial,
}

impl GameType {
    /// All games in hub display order.
    pub const ALL: [GameType; 3] = [
        GameType::PrecisionPath,
        GameType::PatternFlow,
        GameType::BalanceTrial,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            GameType::PrecisionPath => 0,
            GameType::PatternFlow => 1,
            GameType::BalanceTrial => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GameType::PrecisionPath => "Precision Path",
            GameType::PatternFlow => "Pattern Flow",
            GameType::BalanceTrial => "Balance Trial",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameType::PrecisionPath => "Accuracy and timing",
            GameType::PatternFlow => "Pattern recognition",
            GameType::BalanceTrial => "Controlled decisions",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for GameType {
    type Err = ProgressError;

    /// Accepts `precision-path`, `precisionPath`, `Precision Path`, `precision_path`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "precisionpath" | "precision" => Ok(GameType::PrecisionPath),
            "patternflow" | "pattern" => Ok(GameType::PatternFlow),
            "balancetrial" | "balance" => Ok(GameType::BalanceTrial),
            _ => Err(ProgressError::UnknownGame(s.to_string())),
        }
    }
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Progress for one (game, difficulty, level) triple.
///
/// `best_score` and `attempts` only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub best_score: u32,
    #[serde(default)]
    pub attempts: u32,
}

impl LevelProgress {
    pub fn record_completion(&mut self, score: u32) {
        self.completed = true;
        self.best_score = self.best_score.max(score);
        self.attempts = self.attempts.saturating_add(1);
    }

    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }
}

/// Runtime achievement state. Only ever moves from locked to unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_date: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn from_def(def: &AchievementDef) -> Self {
        Self {
            id: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            unlocked: false,
            unlocked_date: None,
        }
    }

    /// Flip to unlocked and stamp the date. Returns false if it was already unlocked.
    pub fn mark_unlocked(&mut self, now: DateTime<Utc>) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.unlocked_date = Some(now);
        true
    }
}
