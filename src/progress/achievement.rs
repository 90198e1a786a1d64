/// Achievement catalog and unlock evaluation.
///
/// The catalog below is the only place achievement definitions live. Runtime
/// state (`Achievement`) is rebuilt from it on reset and reconciled against it
/// on load; evaluation only ever flips locked entries to unlocked.
use chrono::{DateTime, Utc};

use crate::progress::types::{Achievement, Difficulty, GameType};
use crate::progress::user::UserProgress;

/// Completed levels a single game needs for its game-specific achievement.
pub const GAME_EXPERT_LEVELS: usize = 10;
/// Total plays (wins and losses) needed for `dedication`.
pub const DEDICATION_PLAYS: u32 = 50;

/// Unlock condition for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementRule {
    /// Aggregate completed levels across every game
    TotalCompleted { required: usize },
    /// Some game has every level of the tier completed
    TierCleared { difficulty: Difficulty },
    /// One specific game has at least `required` completed levels
    GameCompleted { game: GameType, required: usize },
    /// Every game has at least one completed level
    EveryGameStarted,
    /// Total plays recorded, won or lost
    GamesPlayed { required: u32 },
    /// Every level of every tier of every game completed
    AllLevels,
}

/// Static definition of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rule: AchievementRule,
}

pub const CATALOG: [AchievementDef; 10] = [
    AchievementDef {
        id: "first_step",
        title: "First Step",
        description: "Complete your first level",
        rule: AchievementRule::TotalCompleted { required: 1 },
    },
    AchievementDef {
        id: "calm_master",
        title: "Calm Master",
        description: "Complete all Calm levels in any game",
        rule: AchievementRule::TierCleared {
            difficulty: Difficulty::Calm,
        },
    },
    AchievementDef {
        id: "focused_adept",
        title: "Focused Adept",
        description: "Complete all Focused levels in any game",
        rule: AchievementRule::TierCleared {
            difficulty: Difficulty::Focused,
        },
    },
    AchievementDef {
        id: "intense_warrior",
        title: "Intense Warrior",
        description: "Complete all Intense levels in any game",
        rule: AchievementRule::TierCleared {
            difficulty: Difficulty::Intense,
        },
    },
    AchievementDef {
        id: "precision_expert",
        title: "Precision Expert",
        description: "Complete 10 levels in Precision Path",
        rule: AchievementRule::GameCompleted {
            game: GameType::PrecisionPath,
            required: GAME_EXPERT_LEVELS,
        },
    },
    AchievementDef {
        id: "pattern_seer",
        title: "Pattern Seer",
        description: "Complete 10 levels in Pattern Flow",
        rule: AchievementRule::GameCompleted {
            game: GameType::PatternFlow,
            required: GAME_EXPERT_LEVELS,
        },
    },
    AchievementDef {
        id: "balance_keeper",
        title: "Balance Keeper",
        description: "Complete 10 levels in Balance Trial",
        rule: AchievementRule::GameCompleted {
            game: GameType::BalanceTrial,
            required: GAME_EXPERT_LEVELS,
        },
    },
    AchievementDef {
        id: "triple_crown",
        title: "Triple Crown",
        description: "Complete at least one level in each game",
        rule: AchievementRule::EveryGameStarted,
    },
    AchievementDef {
        id: "dedication",
        title: "Dedication",
        description: "Play 50 levels total",
        rule: AchievementRule::GamesPlayed {
            required: DEDICATION_PLAYS,
        },
    },
    AchievementDef {
        id: "mastery",
        title: "True Mastery",
        description: "Complete all levels in all games",
        rule: AchievementRule::AllLevels,
    },
];

/// Fresh, all-locked achievement list in catalog order.
pub fn starter_achievements() -> Vec<Achievement> {
    CATALOG.iter().map(Achievement::from_def).collect()
}

pub fn find_def(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Levels needed for `mastery`: every tier of every game (66).
pub fn mastery_levels() -> usize {
    GameType::ALL.len() * Difficulty::total_levels() as usize
}

/// Whether the rule holds for the given progress.
pub fn rule_satisfied(rule: &AchievementRule, progress: &UserProgress) -> bool {
    use AchievementRule::*;

    match rule {
        TotalCompleted { required } => progress.total_completed_levels() >= *required,
        TierCleared { difficulty } => GameType::ALL.iter().any(|game| {
            progress.game(*game).completed_levels(*difficulty) == difficulty.level_count() as usize
        }),
        GameCompleted { game, required } => {
            progress.game(*game).total_completed_levels() >= *required
        }
        EveryGameStarted => GameType::ALL
            .iter()
            .all(|game| progress.game(*game).total_completed_levels() >= 1),
        GamesPlayed { required } => progress.total_games_played >= *required,
        AllLevels => progress.total_completed_levels() >= mastery_levels(),
    }
}

/// Ids of locked achievements whose rule now holds, in catalog order.
pub fn eligible_achievements(progress: &UserProgress) -> Vec<&'static str> {
    progress
        .achievements
        .iter()
        .filter(|a| !a.unlocked)
        .filter_map(|a| find_def(&a.id))
        .filter(|def| rule_satisfied(&def.rule, progress))
        .map(|def| def.id)
        .collect()
}

/// Unlock every eligible achievement, stamping `now`. Already-unlocked entries
/// are skipped and keep their original date. Returns the newly unlocked ids.
pub fn check_achievements(progress: &mut UserProgress, now: DateTime<Utc>) -> Vec<String> {
    let eligible = eligible_achievements(progress);
    let mut awarded = Vec::new();

    for id in eligible {
        if let Some(achievement) = progress.achievements.iter_mut().find(|a| a.id == id) {
            if achievement.mark_unlocked(now) {
                awarded.push(id.to_string());
            }
        }
    }

    awarded
}
