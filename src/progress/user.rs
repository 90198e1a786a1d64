//! Player progress aggregate.
//!
//! [`UserProgress`] owns one [`GameProgress`] per game, the achievement list and
//! the derived energy/stage scores. It is plain data plus the rules that keep it
//! consistent; persistence and change notification are layered on top by
//! [`crate::progress::tracker::ProgressTracker`].

use chrono::{DateTime, Utc};

use crate::progress::achievement::{check_achievements, starter_achievements};
use crate::progress::table::{
    GameProgress, FOCUSED_UNLOCK_CALM_COMPLETIONS, INTENSE_UNLOCK_FOCUSED_COMPLETIONS,
};
use crate::progress::types::{Achievement, Difficulty, GameType};

pub const MIN_ENERGY_LEVEL: u8 = 1;
pub const MAX_ENERGY_LEVEL: u8 = 10;
pub const MIN_STAGE: u8 = 1;
pub const MAX_STAGE: u8 = 5;

/// (minimum completed levels, energy level), highest band first.
const ENERGY_BANDS: [(usize, u8); 9] = [
    (50, 10),
    (40, 9),
    (32, 8),
    (25, 7),
    (19, 6),
    (14, 5),
    (10, 4),
    (6, 3),
    (3, 2),
];

/// (minimum unlocked achievements, stage), highest band first.
const STAGE_BANDS: [(usize, u8); 4] = [(8, 5), (6, 4), (4, 3), (2, 2)];

/// Energy level for a total number of completed levels.
pub fn energy_for(completed_levels: usize) -> u8 {
    ENERGY_BANDS
        .iter()
        .find(|(min, _)| completed_levels >= *min)
        .map(|(_, level)| *level)
        .unwrap_or(MIN_ENERGY_LEVEL)
}

/// Stage for a number of unlocked achievements.
pub fn stage_for(unlocked_achievements: usize) -> u8 {
    STAGE_BANDS
        .iter()
        .find(|(min, _)| unlocked_achievements >= *min)
        .map(|(_, stage)| *stage)
        .unwrap_or(MIN_STAGE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    pub(crate) has_completed_onboarding: bool,
    /// Indexed by `GameType::index`, so every game always has a table.
    pub(crate) games: [GameProgress; 3],
    pub(crate) achievements: Vec<Achievement>,
    pub(crate) total_games_played: u32,
    pub(crate) energy_level: u8,
    pub(crate) current_stage: u8,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl UserProgress {
    pub fn new() -> Self {
        Self {
            has_completed_onboarding: false,
            games: [GameProgress::new(), GameProgress::new(), GameProgress::new()],
            achievements: starter_achievements(),
            total_games_played: 0,
            energy_level: MIN_ENERGY_LEVEL,
            current_stage: MIN_STAGE,
        }
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.has_completed_onboarding
    }

    pub fn game(&self, game: GameType) -> &GameProgress {
        &self.games[game.index()]
    }

    pub(crate) fn game_mut(&mut self, game: GameType) -> &mut GameProgress {
        &mut self.games[game.index()]
    }

    /// Games paired with their tables, in display order.
    pub fn games(&self) -> impl Iterator<Item = (GameType, &GameProgress)> {
        GameType::ALL.into_iter().map(move |g| (g, self.game(g)))
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn total_games_played(&self) -> u32 {
        self.total_games_played
    }

    pub fn energy_level(&self) -> u8 {
        self.energy_level
    }

    pub fn current_stage(&self) -> u8 {
        self.current_stage
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Record a won level. Returns ids of achievements unlocked by this call.
    pub fn complete_level(
        &mut self,
        game: GameType,
        difficulty: Difficulty,
        level: u32,
        score: u32,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        self.game_mut(game).complete_level(difficulty, level, score);
        self.total_games_played = self.total_games_played.saturating_add(1);
        self.update_progress(now)
    }

    /// Record a lost level. Returns ids of achievements unlocked by this call
    /// (only `dedication` can be reached through plays alone).
    pub fn add_attempt(
        &mut self,
        game: GameType,
        difficulty: Difficulty,
        level: u32,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        self.game_mut(game).add_attempt(difficulty, level);
        self.total_games_played = self.total_games_played.saturating_add(1);
        self.update_progress(now)
    }

    /// Recompute energy and stage, then unlock achievements.
    ///
    /// Stage is derived from the unlock count before this evaluation, so
    /// achievements awarded here raise it on the next update.
    pub fn update_progress(&mut self, now: DateTime<Utc>) -> Vec<String> {
        self.energy_level = energy_for(self.total_completed_levels());
        self.current_stage = stage_for(self.unlocked_achievement_count());
        check_achievements(self, now)
    }

    pub fn complete_onboarding(&mut self) {
        self.has_completed_onboarding = true;
    }

    /// Back to fresh-construction defaults, onboarding flag included.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------

    pub fn total_completed_levels(&self) -> usize {
        self.games.iter().map(|g| g.total_completed_levels()).sum()
    }

    pub fn completed_levels(&self, game: GameType, difficulty: Difficulty) -> usize {
        self.game(game).completed_levels(difficulty)
    }

    pub fn is_level_unlocked(&self, game: GameType, difficulty: Difficulty, level: u32) -> bool {
        self.game(game).is_level_unlocked(difficulty, level)
    }

    pub fn unlocked_achievements(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked)
    }

    pub fn unlocked_achievement_count(&self) -> usize {
        self.unlocked_achievements().count()
    }

    /// Size of the achievement list (the whole catalog).
    pub fn achievement_count(&self) -> usize {
        self.achievements.len()
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    /// Unlocked achievements, most recent first.
    pub fn recent_achievements(&self, limit: usize) -> Vec<&Achievement> {
        let mut unlocked: Vec<&Achievement> = self.unlocked_achievements().collect();
        unlocked.sort_by(|a, b| b.unlocked_date.cmp(&a.unlocked_date));
        unlocked.truncate(limit);
        unlocked
    }

    /// Energy as a fraction of the maximum, for progress rings.
    pub fn energy_ratio(&self) -> f64 {
        self.energy_level as f64 / MAX_ENERGY_LEVEL as f64
    }

    /// Highest tier whose first level is open in at least one game.
    pub fn highest_unlocked_difficulty(&self) -> Difficulty {
        let any = |difficulty: Difficulty, required: usize| {
            self.games
                .iter()
                .any(|g| g.completed_levels(difficulty) >= required)
        };
        if any(Difficulty::Focused, INTENSE_UNLOCK_FOCUSED_COMPLETIONS) {
            Difficulty::Intense
        } else if any(Difficulty::Calm, FOCUSED_UNLOCK_CALM_COMPLETIONS) {
            Difficulty::Focused
        } else {
            Difficulty::Calm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_bands() {
        assert_eq!(energy_for(0), 1);
        assert_eq!(energy_for(2), 1);
        assert_eq!(energy_for(3), 2);
        assert_eq!(energy_for(6), 3);
        assert_eq!(energy_for(10), 4);
        assert_eq!(energy_for(14), 5);
        assert_eq!(energy_for(19), 6);
        assert_eq!(energy_for(25), 7);
        assert_eq!(energy_for(32), 8);
        assert_eq!(energy_for(40), 9);
        assert_eq!(energy_for(49), 9);
        assert_eq!(energy_for(50), 10);
        assert_eq!(energy_for(66), 10);
    }

    #[test]
    fn stage_bands() {
        assert_eq!(stage_for(0), 1);
        assert_eq!(stage_for(1), 1);
        assert_eq!(stage_for(2), 2);
        assert_eq!(stage_for(4), 3);
        assert_eq!(stage_for(6), 4);
        assert_eq!(stage_for(7), 4);
        assert_eq!(stage_for(8), 5);
        assert_eq!(stage_for(10), 5);
    }

    #[test]
    fn fresh_progress_defaults() {
        let p = UserProgress::new();
        assert!(!p.has_completed_onboarding());
        assert_eq!(p.games().count(), 3);
        assert_eq!(p.achievements().len(), 10);
        assert_eq!(p.achievement_count(), 10);
        assert_eq!(p.unlocked_achievement_count(), 0);
        assert_eq!(p.total_games_played(), 0);
        assert_eq!(p.energy_level(), 1);
        assert_eq!(p.current_stage(), 1);
        assert_eq!(p.highest_unlocked_difficulty(), Difficulty::Calm);
    }

    #[test]
    fn attempt_does_not_complete() {
        let mut p = UserProgress::new();
        let awarded = p.add_attempt(GameType::PrecisionPath, Difficulty::Intense, 1, Utc::now());
        assert!(awarded.is_empty());
        let lp = p
            .game(GameType::PrecisionPath)
            .level(Difficulty::Intense, 1)
            .unwrap();
        assert_eq!(lp.attempts, 1);
        assert!(!lp.completed);
        assert_eq!(p.total_games_played(), 1);
        assert_eq!(p.unlocked_achievement_count(), 0);
    }

    #[test]
    fn stage_is_computed_before_evaluation() {
        let mut p = UserProgress::new();
        // One completion in each game unlocks first_step and triple_crown
        for game in GameType::ALL {
            p.complete_level(game, Difficulty::Calm, 1, 5, Utc::now());
        }
        assert_eq!(p.unlocked_achievement_count(), 2);
        assert_eq!(p.current_stage(), 1);
        assert_eq!(p.energy_level(), 2);

        // The next recompute picks up the two unlocks
        assert!(p.update_progress(Utc::now()).is_empty());
        assert_eq!(p.current_stage(), 2);
    }

    #[test]
    fn highest_difficulty_follows_best_game() {
        let mut p = UserProgress::new();
        for level in 1..=3 {
            p.complete_level(GameType::BalanceTrial, Difficulty::Calm, level, 1, Utc::now());
        }
        assert_eq!(p.highest_unlocked_difficulty(), Difficulty::Focused);
        for level in 1..=4 {
            p.complete_level(GameType::PatternFlow, Difficulty::Focused, level, 1, Utc::now());
        }
        assert_eq!(p.highest_unlocked_difficulty(), Difficulty::Intense);
    }

    #[test]
    fn recent_achievements_newest_first() {
        let mut p = UserProgress::new();
        let t0 = Utc::now();
        p.complete_level(GameType::PrecisionPath, Difficulty::Calm, 1, 1, t0);
        let t1 = t0 + chrono::Duration::minutes(5);
        p.complete_level(GameType::PatternFlow, Difficulty::Calm, 1, 1, t1);
        p.complete_level(GameType::BalanceTrial, Difficulty::Calm, 1, 1, t1);

        let recent = p.recent_achievements(5);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "triple_crown");
        assert_eq!(recent[1].id, "first_step");
        assert_eq!(p.recent_achievements(1).len(), 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut p = UserProgress::new();
        p.complete_onboarding();
        p.complete_level(GameType::PrecisionPath, Difficulty::Calm, 1, 99, Utc::now());
        p.reset();
        assert_eq!(p, UserProgress::new());
    }

    #[test]
    fn energy_ratio_scales_to_one() {
        let mut p = UserProgress::new();
        assert!((p.energy_ratio() - 0.1).abs() < f64::EPSILON);
        p.energy_level = MAX_ENERGY_LEVEL;
        assert!((p.energy_ratio() - 1.0).abs() < f64::EPSILON);
    }
}
