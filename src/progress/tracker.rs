//! Process-wide owner of the player's progress.
//!
//! Gameplay screens call in through [`ProgressTracker::on_level_finished`],
//! onboarding through [`ProgressTracker::on_onboarding_finished`] and settings
//! through [`ProgressTracker::on_reset_requested`]. Every mutation is persisted
//! and then announced on a broadcast channel; read-only consumers borrow
//! [`ProgressTracker::progress`] or subscribe to [`ProgressEvent`]s.

use chrono::Utc;
use log::{debug, info};
use tokio::sync::broadcast;

use crate::progress::gateway::ProgressGateway;
use crate::progress::storage::KeyValueStore;
use crate::progress::types::{Difficulty, GameType};
use crate::progress::user::UserProgress;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// State change notifications, sent after the change has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    LevelCompleted {
        game: GameType,
        difficulty: Difficulty,
        level: u32,
        score: u32,
    },
    AttemptRecorded {
        game: GameType,
        difficulty: Difficulty,
        level: u32,
    },
    AchievementUnlocked {
        id: String,
    },
    OnboardingCompleted,
    Reset,
}

pub struct ProgressTracker<S: KeyValueStore> {
    progress: UserProgress,
    gateway: ProgressGateway<S>,
    events: broadcast::Sender<ProgressEvent>,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    /// Load saved progress from `store` (or start fresh).
    pub fn open(store: S) -> Self {
        Self::with_event_capacity(store, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity(store: S, capacity: usize) -> Self {
        let gateway = ProgressGateway::new(store);
        let progress = gateway.load();
        let (events, _) = broadcast::channel(capacity.max(1));
        debug!(
            "progress: loaded ({} levels completed, {} plays)",
            progress.total_completed_levels(),
            progress.total_games_played()
        );
        Self {
            progress,
            gateway,
            events,
        }
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn gateway(&self) -> &ProgressGateway<S> {
        &self.gateway
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Inbound calls from gameplay, onboarding and settings
    // ------------------------------------------------------------------

    /// A mini-game round ended. Wins complete the level, losses count an attempt.
    pub fn on_level_finished(
        &mut self,
        game: GameType,
        difficulty: Difficulty,
        level: u32,
        won: bool,
        score: u32,
    ) {
        if won {
            self.complete_level(game, difficulty, level, score);
        } else {
            self.add_attempt(game, difficulty, level);
        }
    }

    pub fn on_onboarding_finished(&mut self) {
        self.progress.complete_onboarding();
        self.gateway.save(&self.progress);
        self.emit(ProgressEvent::OnboardingCompleted);
    }

    pub fn on_reset_requested(&mut self) {
        self.reset();
    }

    // ------------------------------------------------------------------
    // Aggregate operations
    // ------------------------------------------------------------------

    pub fn complete_level(&mut self, game: GameType, difficulty: Difficulty, level: u32, score: u32) {
        debug!(
            "progress: {} {} level {} completed with score {}",
            game, difficulty, level, score
        );
        let awarded = self
            .progress
            .complete_level(game, difficulty, level, score, Utc::now());
        self.gateway.save(&self.progress);
        self.emit(ProgressEvent::LevelCompleted {
            game,
            difficulty,
            level,
            score,
        });
        self.announce(awarded);
    }

    pub fn add_attempt(&mut self, game: GameType, difficulty: Difficulty, level: u32) {
        debug!("progress: {} {} level {} attempted", game, difficulty, level);
        let awarded = self
            .progress
            .add_attempt(game, difficulty, level, Utc::now());
        self.gateway.save(&self.progress);
        self.emit(ProgressEvent::AttemptRecorded {
            game,
            difficulty,
            level,
        });
        self.announce(awarded);
    }

    /// Recompute energy and stage, evaluate achievements, then persist.
    pub fn update_progress(&mut self) {
        let awarded = self.progress.update_progress(Utc::now());
        self.gateway.save(&self.progress);
        self.announce(awarded);
    }

    pub fn reset(&mut self) {
        info!("progress: reset to defaults");
        self.progress.reset();
        self.gateway.save(&self.progress);
        self.emit(ProgressEvent::Reset);
    }

    fn announce(&self, awarded: Vec<String>) {
        for id in awarded {
            info!("progress: achievement unlocked: {}", id);
            self.emit(ProgressEvent::AchievementUnlocked { id });
        }
    }

    fn emit(&self, event: ProgressEvent) {
        // No subscribers is fine; the state is already saved.
        let _ = self.events.send(event);
    }
}
