//! Player progression core: per-game level tables, unlock gating, the
//! achievement catalog, derived energy/stage scores and their persistence.
//!
//! Gameplay reports finished rounds to a [`ProgressTracker`], which mutates the
//! [`UserProgress`] aggregate, re-evaluates achievements, saves through the
//! [`ProgressGateway`] and broadcasts a [`ProgressEvent`].

pub mod achievement;
pub mod codec;
pub mod errors;
pub mod gateway;
pub mod storage;
pub mod table;
pub mod tracker;
pub mod types;
pub mod user;

pub use achievement::{
    check_achievements, eligible_achievements, find_def, mastery_levels, rule_satisfied,
    starter_achievements, AchievementDef, AchievementRule, CATALOG,
};
pub use errors::ProgressError;
pub use gateway::{ProgressGateway, SAVE_KEY};
pub use storage::{KeyValueStore, MemoryStore, SledStore, SledStoreBuilder};
pub use table::GameProgress;
pub use tracker::{ProgressEvent, ProgressTracker, DEFAULT_EVENT_CAPACITY};
pub use types::{Achievement, Difficulty, GameType, LevelProgress};
pub use user::{energy_for, stage_for, UserProgress};
