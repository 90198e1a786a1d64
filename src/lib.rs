//! # Zenpath - Progression Engine for a Casual Mini-Game Collection
//!
//! Zenpath tracks a single player's progress across three mini-games
//! (Precision Path, Pattern Flow and Balance Trial), each split into three
//! difficulty tiers (Calm, Focused, Intense) of 5, 7 and 10 levels.
//!
//! ## Features
//!
//! - **Unlock Gating**: Level 1 of Calm is always open, Focused opens after 3 Calm
//!   completions, Intense after 4 Focused completions; later levels follow their predecessor.
//! - **Achievements**: A fixed catalog of ten one-way milestones, re-evaluated after every play.
//! - **Derived Scores**: Energy (1-10) from completed levels and Stage (1-5) from unlocked achievements.
//! - **Resilient Persistence**: A single JSON record in a sled key-value store; malformed fields
//!   fall back to defaults and unreadable records are discarded instead of failing startup.
//! - **Change Notification**: Mutations are announced on a broadcast channel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zenpath::progress::{Difficulty, GameType, ProgressError, ProgressTracker, SledStore};
//!
//! fn main() -> Result<(), ProgressError> {
//!     let store = SledStore::open("./data/progress")?;
//!     let mut tracker = ProgressTracker::open(store);
//!
//!     tracker.on_level_finished(GameType::PrecisionPath, Difficulty::Calm, 1, true, 80);
//!     println!("Energy level: {}", tracker.progress().energy_level());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`progress`] - Level tables, achievements, the progress aggregate and its persistence
//! - [`config`] - Configuration loading and defaults
//! - [`logutil`] - Helpers for logging stored records on one line
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ ProgressTracker │ ← gameplay / onboarding / settings call in here
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  UserProgress   │ ← tables, achievements, energy, stage
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ ProgressGateway │ ← JSON record under one key in a KeyValueStore
//! └─────────────────┘
//! ```

pub mod config;
pub mod logutil;
pub mod progress;
