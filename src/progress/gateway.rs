//! Persistence gateway: the only code that reads or writes the saved progress.
//!
//! Failures never reach the caller. A save that cannot be encoded or written is
//! logged and dropped (the in-memory state stays authoritative for the
//! session); a stored record that cannot be parsed is deleted and replaced by a
//! fresh one.

use log::{debug, warn};

use crate::logutil::escape_log_bytes;
use crate::progress::codec;
use crate::progress::storage::KeyValueStore;
use crate::progress::user::UserProgress;

/// Fixed storage key for the saved progress record.
pub const SAVE_KEY: &str = "UserProgress";

pub struct ProgressGateway<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProgressGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encode and write `progress` under [`SAVE_KEY`]. Errors are logged only.
    pub fn save(&self, progress: &UserProgress) {
        let bytes = match codec::encode(progress) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("progress: encode failed, save dropped: {}", e);
                return;
            }
        };
        match self.store.set(SAVE_KEY, &bytes) {
            Ok(()) => debug!("progress: saved {} bytes", bytes.len()),
            Err(e) => warn!("progress: write failed, save dropped: {}", e),
        }
    }

    /// Read the saved record. Absent or unreadable storage yields a fresh
    /// record; an unparseable record is removed from storage first.
    pub fn load(&self) -> UserProgress {
        let bytes = match self.store.get(SAVE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("progress: no saved record, starting fresh");
                return UserProgress::new();
            }
            Err(e) => {
                warn!("progress: read failed, starting fresh: {}", e);
                return UserProgress::new();
            }
        };

        match codec::decode(&bytes) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(
                    "progress: discarding corrupt record ({}): {}",
                    e,
                    escape_log_bytes(&bytes)
                );
                if let Err(e) = self.store.remove(SAVE_KEY) {
                    warn!("progress: failed to remove corrupt record: {}", e);
                }
                UserProgress::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::storage::MemoryStore;
    use crate::progress::types::{Difficulty, GameType};
    use chrono::Utc;

    #[test]
    fn load_without_record_is_fresh() {
        let gateway = ProgressGateway::new(MemoryStore::new());
        assert_eq!(gateway.load(), UserProgress::new());
        assert!(gateway.store().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let gateway = ProgressGateway::new(MemoryStore::new());
        let mut p = UserProgress::new();
        p.complete_level(GameType::BalanceTrial, Difficulty::Calm, 1, 33, Utc::now());
        gateway.save(&p);
        assert_eq!(gateway.load(), p);
    }

    #[test]
    fn corrupt_record_is_removed() {
        let store = MemoryStore::new();
        store.set(SAVE_KEY, b"\x00\x01{broken").unwrap();
        let gateway = ProgressGateway::new(&store);
        assert_eq!(gateway.load(), UserProgress::new());
        assert_eq!(store.get(SAVE_KEY).unwrap(), None);
    }

    #[test]
    fn partially_bad_record_is_kept() {
        let store = MemoryStore::new();
        store
            .set(SAVE_KEY, br#"{"hasCompletedOnboarding": true, "energyLevel": "x"}"#)
            .unwrap();
        let gateway = ProgressGateway::new(&store);
        let p = gateway.load();
        assert!(p.has_completed_onboarding());
        assert_eq!(p.energy_level(), 1);
        assert!(store.get(SAVE_KEY).unwrap().is_some());
    }
}
